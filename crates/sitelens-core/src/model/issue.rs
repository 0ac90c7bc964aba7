// ── Issue domain types ──
//
// Issues are produced as tagged variants by the scoring engine and
// consumed by the optimization engine through `category()`, so the
// optimizer never re-parses display text. Only `Custom` issues (free-form
// text from configuration) fall back to keyword matching.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Categories ──────────────────────────────────────────────────────

/// What an issue is about, from the optimizer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IssueCategory {
    Title,
    MetaDescription,
    Alt,
    H1,
    InternalLinks,
    Scripts,
    Lang,
    HeavyPage,
}

/// Ordered keyword table for free-form issue text. First match wins.
const TEXT_KEYWORDS: &[(&[&str], IssueCategory)] = &[
    (&["title"], IssueCategory::Title),
    (&["meta description"], IssueCategory::MetaDescription),
    (&["alt"], IssueCategory::Alt),
    (&["h1"], IssueCategory::H1),
    (&["internal link"], IssueCategory::InternalLinks),
    (&["performance", "script"], IssueCategory::Scripts),
    (&["lang"], IssueCategory::Lang),
    (&["heavy"], IssueCategory::HeavyPage),
];

impl IssueCategory {
    /// Classify free-form issue text by case-insensitive keyword match.
    ///
    /// Categories are tried in table order and the first hit wins, so text
    /// mentioning both a title and scripts is treated as a title issue.
    pub fn match_text(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        TEXT_KEYWORDS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(_, category)| *category)
    }
}

// ── Fixed message sets ──────────────────────────────────────────────

/// Advisories emitted when the page could not be analyzed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Advisory {
    LimitedAnalysis,
    ManualMetaCheck,
    ExternalSpeedTest,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Self::LimitedAnalysis => "limited analysis (cross-origin block or site unreachable)",
            Self::ManualMetaCheck => "check meta tags manually",
            Self::ExternalSpeedTest => "test loading speed with PageSpeed Insights",
        }
    }
}

/// Continuous-improvement suggestions offered once nothing is left to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Suggestion {
    StructuredData,
    Mobile,
    Backlinks,
    Conversion,
    CoreWebVitals,
}

impl Suggestion {
    pub fn message(self) -> &'static str {
        match self {
            Self::StructuredData => "add structured data (Schema.org)",
            Self::Mobile => "optimize further for mobile",
            Self::Backlinks => "develop a backlink strategy",
            Self::Conversion => "improve the conversion rate",
            Self::CoreWebVitals => "optimize Core Web Vitals",
        }
    }
}

/// Hints produced by the signal-free quick analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum QuickHint {
    TitleReview,
    MetaReview,
    MobileReview,
    LoadTime,
    KeywordFocus,
}

impl QuickHint {
    pub fn message(self) -> &'static str {
        match self {
            Self::TitleReview => "title optimization recommended",
            Self::MetaReview => "meta description could be improved",
            Self::MobileReview => "mobile optimization needed",
            Self::LoadTime => "reduce load time",
            Self::KeywordFocus => "target keywords need optimizing",
        }
    }

    fn category(self) -> Option<IssueCategory> {
        match self {
            Self::TitleReview => Some(IssueCategory::Title),
            Self::MetaReview => Some(IssueCategory::MetaDescription),
            Self::MobileReview | Self::LoadTime | Self::KeywordFocus => None,
        }
    }
}

// ── Issue ───────────────────────────────────────────────────────────

/// How loudly an issue should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// A detected deficiency, advisory, or suggestion attached to a site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Issue {
    /// Placeholder for a site that has never been analyzed.
    Pending,
    TitleTooShort,
    TitleTooLong,
    MetaDescriptionMissing,
    MetaDescriptionTooShort,
    NoH1,
    MultipleH1,
    ImagesWithoutAlt { count: u32 },
    WeakInternalLinking,
    TooManyScripts,
    PageTooHeavy,
    MissingLang,
    /// Sentinel for a clean analysis.
    NoMajorProblems,
    Advisory(Advisory),
    Suggestion(Suggestion),
    QuickHint(QuickHint),
    /// Free-form text, classified by keyword when optimized.
    Custom(String),
}

impl Issue {
    /// The optimizer category this issue resolves under, if any.
    pub fn category(&self) -> Option<IssueCategory> {
        match self {
            Self::TitleTooShort | Self::TitleTooLong => Some(IssueCategory::Title),
            Self::MetaDescriptionMissing | Self::MetaDescriptionTooShort => {
                Some(IssueCategory::MetaDescription)
            }
            Self::NoH1 | Self::MultipleH1 => Some(IssueCategory::H1),
            Self::ImagesWithoutAlt { .. } => Some(IssueCategory::Alt),
            Self::WeakInternalLinking => Some(IssueCategory::InternalLinks),
            Self::TooManyScripts => Some(IssueCategory::Scripts),
            Self::PageTooHeavy => Some(IssueCategory::HeavyPage),
            Self::MissingLang => Some(IssueCategory::Lang),
            Self::QuickHint(hint) => hint.category(),
            Self::Custom(text) => IssueCategory::match_text(text),
            Self::Pending
            | Self::NoMajorProblems
            | Self::Advisory(_)
            | Self::Suggestion(_) => None,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::TitleTooShort
            | Self::MetaDescriptionMissing
            | Self::NoH1
            | Self::ImagesWithoutAlt { .. }
            | Self::MissingLang => Severity::Critical,
            Self::TitleTooLong
            | Self::MetaDescriptionTooShort
            | Self::MultipleH1
            | Self::WeakInternalLinking
            | Self::TooManyScripts
            | Self::PageTooHeavy
            | Self::Advisory(Advisory::LimitedAnalysis)
            | Self::QuickHint(_)
            | Self::Custom(_) => Severity::Warning,
            Self::Pending
            | Self::NoMajorProblems
            | Self::Advisory(_)
            | Self::Suggestion(_) => Severity::Info,
        }
    }

    /// Whether this is one of the "nothing left to fix" placeholders.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Pending | Self::NoMajorProblems)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending analysis"),
            Self::TitleTooShort => f.write_str("title too short"),
            Self::TitleTooLong => f.write_str("title too long"),
            Self::MetaDescriptionMissing => f.write_str("meta description missing"),
            Self::MetaDescriptionTooShort => f.write_str("meta description too short"),
            Self::NoH1 => f.write_str("no H1 found"),
            Self::MultipleH1 => f.write_str("multiple H1 tags"),
            Self::ImagesWithoutAlt { count: 1 } => f.write_str("1 image without alt"),
            Self::ImagesWithoutAlt { count } => write!(f, "{count} images without alt"),
            Self::WeakInternalLinking => f.write_str("weak internal linking"),
            Self::TooManyScripts => f.write_str("too many scripts"),
            Self::PageTooHeavy => f.write_str("page too heavy"),
            Self::MissingLang => f.write_str("missing lang attribute"),
            Self::NoMajorProblems => f.write_str("no major problems detected"),
            Self::Advisory(a) => f.write_str(a.message()),
            Self::Suggestion(s) => f.write_str(s.message()),
            Self::QuickHint(h) => f.write_str(h.message()),
            Self::Custom(text) => f.write_str(text),
        }
    }
}

impl FromStr for Issue {
    type Err = Infallible;

    /// Map known display text back to its variant; anything else is `Custom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use strum::IntoEnumIterator;

        let text = s.trim();
        let fixed = match text {
            "pending analysis" => Some(Self::Pending),
            "title too short" => Some(Self::TitleTooShort),
            "title too long" => Some(Self::TitleTooLong),
            "meta description missing" => Some(Self::MetaDescriptionMissing),
            "meta description too short" => Some(Self::MetaDescriptionTooShort),
            "no H1 found" => Some(Self::NoH1),
            "multiple H1 tags" => Some(Self::MultipleH1),
            "weak internal linking" => Some(Self::WeakInternalLinking),
            "too many scripts" => Some(Self::TooManyScripts),
            "page too heavy" => Some(Self::PageTooHeavy),
            "missing lang attribute" => Some(Self::MissingLang),
            "no major problems detected" => Some(Self::NoMajorProblems),
            _ => None,
        };
        if let Some(issue) = fixed {
            return Ok(issue);
        }

        let count = text
            .strip_suffix(" images without alt")
            .or_else(|| text.strip_suffix(" image without alt"))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(count) = count {
            return Ok(Self::ImagesWithoutAlt { count });
        }

        if let Some(a) = Advisory::iter().find(|a| a.message() == text) {
            return Ok(Self::Advisory(a));
        }
        if let Some(s) = Suggestion::iter().find(|s| s.message() == text) {
            return Ok(Self::Suggestion(s));
        }
        if let Some(h) = QuickHint::iter().find(|h| h.message() == text) {
            return Ok(Self::QuickHint(h));
        }

        Ok(Self::Custom(text.to_owned()))
    }
}

impl From<&str> for Issue {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(issue) => issue,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Issue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Issue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::from(text.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn engine_issues_carry_their_category() {
        assert_eq!(Issue::TitleTooLong.category(), Some(IssueCategory::Title));
        assert_eq!(
            Issue::ImagesWithoutAlt { count: 4 }.category(),
            Some(IssueCategory::Alt)
        );
        assert_eq!(Issue::MissingLang.category(), Some(IssueCategory::Lang));
        assert_eq!(Issue::NoMajorProblems.category(), None);
        assert_eq!(Issue::Suggestion(Suggestion::CoreWebVitals).category(), None);
    }

    #[test]
    fn custom_text_first_match_wins() {
        // Mentions both a title and scripts: title is earlier in the table.
        let issue = Issue::Custom("title rewritten by scripts".into());
        assert_eq!(issue.category(), Some(IssueCategory::Title));

        let issue = Issue::Custom("lang attribute missing".into());
        assert_eq!(issue.category(), Some(IssueCategory::Lang));

        let issue = Issue::Custom("Scripts block rendering".into());
        assert_eq!(issue.category(), Some(IssueCategory::Scripts));

        let issue = Issue::Custom("slow server response".into());
        assert_eq!(issue.category(), None);
    }

    #[test]
    fn alt_matches_as_a_loose_substring() {
        assert_eq!(
            IssueCategory::match_text("alt tags missing on 4 images"),
            Some(IssueCategory::Alt)
        );
        assert_eq!(
            IssueCategory::match_text("3 images missing ALT text"),
            Some(IssueCategory::Alt)
        );
        // Any word containing "alt" counts.
        assert_eq!(
            IssueCategory::match_text("health endpoint slow"),
            Some(IssueCategory::Alt)
        );
        // Earlier rows still win.
        assert_eq!(
            IssueCategory::match_text("title lacks alternative wording"),
            Some(IssueCategory::Title)
        );
        assert_eq!(IssueCategory::match_text("favicon missing"), None);
    }

    #[test]
    fn quick_hints_resolve_only_title_and_meta() {
        assert_eq!(
            Issue::QuickHint(QuickHint::TitleReview).category(),
            Some(IssueCategory::Title)
        );
        assert_eq!(
            Issue::QuickHint(QuickHint::MetaReview).category(),
            Some(IssueCategory::MetaDescription)
        );
        assert_eq!(Issue::QuickHint(QuickHint::LoadTime).category(), None);
    }

    #[test]
    fn display_text_parses_back_to_variant() {
        assert_eq!(Issue::from("no H1 found"), Issue::NoH1);
        assert_eq!(
            Issue::from("3 images without alt"),
            Issue::ImagesWithoutAlt { count: 3 }
        );
        assert_eq!(
            Issue::from("1 image without alt"),
            Issue::ImagesWithoutAlt { count: 1 }
        );
        assert_eq!(
            Issue::from("check meta tags manually"),
            Issue::Advisory(Advisory::ManualMetaCheck)
        );
        assert_eq!(
            Issue::from("  something else  "),
            Issue::Custom("something else".into())
        );
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&vec![
            Issue::TitleTooShort,
            Issue::ImagesWithoutAlt { count: 2 },
        ])
        .unwrap();
        assert_eq!(json, r#"["title too short","2 images without alt"]"#);

        let back: Vec<Issue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[1], Issue::ImagesWithoutAlt { count: 2 });
    }

    #[test]
    fn severity_orders_critical_highest() {
        assert!(Issue::NoH1.severity() > Issue::MultipleH1.severity());
        assert_eq!(Issue::NoMajorProblems.severity(), Severity::Info);
    }
}

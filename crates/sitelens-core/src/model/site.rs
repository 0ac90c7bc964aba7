// ── Site domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::issue::Issue;
use super::site_id::SiteId;
use crate::error::CoreError;

/// Upper bound of every score dimension.
pub const SCORE_MAX: u8 = 100;

/// Keyword assigned when the user supplies none.
pub const DEFAULT_KEYWORD: &str = "general";

// ── Status ──────────────────────────────────────────────────────────

/// Health badge derived from a site's scores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SiteStatus {
    Online,
    Warning,
    Error,
}

impl SiteStatus {
    /// Status from SEO and performance scores.
    ///
    /// Both at 80 or above is Online; either at 60 or above is Warning.
    pub fn derive(seo: u8, performance: u8) -> Self {
        if seo >= 80 && performance >= 80 {
            Self::Online
        } else if seo >= 60 || performance >= 60 {
            Self::Warning
        } else {
            Self::Error
        }
    }

    /// Status reported by the quick analysis, which only looks at SEO.
    pub fn from_quick_score(seo: u8) -> Self {
        if seo >= 75 {
            Self::Online
        } else if seo >= 55 {
            Self::Warning
        } else {
            Self::Error
        }
    }
}

// ── Scores ──────────────────────────────────────────────────────────

/// The three score dimensions, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "seo_score")]
    pub seo: u8,
    pub performance: u8,
    pub accessibility: u8,
}

impl Scores {
    /// Build a score triple, capping each dimension at [`SCORE_MAX`].
    pub fn new(seo: u8, performance: u8, accessibility: u8) -> Self {
        Self {
            seo: seo.min(SCORE_MAX),
            performance: performance.min(SCORE_MAX),
            accessibility: accessibility.min(SCORE_MAX),
        }
    }

    pub fn status(self) -> SiteStatus {
        SiteStatus::derive(self.seo, self.performance)
    }
}

/// Clamp a signed running total into a score.
pub(crate) fn clamp_score(value: i32) -> u8 {
    u8::try_from(value.clamp(0, i32::from(SCORE_MAX))).unwrap_or(SCORE_MAX)
}

/// Add an improvement to a score, capped at [`SCORE_MAX`].
pub(crate) fn raise_score(score: u8, by: u32) -> u8 {
    let raised = u32::from(score).saturating_add(by).min(u32::from(SCORE_MAX));
    u8::try_from(raised).unwrap_or(SCORE_MAX)
}

// ── Site ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    /// Normalized URL, unique across the registry.
    pub url: String,
    pub status: SiteStatus,
    #[serde(flatten)]
    pub scores: Scores,
    /// Ordered, de-duplicated, never empty.
    pub keywords: Vec<String>,
    pub last_analysis: Option<DateTime<Utc>>,
    pub issues: Vec<Issue>,
}

impl Site {
    /// A freshly registered, never-analyzed site.
    pub fn new(id: SiteId, url: String, keywords: Vec<String>) -> Self {
        let scores = Scores::default();
        Self {
            id,
            url,
            status: scores.status(),
            scores,
            keywords,
            last_analysis: None,
            issues: vec![Issue::Pending],
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.last_analysis.is_some()
    }

    /// Host part of the URL, for compact display.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
    }

    /// Replace scores, status, and issues in one step, stamping the time.
    pub(crate) fn record(
        &mut self,
        scores: Scores,
        status: SiteStatus,
        issues: Vec<Issue>,
        at: DateTime<Utc>,
    ) {
        self.scores = scores;
        self.status = status;
        self.issues = issues;
        self.last_analysis = Some(at);
    }
}

// ── Input normalization ─────────────────────────────────────────────

/// Normalize user-supplied URL text.
///
/// Accepts bare hosts (`example.com`) by assuming `https://`. Only http(s)
/// URLs with a host are accepted.
pub fn normalize_url(input: &str) -> Result<String, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidUrl {
            input: input.into(),
            reason: "URL is empty".into(),
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| CoreError::InvalidUrl {
        input: input.into(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CoreError::InvalidUrl {
            input: input.into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(CoreError::InvalidUrl {
            input: input.into(),
            reason: "URL has no host".into(),
        });
    }

    Ok(url.to_string())
}

/// Turn keyword input into an ordered set, falling back to `default`.
pub fn normalize_keywords<I, S>(keywords: I, default: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().trim();
        if !keyword.is_empty() && !out.iter().any(|k| k == keyword) {
            out.push(keyword.to_owned());
        }
    }
    if out.is_empty() {
        out.push(default.to_owned());
    }
    out
}

/// Split comma-separated keyword input.
pub fn parse_keywords(input: &str, default: &str) -> Vec<String> {
    normalize_keywords(input.split(','), default)
}

// ── Optimization engine ──
//
// Simulated fix-up pass: every issue with a known category is resolved
// and credited to the matching score dimension; everything else is kept.
// Sites that end up with nothing left to fix get two fresh suggestions so
// the issue list never goes empty.

use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;

use crate::model::site::raise_score;
use crate::model::{Issue, IssueCategory, Scores, Suggestion};

/// Scores below this earn a flat top-up on every pass.
const TOP_UP_THRESHOLD: u8 = 80;
const SEO_TOP_UP: u32 = 5;
const PERFORMANCE_TOP_UP: u32 = 8;
const SUGGESTIONS_PER_PASS: usize = 2;

/// Score credit for resolving one issue of a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Delta {
    seo: u32,
    performance: u32,
    accessibility: u32,
}

fn delta(category: IssueCategory) -> Delta {
    match category {
        IssueCategory::Title => Delta {
            seo: 10,
            ..Delta::default()
        },
        IssueCategory::MetaDescription => Delta {
            seo: 15,
            ..Delta::default()
        },
        IssueCategory::Alt => Delta {
            seo: 8,
            accessibility: 12,
            ..Delta::default()
        },
        IssueCategory::H1 => Delta {
            seo: 12,
            ..Delta::default()
        },
        IssueCategory::InternalLinks => Delta {
            seo: 8,
            ..Delta::default()
        },
        IssueCategory::Scripts => Delta {
            performance: 15,
            ..Delta::default()
        },
        IssueCategory::Lang => Delta {
            accessibility: 15,
            ..Delta::default()
        },
        IssueCategory::HeavyPage => Delta {
            performance: 10,
            ..Delta::default()
        },
    }
}

/// One change applied during an optimization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimization {
    Resolved(IssueCategory),
    SeoTopUp,
    PerformanceTopUp,
}

impl fmt::Display for Optimization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Resolved(IssueCategory::Title) => "title optimized",
            Self::Resolved(IssueCategory::MetaDescription) => "meta description improved",
            Self::Resolved(IssueCategory::Alt) => "alt attributes added",
            Self::Resolved(IssueCategory::H1) => "heading structure fixed",
            Self::Resolved(IssueCategory::InternalLinks) => "internal linking improved",
            Self::Resolved(IssueCategory::Scripts) => "scripts optimized",
            Self::Resolved(IssueCategory::Lang) => "lang attribute added",
            Self::Resolved(IssueCategory::HeavyPage) => "page weight reduced",
            Self::SeoTopUp => "general SEO tuning",
            Self::PerformanceTopUp => "general performance tuning",
        };
        f.write_str(text)
    }
}

impl Serialize for Optimization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of one optimization pass, not yet applied to a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizationOutcome {
    pub seo_improvement: u32,
    pub performance_improvement: u32,
    pub accessibility_improvement: u32,
    /// Never empty.
    pub remaining_issues: Vec<Issue>,
    pub applied: Vec<Optimization>,
}

impl OptimizationOutcome {
    /// Add the improvements to `current`, capping each score at 100.
    pub fn apply(&self, current: Scores) -> Scores {
        Scores::new(
            raise_score(current.seo, self.seo_improvement),
            raise_score(current.performance, self.performance_improvement),
            raise_score(current.accessibility, self.accessibility_improvement),
        )
    }
}

/// Run one optimization pass over `issues`.
///
/// Issues are visited in order; each one with a category is resolved and
/// dropped, the rest are carried over verbatim. Top-ups depend on the
/// scores before this pass.
pub fn optimize<R: Rng + ?Sized>(
    issues: &[Issue],
    current: Scores,
    rng: &mut R,
) -> OptimizationOutcome {
    let mut outcome = OptimizationOutcome {
        seo_improvement: 0,
        performance_improvement: 0,
        accessibility_improvement: 0,
        remaining_issues: Vec::new(),
        applied: Vec::new(),
    };

    for issue in issues {
        if let Some(category) = issue.category() {
            let d = delta(category);
            outcome.seo_improvement += d.seo;
            outcome.performance_improvement += d.performance;
            outcome.accessibility_improvement += d.accessibility;
            outcome.applied.push(Optimization::Resolved(category));
        } else {
            outcome.remaining_issues.push(issue.clone());
        }
    }

    if current.seo < TOP_UP_THRESHOLD {
        outcome.seo_improvement += SEO_TOP_UP;
        outcome.applied.push(Optimization::SeoTopUp);
    }
    if current.performance < TOP_UP_THRESHOLD {
        outcome.performance_improvement += PERFORMANCE_TOP_UP;
        outcome.applied.push(Optimization::PerformanceTopUp);
    }

    if outcome.remaining_issues.is_empty() {
        let pool: Vec<Suggestion> = Suggestion::iter().collect();
        outcome.remaining_issues = pool
            .choose_multiple(rng, SUGGESTIONS_PER_PASS)
            .copied()
            .map(Issue::Suggestion)
            .collect();
    }

    outcome
}

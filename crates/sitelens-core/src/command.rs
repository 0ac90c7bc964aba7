// ── Command API ──
//
// Every mutation of the registry, apart from confirmation-gated removal,
// flows through a unified `Command` enum executed by the controller.

use std::sync::Arc;

use crate::analysis::{Optimization, ScoreReport};
use crate::model::{Site, SiteId};

/// All possible write operations on the site registry.
#[derive(Debug, Clone)]
pub enum Command {
    /// Register a site. `url` is raw user input; `keywords` may be empty.
    AddSite {
        url: String,
        keywords: Vec<String>,
    },
    /// Fetch, extract, and score one site.
    AnalyzeSite {
        id: SiteId,
    },
    /// Run one simulated optimization pass on one site.
    OptimizeSite {
        id: SiteId,
    },
    /// Quick-analyze every registered site, staggered.
    QuickAnalyzeAll,
}

/// How an analysis arrived at its scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnalysisSource {
    /// Markup fetched and scored.
    Page,
    /// Fetch failed; estimated scores.
    Fallback,
}

/// Result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// A site was registered.
    Added(Arc<Site>),
    Analyzed {
        site: Arc<Site>,
        report: ScoreReport,
        source: AnalysisSource,
    },
    Optimized {
        site: Arc<Site>,
        applied: Vec<Optimization>,
    },
    /// Bulk quick analysis finished; number of sites analyzed.
    QuickAnalyzed(usize),
    Removed(Arc<Site>),
    /// The user declined a confirmation prompt; nothing changed.
    Declined,
}

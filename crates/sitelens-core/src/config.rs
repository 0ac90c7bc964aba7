// ── Runtime engine configuration ──
//
// Tuning knobs for the controller. Core never reads config files: the
// CLI builds an `EngineConfig` from `sitelens-config` and hands it in.

use std::time::Duration;

use crate::model::DEFAULT_KEYWORD;

/// Configuration for one controller instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Simulated work time of one optimization pass.
    pub optimize_delay: Duration,
    /// Spacing between sites in a bulk quick analysis.
    pub quick_stagger: Duration,
    /// Fixed seed for reproducible runs. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Keyword assigned to sites registered without any.
    pub default_keyword: String,
}

impl EngineConfig {
    /// Same settings with every simulated delay removed.
    pub fn without_delays(mut self) -> Self {
        self.optimize_delay = Duration::ZERO;
        self.quick_stagger = Duration::ZERO;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            optimize_delay: Duration::from_secs(2),
            quick_stagger: Duration::from_millis(800),
            seed: None,
            default_keyword: DEFAULT_KEYWORD.into(),
        }
    }
}

/// A site declared up front, e.g. in the `[[sites]]` config table.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SiteSeed {
    pub url: String,
    pub keywords: Vec<String>,
    /// Known issues, as display text. Unrecognized text is kept verbatim.
    pub issues: Vec<String>,
}

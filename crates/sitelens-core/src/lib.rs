//! Scoring and optimization engine for the sitelens workspace.
//!
//! - **[`Controller`]**: Central facade. Registers sites, runs analyses
//!   and optimization passes, schedules bulk quick analyses, and gates
//!   removal behind a [`ConfirmRemoval`] collaborator.
//!
//! - **[`SiteRegistry`]**: Lock-free reactive storage built on
//!   `EntityCollection<T>` (`DashMap` + `tokio::sync::watch` channels).
//!   Every mutation is a whole-site swap pushed to subscribers.
//!
//! - **[`EntityStream<T>`]**: Subscription handle vended by the registry.
//!   Exposes `current()` / `latest()` / `changed()` for reactive rendering.
//!
//! - **[`analysis`]**: Pure rule engine: signal extraction, scoring,
//!   fallback estimates, optimization passes, quick analysis, and
//!   portfolio recommendations. Randomness is always injected.
//!
//! - **Domain model** ([`model`]): [`Site`], [`Scores`], [`SiteStatus`],
//!   and the tagged [`Issue`] enum.

pub mod analysis;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use analysis::{
    Optimization, OptimizationOutcome, Priority, Recommendation, ScoreReport, SignalBundle,
};
pub use command::{AnalysisSource, Command, CommandResult};
pub use config::{EngineConfig, SiteSeed};
pub use controller::{BulkProgress, ConfirmRemoval, Controller};
pub use error::CoreError;
pub use store::SiteRegistry;
pub use stream::{EntityStream, Snapshot};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Advisory, DEFAULT_KEYWORD, Issue, IssueCategory, QuickHint, Scores, Severity, Site, SiteId,
    SiteStatus, Suggestion, normalize_url, parse_keywords,
};

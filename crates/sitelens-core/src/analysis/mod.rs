// ── Analysis engine ──
//
// Pure, synchronous rules. Randomness is injected by the caller so every
// function here is reproducible under a seeded generator.

pub mod fallback;
pub mod optimize;
pub mod quick;
pub mod recommend;
pub mod scoring;
pub mod signals;

pub use fallback::fallback;
pub use optimize::{Optimization, OptimizationOutcome, optimize};
pub use quick::quick_analysis;
pub use recommend::{Priority, Recommendation, recommend};
pub use scoring::{ScoreReport, score};
pub use signals::SignalBundle;

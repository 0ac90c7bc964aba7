// ── Fallback analysis ──
//
// Used when a page cannot be fetched. Scores are plausible mid-range
// guesses and the issue list tells the user the analysis was limited.

use rand::Rng;
use strum::IntoEnumIterator;

use super::scoring::ScoreReport;
use crate::model::{Advisory, Issue, Scores, SiteStatus};

/// Generate a fallback report.
///
/// SEO lands in `[40, 70)`, performance in `[50, 80)`, accessibility in
/// `[45, 75)`. Status is always Warning, regardless of the drawn scores.
pub fn fallback<R: Rng + ?Sized>(rng: &mut R) -> ScoreReport {
    let scores = Scores::new(
        rng.random_range(40..70),
        rng.random_range(50..80),
        rng.random_range(45..75),
    );

    ScoreReport {
        scores,
        status: SiteStatus::Warning,
        issues: Advisory::iter().map(Issue::Advisory).collect(),
    }
}

// ── Quick analysis ──
//
// Signal-free estimate used by the bulk "analyze everything" pass. No
// page is fetched; scores and hints are drawn from the random source.

use rand::Rng;
use rand::seq::IndexedRandom;
use strum::IntoEnumIterator;

use super::scoring::ScoreReport;
use crate::model::{Issue, QuickHint, Scores, SiteStatus};

/// Produce a quick estimate.
///
/// SEO lands in `[45, 85)`, performance in `[50, 85)`, accessibility in
/// `[55, 85)`. Two to four distinct hints are attached and the status is
/// judged on SEO alone.
pub fn quick_analysis<R: Rng + ?Sized>(rng: &mut R) -> ScoreReport {
    let scores = Scores::new(
        rng.random_range(45..85),
        rng.random_range(50..85),
        rng.random_range(55..85),
    );

    let pool: Vec<QuickHint> = QuickHint::iter().collect();
    let count = rng.random_range(2..=4);
    let issues = pool
        .choose_multiple(rng, count)
        .copied()
        .map(Issue::QuickHint)
        .collect();

    ScoreReport {
        scores,
        status: SiteStatus::from_quick_score(scores.seo),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn ranges_and_hint_counts_hold() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let report = quick_analysis(&mut rng);
            assert!((45..85).contains(&report.scores.seo));
            assert!((50..85).contains(&report.scores.performance));
            assert!((55..85).contains(&report.scores.accessibility));
            assert!((2..=4).contains(&report.issues.len()));

            let distinct: HashSet<_> = report.issues.iter().collect();
            assert_eq!(distinct.len(), report.issues.len());
            assert!(report.issues.iter().all(|i| matches!(i, Issue::QuickHint(_))));
        }
    }

    #[test]
    fn status_follows_seo_only() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let report = quick_analysis(&mut rng);
            assert_eq!(report.status, SiteStatus::from_quick_score(report.scores.seo));
        }
    }

    #[test]
    fn same_seed_same_report() {
        let a = quick_analysis(&mut StdRng::seed_from_u64(11));
        let b = quick_analysis(&mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}

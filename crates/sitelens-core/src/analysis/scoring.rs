// ── Scoring rules ──
//
// Fixed rule table over a `SignalBundle`. SEO starts at 50 and
// accumulates signed deltas; performance starts at 85 and accessibility at
// 75. Every score is clamped into 0..=100 at the end.

use serde::Serialize;

use super::signals::SignalBundle;
use crate::model::site::clamp_score;
use crate::model::{Issue, Scores, SiteStatus};

const SEO_BASE: i32 = 50;
const PERFORMANCE_BASE: i32 = 85;
const ACCESSIBILITY_BASE: i32 = 75;

const TITLE_MIN: usize = 30;
const TITLE_MAX: usize = 60;
const META_MIN: usize = 120;
const INTERNAL_LINKS_MIN: usize = 3;
const SCRIPTS_MAX: usize = 10;
const STYLES_MAX: usize = 5;
const PAGE_BYTES_MAX: usize = 100_000;
const ALT_PENALTY_CAP: usize = 20;

/// Scores, status, and issues produced by one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub scores: Scores,
    pub status: SiteStatus,
    pub issues: Vec<Issue>,
}

/// Apply the rule table to a signal bundle.
///
/// Issues come out in rule order: title, meta description, H1, images,
/// internal links, scripts, page weight, lang. A page that trips no rule
/// gets the single `NoMajorProblems` entry.
pub fn score(signals: &SignalBundle) -> ScoreReport {
    let mut issues = Vec::new();

    // ── SEO ──────────────────────────────────────────────────────────
    let mut seo = 0i32;

    if signals.title_length < TITLE_MIN {
        issues.push(Issue::TitleTooShort);
        seo -= 15;
    } else if signals.title_length > TITLE_MAX {
        issues.push(Issue::TitleTooLong);
        seo -= 5;
    } else {
        seo += 15;
    }

    if !signals.has_meta_description {
        issues.push(Issue::MetaDescriptionMissing);
        seo -= 20;
    } else if signals.meta_description_length < META_MIN {
        issues.push(Issue::MetaDescriptionTooShort);
        seo -= 10;
    } else {
        seo += 20;
    }

    match signals.h1_count {
        0 => {
            issues.push(Issue::NoH1);
            seo -= 15;
        }
        1 => seo += 15,
        _ => {
            issues.push(Issue::MultipleH1);
            seo -= 5;
        }
    }

    let missing_alt = signals.images_without_alt;
    if missing_alt > 0 {
        issues.push(Issue::ImagesWithoutAlt {
            count: u32::try_from(missing_alt).unwrap_or(u32::MAX),
        });
        let penalty = missing_alt.saturating_mul(3).min(ALT_PENALTY_CAP);
        seo -= i32::try_from(penalty).unwrap_or(20);
    } else if signals.image_count > 0 {
        seo += 10;
    }

    if signals.internal_link_count < INTERNAL_LINKS_MIN {
        issues.push(Issue::WeakInternalLinking);
        seo -= 10;
    } else {
        seo += 10;
    }

    // ── Performance ──────────────────────────────────────────────────
    let mut performance = PERFORMANCE_BASE;

    if signals.script_tag_count > SCRIPTS_MAX {
        issues.push(Issue::TooManyScripts);
        performance -= 15;
    }
    if signals.style_tag_count > STYLES_MAX {
        performance -= 5;
    }
    if signals.content_byte_length > PAGE_BYTES_MAX {
        issues.push(Issue::PageTooHeavy);
        performance -= 10;
    }

    // ── Accessibility ────────────────────────────────────────────────
    let mut accessibility = ACCESSIBILITY_BASE;

    if signals.has_lang_attribute {
        accessibility += 10;
    } else {
        issues.push(Issue::MissingLang);
        accessibility -= 15;
    }

    if issues.is_empty() {
        issues.push(Issue::NoMajorProblems);
    }

    let scores = Scores::new(
        clamp_score(SEO_BASE + seo),
        clamp_score(performance),
        clamp_score(accessibility),
    );

    ScoreReport {
        scores,
        status: scores.status(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clean_page() -> SignalBundle {
        SignalBundle {
            title_length: 45,
            has_meta_description: true,
            meta_description_length: 150,
            h1_count: 1,
            image_count: 3,
            images_without_alt: 0,
            total_link_count: 6,
            internal_link_count: 4,
            script_tag_count: 2,
            style_tag_count: 1,
            content_byte_length: 20_000,
            has_lang_attribute: true,
        }
    }

    #[test]
    fn clean_page_scores_full_seo() {
        let report = score(&clean_page());

        assert_eq!(report.scores, Scores::new(100, 85, 85));
        assert_eq!(report.issues, vec![Issue::NoMajorProblems]);
        assert_eq!(report.status, SiteStatus::Online);
    }

    #[test]
    fn scoring_is_repeatable() {
        let signals = SignalBundle {
            title_length: 12,
            h1_count: 2,
            image_count: 5,
            images_without_alt: 2,
            internal_link_count: 1,
            script_tag_count: 12,
            content_byte_length: 150_000,
            ..SignalBundle::default()
        };

        let first = score(&signals);
        let second = score(&signals);
        assert_eq!(first.scores, second.scores);
        assert_eq!(first.issues, second.issues);
        assert_eq!(
            first.issues,
            vec![
                Issue::TitleTooShort,
                Issue::MetaDescriptionMissing,
                Issue::MultipleH1,
                Issue::ImagesWithoutAlt { count: 2 },
                Issue::WeakInternalLinking,
                Issue::TooManyScripts,
                Issue::PageTooHeavy,
                Issue::MissingLang,
            ]
        );
    }

    #[test]
    fn bare_page_bottoms_out_seo() {
        let signals = SignalBundle {
            content_byte_length: 120,
            ..SignalBundle::default()
        };
        let report = score(&signals);

        // 50 - 15 - 20 - 15 - 10
        assert_eq!(report.scores.seo, 0);
        assert_eq!(report.scores.performance, 85);
        assert_eq!(report.scores.accessibility, 60);
        assert_eq!(
            report.issues,
            vec![
                Issue::TitleTooShort,
                Issue::MetaDescriptionMissing,
                Issue::NoH1,
                Issue::WeakInternalLinking,
                Issue::MissingLang,
            ]
        );
        assert_eq!(report.status, SiteStatus::Warning);
    }

    #[test]
    fn missing_alt_penalty_scales_then_caps() {
        let signals = SignalBundle {
            title_length: 61,
            image_count: 7,
            images_without_alt: 3,
            ..clean_page()
        };
        let report = score(&signals);
        // 50 - 5 + 20 + 15 - 9 + 10
        assert_eq!(report.scores.seo, 81);
        assert_eq!(
            report.issues,
            vec![Issue::TitleTooLong, Issue::ImagesWithoutAlt { count: 3 }]
        );

        let signals = SignalBundle {
            image_count: 30,
            images_without_alt: 12,
            ..clean_page()
        };
        // 50 + 15 + 20 + 15 - 20 + 10, penalty capped at 20.
        assert_eq!(score(&signals).scores.seo, 90);
    }

    #[test]
    fn no_images_means_no_image_bonus() {
        let signals = SignalBundle {
            image_count: 0,
            ..clean_page()
        };
        assert_eq!(score(&signals).scores.seo, 100);

        let signals = SignalBundle {
            image_count: 0,
            title_length: 61,
            ..clean_page()
        };
        // 50 - 5 + 20 + 15 + 10
        assert_eq!(score(&signals).scores.seo, 90);
    }

    #[test]
    fn performance_penalties_stack() {
        let signals = SignalBundle {
            script_tag_count: 11,
            style_tag_count: 6,
            content_byte_length: 100_001,
            ..clean_page()
        };
        let report = score(&signals);

        assert_eq!(report.scores.performance, 55);
        assert_eq!(
            report.issues,
            vec![Issue::TooManyScripts, Issue::PageTooHeavy]
        );
        assert_eq!(report.status, SiteStatus::Warning);
    }

    #[test]
    fn boundaries_are_inclusive_where_expected() {
        let signals = SignalBundle {
            title_length: 30,
            meta_description_length: 120,
            internal_link_count: 3,
            script_tag_count: 10,
            style_tag_count: 5,
            content_byte_length: 100_000,
            ..clean_page()
        };
        let report = score(&signals);
        assert_eq!(report.issues, vec![Issue::NoMajorProblems]);
        assert_eq!(report.scores.performance, 85);
    }

    #[test]
    fn multiple_h1_and_short_meta_are_mild() {
        let signals = SignalBundle {
            h1_count: 2,
            meta_description_length: 80,
            ..clean_page()
        };
        let report = score(&signals);
        // 50 + 15 - 10 - 5 + 10 + 10
        assert_eq!(report.scores.seo, 70);
        assert_eq!(
            report.issues,
            vec![Issue::MetaDescriptionTooShort, Issue::MultipleH1]
        );
    }
}

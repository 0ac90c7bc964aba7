// ── Portfolio recommendations ──

use std::sync::Arc;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Scores, Site};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub action: String,
}

impl Recommendation {
    fn new(priority: Priority, title: &str, description: String, action: &str) -> Self {
        Self {
            priority,
            title: title.into(),
            description,
            action: action.into(),
        }
    }
}

/// Rounded (half up) mean of one score dimension.
fn average(sites: &[Arc<Site>], pick: impl Fn(&Scores) -> u8) -> u8 {
    let n = u64::try_from(sites.len()).unwrap_or(u64::MAX).max(1);
    let sum: u64 = sites.iter().map(|s| u64::from(pick(&s.scores))).sum();
    u8::try_from((2 * sum + n) / (2 * n)).unwrap_or(u8::MAX)
}

/// Portfolio-wide advice from average scores.
///
/// Returns [`CoreError::EmptyRegistry`] when there is nothing to average.
pub fn recommend(sites: &[Arc<Site>]) -> Result<Vec<Recommendation>, CoreError> {
    if sites.is_empty() {
        return Err(CoreError::EmptyRegistry);
    }

    let seo = average(sites, |s| s.seo);
    let performance = average(sites, |s| s.performance);
    let accessibility = average(sites, |s| s.accessibility);

    let mut out = Vec::new();

    if seo < 70 {
        out.push(Recommendation::new(
            Priority::High,
            "Critical SEO improvement needed",
            format!(
                "Average SEO score: {seo}/100. Optimize title tags, meta descriptions and H1-H6 structure."
            ),
            "Prioritize SEO optimization across all sites",
        ));
    }
    if performance < 75 {
        out.push(Recommendation::new(
            Priority::High,
            "Web performance needs work",
            format!(
                "Average performance: {performance}/100. Compress images, minify CSS/JS and enable caching."
            ),
            "Use automated optimization tooling",
        ));
    }
    if accessibility < 80 {
        out.push(Recommendation::new(
            Priority::Medium,
            "Strengthen accessibility",
            format!(
                "Average accessibility: {accessibility}/100. Add ALT attributes and improve contrast."
            ),
            "Audit content accessibility",
        ));
    }

    out.push(Recommendation::new(
        Priority::Medium,
        "Content strategy",
        "Publish regular content optimized for your target keywords.".into(),
        "Plan an SEO editorial calendar",
    ));
    out.push(Recommendation::new(
        Priority::Low,
        "Competitive analysis",
        "Track competitor performance to spot new opportunities.".into(),
        "Use competitive monitoring tools",
    ));

    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::SiteId;

    fn site(id: u64, seo: u8, performance: u8, accessibility: u8) -> Arc<Site> {
        let mut site = Site::new(SiteId::new(id), format!("https://s{id}.test/"), vec![]);
        site.scores = Scores::new(seo, performance, accessibility);
        Arc::new(site)
    }

    fn priorities(recs: &[Recommendation]) -> Vec<Priority> {
        recs.iter().map(|r| r.priority).collect()
    }

    #[test]
    fn empty_portfolio_is_an_error() {
        assert!(matches!(recommend(&[]), Err(CoreError::EmptyRegistry)));
    }

    #[test]
    fn weak_portfolio_gets_everything() {
        let recs = recommend(&[site(1, 40, 50, 60), site(2, 60, 70, 70)]).unwrap();
        assert_eq!(
            priorities(&recs),
            vec![
                Priority::High,
                Priority::High,
                Priority::Medium,
                Priority::Medium,
                Priority::Low,
            ]
        );
        assert!(recs[0].description.contains("50/100"));
    }

    #[test]
    fn strong_portfolio_gets_only_standing_advice() {
        let recs = recommend(&[site(1, 90, 90, 90)]).unwrap();
        assert_eq!(priorities(&recs), vec![Priority::Medium, Priority::Low]);
        assert_eq!(recs[0].title, "Content strategy");
    }

    #[test]
    fn averages_round_half_up() {
        // SEO mean 69.5 rounds to 70: no SEO item.
        let recs = recommend(&[site(1, 69, 90, 90), site(2, 70, 90, 90)]).unwrap();
        assert_eq!(priorities(&recs), vec![Priority::Medium, Priority::Low]);

        // Performance mean 74.5 rounds to 75: no performance item.
        let recs = recommend(&[site(1, 90, 74, 90), site(2, 90, 75, 90)]).unwrap();
        assert_eq!(recs.len(), 2);
    }
}

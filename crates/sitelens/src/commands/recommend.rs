//! `sitelens recommend`: portfolio advice from average scores.

use owo_colors::OwoColorize;
use tabled::Tabled;

use sitelens_core::{Controller, Priority, Recommendation, SiteSeed};

use crate::cli::{GlobalOpts, SiteTargets};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
pub struct RecommendationRow {
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Action")]
    action: String,
}

impl RecommendationRow {
    pub fn new(rec: &Recommendation, color: bool) -> Self {
        let label = rec.priority.to_string();
        let priority = if color {
            match rec.priority {
                Priority::High => label.red().bold().to_string(),
                Priority::Medium => label.yellow().to_string(),
                Priority::Low => label.dimmed().to_string(),
            }
        } else {
            label
        };
        Self {
            priority,
            title: rec.title.clone(),
            description: rec.description.clone(),
            action: rec.action.clone(),
        }
    }
}

/// Render recommendations in the selected format.
pub fn render(recs: &[Recommendation], global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(global.color_mode());
    output::render_list(
        global.format(),
        recs,
        |r| RecommendationRow::new(r, color),
        |r| r.title.clone(),
    )
}

pub async fn handle(
    controller: &Controller,
    targets: &SiteTargets,
    seeds: Vec<SiteSeed>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let sites = util::register_targets(controller, targets, seeds)?;
    util::require_sites(&sites)?;

    let bar = util::progress_bar(sites.len(), global, "analyzing");
    util::analyze_sites(controller, &sites, &bar).await?;

    let recs = controller.recommendations()?;
    output::print_output(&render(&recs, global)?, global.quiet);
    Ok(())
}

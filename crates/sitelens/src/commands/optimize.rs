//! `sitelens optimize`: analyze, then run simulated optimization passes.

use std::sync::Arc;

use indicatif::ProgressBar;
use serde::Serialize;
use tabled::Tabled;
use tokio::task::JoinSet;

use sitelens_core::{
    AnalysisSource, Command as CoreCommand, CommandResult, Controller, Optimization, Scores, Site,
    SiteSeed, SiteStatus,
};

use crate::cli::{GlobalOpts, OptimizeArgs};
use crate::error::CliError;
use crate::output;

use super::util::{self, AnalyzedSite};

// ── Reports ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PassReport {
    round: u32,
    #[serde(flatten)]
    scores: Scores,
    status: SiteStatus,
    applied: Vec<Optimization>,
}

#[derive(Debug, Serialize)]
struct OptimizeReport {
    site: Arc<Site>,
    source: AnalysisSource,
    baseline: Scores,
    passes: Vec<PassReport>,
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OptimizeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Applied")]
    applied: String,
}

/// `seo/perf/a11y`
fn triple(scores: Scores) -> String {
    format!(
        "{}/{}/{}",
        scores.seo, scores.performance, scores.accessibility
    )
}

impl OptimizeRow {
    fn new(report: &OptimizeReport, color: bool) -> Self {
        let applied: Vec<String> = report
            .passes
            .iter()
            .flat_map(|p| p.applied.iter().map(ToString::to_string))
            .collect();
        Self {
            id: report.site.id.to_string(),
            url: report.site.url.clone(),
            before: triple(report.baseline),
            after: triple(report.site.scores),
            status: util::status_label(&report.site, color),
            applied: if applied.is_empty() {
                "-".into()
            } else {
                applied.join(", ")
            },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: &OptimizeArgs,
    seeds: Vec<SiteSeed>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let sites = util::register_targets(controller, &args.targets, seeds)?;
    util::require_sites(&sites)?;
    let color = output::should_color(global.color_mode());

    let bar = util::progress_bar(sites.len(), global, "analyzing");
    let analyzed = util::analyze_sites(controller, &sites, &bar).await?;

    let passes = sites.len().saturating_mul(usize::try_from(args.rounds).unwrap_or(1));
    let bar = util::progress_bar(passes, global, "optimizing");

    let mut tasks = JoinSet::new();
    for entry in analyzed {
        let controller = controller.clone();
        let bar = bar.clone();
        let rounds = args.rounds;
        tasks.spawn(async move { optimize_rounds(&controller, entry, rounds, &bar).await });
    }

    let mut reports = Vec::with_capacity(sites.len());
    while let Some(joined) = tasks.join_next().await {
        let report = joined.map_err(|e| CliError::Engine {
            message: format!("optimization task failed: {e}"),
        })??;
        reports.push(report);
    }
    bar.finish_and_clear();
    reports.sort_by_key(|r| r.site.id);

    let out = output::render_list(
        global.format(),
        &reports,
        |r| OptimizeRow::new(r, color),
        |r| r.site.url.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Run `rounds` passes on one site, one after another.
async fn optimize_rounds(
    controller: &Controller,
    entry: AnalyzedSite,
    rounds: u32,
    bar: &ProgressBar,
) -> Result<OptimizeReport, CliError> {
    let AnalyzedSite { site, source } = entry;
    let baseline = site.scores;
    let id = site.id;

    let mut latest = site;
    let mut passes = Vec::new();
    for round in 1..=rounds {
        let result = controller.execute(CoreCommand::OptimizeSite { id }).await?;
        let CommandResult::Optimized { site, applied } = result else {
            return Err(CliError::Engine {
                message: format!("unexpected optimization result for site {id}"),
            });
        };
        bar.set_message(site.url.clone());
        bar.inc(1);
        passes.push(PassReport {
            round,
            scores: site.scores,
            status: site.status,
            applied,
        });
        latest = site;
    }

    Ok(OptimizeReport {
        site: latest,
        source,
        baseline,
        passes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitelens_core::SiteId;

    #[test]
    fn row_summarizes_every_pass() {
        let mut site = Site::new(SiteId::new(1), "https://a.test/".into(), vec!["x".into()]);
        site.scores = Scores::new(90, 88, 70);
        site.status = SiteStatus::Online;
        site.last_analysis = Some(chrono::Utc::now());

        let report = OptimizeReport {
            site: Arc::new(site),
            source: AnalysisSource::Page,
            baseline: Scores::new(60, 70, 50),
            passes: vec![
                PassReport {
                    round: 1,
                    scores: Scores::new(80, 80, 60),
                    status: SiteStatus::Online,
                    applied: vec![Optimization::SeoTopUp],
                },
                PassReport {
                    round: 2,
                    scores: Scores::new(90, 88, 70),
                    status: SiteStatus::Online,
                    applied: vec![Optimization::PerformanceTopUp],
                },
            ],
        };

        let row = OptimizeRow::new(&report, false);
        assert_eq!(row.before, "60/70/50");
        assert_eq!(row.after, "90/88/70");
        assert_eq!(row.status, "online");
        assert_eq!(
            row.applied,
            "general SEO tuning, general performance tuning"
        );
    }
}

//! `sitelens analyze`: full or quick analysis of every target site.

use sitelens_core::{Command as CoreCommand, CommandResult, Controller, Site, SiteSeed};

use crate::cli::{AnalyzeArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util::{self, SiteRow};

pub async fn handle(
    controller: &Controller,
    args: &AnalyzeArgs,
    seeds: Vec<SiteSeed>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let sites = util::register_targets(controller, &args.targets, seeds)?;
    util::require_sites(&sites)?;
    let color = output::should_color(global.color_mode());

    if args.quick {
        quick_analyze(controller, global).await?;
        let snapshot = controller.sites_snapshot();
        let out = output::render_list(
            global.format(),
            snapshot.as_slice(),
            |s| SiteRow::new(s, None, color),
            |s| s.url.clone(),
        )?;
        output::print_output(&out, global.quiet);
        print_issues(global, args.issues, snapshot.iter().map(|s| &**s), color);
        return Ok(());
    }

    let bar = util::progress_bar(sites.len(), global, "analyzing");
    let analyzed = util::analyze_sites(controller, &sites, &bar).await?;

    let out = output::render_list(
        global.format(),
        &analyzed,
        |a| SiteRow::new(&a.site, Some(a.source), color),
        |a| a.site.url.clone(),
    )?;
    output::print_output(&out, global.quiet);
    print_issues(global, args.issues, analyzed.iter().map(|a| &*a.site), color);
    Ok(())
}

/// Run the staggered bulk quick analysis, mirroring its progress.
async fn quick_analyze(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let total = controller.sites_snapshot().len();
    let bar = util::progress_bar(total, global, "quick analysis");

    let mut progress = controller.bulk_progress();
    let watcher = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let snapshot = *progress.borrow_and_update();
                bar.set_position(u64::try_from(snapshot.completed).unwrap_or(u64::MAX));
                if snapshot.is_done() {
                    break;
                }
            }
        })
    };

    let result = controller.execute(CoreCommand::QuickAnalyzeAll).await;
    watcher.abort();
    bar.finish_and_clear();

    match result? {
        CommandResult::QuickAnalyzed(count) => {
            tracing::info!(count, total, "quick analysis finished");
            Ok(())
        }
        other => Err(CliError::Engine {
            message: format!("unexpected quick analysis result: {other:?}"),
        }),
    }
}

/// Follow the site table with a per-issue table when `--issues` is set.
///
/// Structured formats already carry the issue list inside each site.
fn print_issues<'a>(
    global: &GlobalOpts,
    enabled: bool,
    sites: impl Iterator<Item = &'a Site>,
    color: bool,
) {
    if !enabled || !matches!(global.format(), OutputFormat::Table) {
        return;
    }
    let rows = util::issue_rows(sites, color);
    if rows.is_empty() {
        output::print_output("No issues found.", global.quiet);
        return;
    }
    output::print_output(&output::render_table(&rows), global.quiet);
}

//! Shared helpers for command handlers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;
use tokio::task::JoinSet;

use sitelens_core::{
    AnalysisSource, Command as CoreCommand, CommandResult, Controller, Site, SiteSeed, parse_keywords,
};

use crate::cli::{GlobalOpts, OutputFormat, SiteTargets};
use crate::error::CliError;
use crate::output;

// ── Site registration ───────────────────────────────────────────────

/// Register the sites named on the command line, or the configured
/// `[[sites]]` when none are given.
///
/// Repeated URLs on the command line are registered once.
pub fn register_targets(
    controller: &Controller,
    targets: &SiteTargets,
    seeds: Vec<SiteSeed>,
) -> Result<Vec<Arc<Site>>, CliError> {
    if targets.urls.is_empty() {
        return Ok(controller.seed_sites(seeds));
    }

    let default = &controller.config().default_keyword;
    let keywords = targets
        .keywords
        .as_deref()
        .map(|k| parse_keywords(k, default))
        .unwrap_or_default();

    let mut sites = Vec::with_capacity(targets.urls.len());
    for url in &targets.urls {
        match controller.add_site(url, &keywords) {
            Ok(site) => sites.push(site),
            Err(sitelens_core::CoreError::DuplicateSite { url }) => {
                tracing::warn!(%url, "site given twice, analyzing once");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(sites)
}

/// Fail with a usage hint when there is nothing to work on.
pub fn require_sites(sites: &[Arc<Site>]) -> Result<(), CliError> {
    if sites.is_empty() {
        return Err(CliError::NoSites {
            path: crate::config::config_path().display().to_string(),
        });
    }
    Ok(())
}

// ── Analysis fan-out ────────────────────────────────────────────────

/// A site together with how its latest analysis was obtained.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedSite {
    #[serde(flatten)]
    pub site: Arc<Site>,
    pub source: AnalysisSource,
}

/// Analyze every site concurrently, returning results in id order.
pub async fn analyze_sites(
    controller: &Controller,
    sites: &[Arc<Site>],
    bar: &ProgressBar,
) -> Result<Vec<AnalyzedSite>, CliError> {
    let mut tasks = JoinSet::new();
    for site in sites {
        let controller = controller.clone();
        let id = site.id;
        tasks.spawn(async move { controller.execute(CoreCommand::AnalyzeSite { id }).await });
    }

    let mut analyzed = Vec::with_capacity(sites.len());
    while let Some(joined) = tasks.join_next().await {
        let result = joined.map_err(|e| CliError::Engine {
            message: format!("analysis task failed: {e}"),
        })??;
        if let CommandResult::Analyzed { site, source, .. } = result {
            bar.set_message(site.url.clone());
            bar.inc(1);
            analyzed.push(AnalyzedSite { site, source });
        }
    }
    bar.finish_and_clear();

    analyzed.sort_by_key(|a| a.site.id);
    Ok(analyzed)
}

/// Progress bar on stderr, hidden for quiet or machine-readable output.
pub fn progress_bar(len: usize, global: &GlobalOpts, label: &str) -> ProgressBar {
    if global.quiet || !matches!(global.format(), OutputFormat::Table) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{spinner} {prefix} [{bar:30}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_prefix(label.to_owned());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

// ── Site table ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "SEO")]
    seo: String,
    #[tabled(rename = "Perf")]
    performance: String,
    #[tabled(rename = "A11y")]
    accessibility: String,
    #[tabled(rename = "Issues")]
    issues: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Analyzed")]
    analyzed: String,
}

impl SiteRow {
    pub fn new(site: &Site, source: Option<AnalysisSource>, color: bool) -> Self {
        let (seo, performance, accessibility) = if site.is_analyzed() {
            (
                output::paint_score(site.scores.seo, color),
                output::paint_score(site.scores.performance, color),
                output::paint_score(site.scores.accessibility, color),
            )
        } else {
            ("-".into(), "-".into(), "-".into())
        };
        Self {
            id: site.id.to_string(),
            url: site.url.clone(),
            status: status_label(site, color),
            seo,
            performance,
            accessibility,
            issues: issue_count(site).to_string(),
            source: source.map_or_else(|| "-".into(), |s| s.to_string()),
            analyzed: analyzed_ago(site),
        }
    }
}

/// Status badge. Never-analyzed sites read "pending" rather than "error".
pub fn status_label(site: &Site, color: bool) -> String {
    if !site.is_analyzed() {
        return "pending".into();
    }
    output::paint_status(site.status, &site.status.to_string(), color)
}

/// Issues that still need attention (placeholders excluded).
pub fn issue_count(site: &Site) -> usize {
    site.issues.iter().filter(|i| !i.is_placeholder()).count()
}

/// "3m 12s ago", or "never".
pub fn analyzed_ago(site: &Site) -> String {
    let Some(at) = site.last_analysis else {
        return "never".into();
    };
    let elapsed = (Utc::now() - at).to_std().unwrap_or_default();
    if elapsed < Duration::from_secs(1) {
        return "just now".into();
    }
    let secs = Duration::from_secs(elapsed.as_secs());
    format!("{} ago", humantime::format_duration(secs))
}

/// Multi-line detail view for a single site.
pub fn site_detail(site: &Site, color: bool) -> String {
    let mut lines = vec![
        format!("ID:            {}", site.id),
        format!("URL:           {}", site.url),
        format!("Status:        {}", status_label(site, color)),
        format!("Keywords:      {}", site.keywords.join(", ")),
    ];
    if site.is_analyzed() {
        lines.push(format!(
            "SEO:           {}",
            output::paint_score(site.scores.seo, color)
        ));
        lines.push(format!(
            "Performance:   {}",
            output::paint_score(site.scores.performance, color)
        ));
        lines.push(format!(
            "Accessibility: {}",
            output::paint_score(site.scores.accessibility, color)
        ));
    }
    lines.push(format!("Analyzed:      {}", analyzed_ago(site)));
    lines.push("Issues:".into());
    for issue in &site.issues {
        let text = issue.to_string();
        lines.push(format!(
            "  - {}",
            output::paint_severity(issue.severity(), &text, color)
        ));
    }
    lines.join("\n")
}

// ── Issue table ─────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct IssueRow {
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Issue")]
    issue: String,
}

/// One row per issue across `sites`, placeholders excluded.
pub fn issue_rows<'a>(sites: impl IntoIterator<Item = &'a Site>, color: bool) -> Vec<IssueRow> {
    let mut rows = Vec::new();
    for site in sites {
        let host = site.host().unwrap_or_else(|| site.url.clone());
        for issue in site.issues.iter().filter(|i| !i.is_placeholder()) {
            let severity = issue.severity();
            let label = format!("{severity:?}").to_lowercase();
            rows.push(IssueRow {
                site: host.clone(),
                severity: output::paint_severity(severity, &label, color),
                issue: issue.to_string(),
            });
        }
    }
    rows
}

// ── Prompts ─────────────────────────────────────────────────────────

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

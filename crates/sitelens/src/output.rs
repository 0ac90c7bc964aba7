//! Rendering for `--output`.
//!
//! Tables go through `tabled` row types, JSON and YAML serialize the
//! domain values themselves, plain prints one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use sitelens_core::{Severity, SiteStatus};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Line shown instead of an empty table.
pub const EMPTY_PLACEHOLDER: &str = "No sites yet. Add one to get started.";

// ── Color helpers ────────────────────────────────────────────────────

/// `auto` colors only a terminal, and never when `NO_COLOR` is set.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Paint a status badge: green online, yellow warning, red error.
pub fn paint_status(status: SiteStatus, label: &str, color: bool) -> String {
    if !color {
        return label.to_owned();
    }
    match status {
        SiteStatus::Online => label.green().to_string(),
        SiteStatus::Warning => label.yellow().to_string(),
        SiteStatus::Error => label.red().to_string(),
    }
}

/// Paint a score by band: 80+ green, 60+ yellow, below red.
pub fn paint_score(score: u8, color: bool) -> String {
    let text = score.to_string();
    if !color {
        return text;
    }
    match score {
        80.. => text.green().to_string(),
        60..=79 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

pub fn paint_severity(severity: Severity, text: &str, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match severity {
        Severity::Critical => text.red().bold().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Info => text.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list. `to_row` feeds the table, `id_fn` the plain output; an
/// empty table collapses to [`EMPTY_PLACEHOLDER`].
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table if data.is_empty() => Ok(EMPTY_PLACEHOLDER.into()),
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render one item; the table format shows `detail_fn`'s text view.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Renderers ────────────────────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        name: String,
    }

    fn rows() -> Vec<Row> {
        vec![Row { name: "a".into() }, Row { name: "b".into() }]
    }

    #[test]
    fn empty_table_renders_placeholder() {
        let out = render_list(
            OutputFormat::Table,
            &Vec::<Row>::new(),
            |r| Row {
                name: r.name.clone(),
            },
            |r| r.name.clone(),
        )
        .unwrap();
        assert_eq!(out, EMPTY_PLACEHOLDER);
    }

    #[test]
    fn empty_json_is_an_empty_array() {
        let out = render_list(
            OutputFormat::JsonCompact,
            &Vec::<Row>::new(),
            |r| Row {
                name: r.name.clone(),
            },
            |r| r.name.clone(),
        )
        .unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(
            OutputFormat::Plain,
            &rows(),
            |r| Row {
                name: r.name.clone(),
            },
            |r| r.name.clone(),
        )
        .unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn colors_are_skipped_when_disabled() {
        assert_eq!(paint_score(91, false), "91");
        assert_eq!(paint_status(SiteStatus::Error, "error", false), "error");
        assert_ne!(paint_score(42, true), "42");
    }
}

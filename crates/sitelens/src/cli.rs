//! Clap derive structures for the `sitelens` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sitelens -- heuristic website scoring from the command line
#[derive(Debug, Parser)]
#[command(
    name = "sitelens",
    version,
    about = "Score and optimize websites for SEO, performance, and accessibility",
    long_about = "Heuristic website scoring from the command line.\n\n\
        Fetches each page, extracts on-page signals (title, meta description,\n\
        headings, alt text, links, scripts, lang), scores them, and simulates\n\
        optimization passes. Unreachable pages get a limited fallback estimate.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOpts {
    /// Output format [default: table, or `defaults.output` from config]
    #[arg(long, short = 'o', env = "SITELENS_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto, or `defaults.color` from config]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates when fetching pages
    #[arg(long, short = 'k', env = "SITELENS_INSECURE", global = true)]
    pub insecure: bool,

    /// Fetch timeout in seconds (overrides config)
    #[arg(long, env = "SITELENS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Fetch pages through the envelope proxy
    #[arg(long, global = true)]
    pub proxy: bool,

    /// Seed the random source for reproducible estimates
    #[arg(long, env = "SITELENS_SEED", global = true)]
    pub seed: Option<u64>,

    /// Skip simulated delays (optimization time, bulk stagger)
    #[arg(long, global = true)]
    pub fast: bool,
}

impl GlobalOpts {
    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    /// Selected color mode.
    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze sites and show their scores
    #[command(alias = "a")]
    Analyze(AnalyzeArgs),

    /// Analyze, then run simulated optimization passes
    #[command(alias = "opt")]
    Optimize(OptimizeArgs),

    /// Portfolio-wide recommendations from average scores
    #[command(alias = "rec")]
    Recommend(SiteTargets),

    /// Interactive session over a live site list
    #[command(alias = "sh")]
    Shell(SiteTargets),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Target Arguments ──────────────────────────────────────────

/// Sites to work on. Falls back to the configured `[[sites]]` list.
#[derive(Debug, Args)]
pub struct SiteTargets {
    /// Site URLs (`example.com` implies https://)
    pub urls: Vec<String>,

    /// Comma-separated keywords for the sites given on the command line
    #[arg(long, short = 'K')]
    pub keywords: Option<String>,
}

// ── Analyze ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub targets: SiteTargets,

    /// Quick estimate for every site without fetching pages
    #[arg(long)]
    pub quick: bool,

    /// List every issue found, one row per issue
    #[arg(long, short = 'i')]
    pub issues: bool,
}

// ── Optimize ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub targets: SiteTargets,

    /// Optimization passes per site
    #[arg(
        long,
        short = 'r',
        default_value = "1",
        value_parser = clap::value_parser!(u32).range(1..=20)
    )]
    pub rounds: u32,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

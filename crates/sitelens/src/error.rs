//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sitelens_config::ConfigError;
use sitelens_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid URL '{input}': {reason}")]
    #[diagnostic(
        code(sitelens::invalid_url),
        help("Pass a host like example.com or a full http(s) URL.")
    )]
    InvalidUrl { input: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sitelens::validation))]
    Validation { field: String, reason: String },

    #[error("No sites to work on")]
    #[diagnostic(
        code(sitelens::no_sites),
        help(
            "Pass one or more URLs, e.g. sitelens analyze example.com\n\
             Or declare [[sites]] entries in {path}"
        )
    )]
    NoSites { path: String },

    // ── Registry ─────────────────────────────────────────────────────
    #[error("Site '{identifier}' not found")]
    #[diagnostic(
        code(sitelens::not_found),
        help("Type `list` in the shell to see registered sites.")
    )]
    NotFound { identifier: String },

    #[error("Site '{url}' is already registered")]
    #[diagnostic(code(sitelens::conflict))]
    Duplicate { url: String },

    #[error("Site {id} is busy with another operation")]
    #[diagnostic(
        code(sitelens::busy),
        help("Wait for the running analysis or optimization to finish.")
    )]
    Busy { id: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(sitelens::config),
        help("Check {path}, or run: sitelens config init")
    )]
    Config { message: String, path: String },

    // ── Engine ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(sitelens::engine))]
    Engine { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(sitelens::prompt),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    Prompt(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(sitelens::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidUrl { .. } | Self::Validation { .. } | Self::NoSites { .. } => {
                exit_code::USAGE
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Duplicate { .. } | Self::Busy { .. } => exit_code::CONFLICT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidUrl { input, reason } => CliError::InvalidUrl { input, reason },
            CoreError::DuplicateSite { url } => CliError::Duplicate { url },
            CoreError::SiteNotFound { identifier } => CliError::NotFound { identifier },
            CoreError::SiteBusy { id } => CliError::Busy { id: id.to_string() },
            CoreError::EmptyRegistry => CliError::NoSites {
                path: sitelens_config::config_path().display().to_string(),
            },
            CoreError::Config { message } => CliError::Config {
                message,
                path: sitelens_config::config_path().display().to_string(),
            },
            CoreError::Internal(message) => CliError::Engine { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = sitelens_config::config_path().display().to_string();
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
                path,
            },
        }
    }
}

// ── Transport → CliError mapping ─────────────────────────────────────

impl From<sitelens_api::Error> for CliError {
    fn from(err: sitelens_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

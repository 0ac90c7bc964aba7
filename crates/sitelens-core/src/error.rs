// ── Core error types ──
//
// User-facing errors from sitelens-core. Fetch failures never surface
// here: an unreachable page degrades to a fallback analysis instead.

use thiserror::Error;

use crate::model::SiteId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    // ── Registry errors ──────────────────────────────────────────────
    #[error("Site already registered: {url}")]
    DuplicateSite { url: String },

    #[error("Site not found: {identifier}")]
    SiteNotFound { identifier: String },

    #[error("Site {id} is already being analyzed or optimized")]
    SiteBusy { id: SiteId },

    #[error("No sites registered")]
    EmptyRegistry,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(id: SiteId) -> Self {
        Self::SiteNotFound {
            identifier: id.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sitelens_api::Error> for CoreError {
    fn from(err: sitelens_api::Error) -> Self {
        match err {
            sitelens_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            sitelens_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            other => CoreError::Internal(other.to_string()),
        }
    }
}

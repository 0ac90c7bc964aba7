use thiserror::Error;

/// Top-level error type for the `sitelens-api` crate.
///
/// Covers every way a page fetch can fail: transport, HTTP status,
/// proxy envelope, and empty responses. `sitelens-core` never surfaces
/// these to users directly -- an unreachable page degrades into the
/// fallback analysis instead.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Response ────────────────────────────────────────────────────
    /// The site answered with a non-success status code.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response carried no markup. Never reported as success.
    #[error("Empty response body from {url}")]
    EmptyBody { url: String },

    // ── Proxy ───────────────────────────────────────────────────────
    /// The proxy answered but could not deliver the page contents
    /// (cross-origin block, upstream unreachable).
    #[error("Proxy could not retrieve page: {message}")]
    Proxy { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the page simply could not be obtained.
    ///
    /// Everything except a malformed URL or a broken client setup
    /// counts: these are the failures the fallback analysis exists for.
    pub fn is_unreachable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_) | Self::Tls(_))
    }

    /// Returns `true` if this is a transport timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// HTTP status code, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn setup_failures_are_not_unreachable() {
        let tls = Error::Tls("no root store".into());
        assert!(!tls.is_unreachable());
        assert!(!tls.is_timeout());
        assert_eq!(tls.status(), None);

        let bad_url = Error::from(url::Url::parse("http://").unwrap_err());
        assert!(!bad_url.is_unreachable());
    }

    #[test]
    fn remote_failures_are_unreachable() {
        let status = Error::Status {
            status: 503,
            url: "https://a.test/".into(),
        };
        assert!(status.is_unreachable());
        assert_eq!(status.status(), Some(503));

        let proxy = Error::Proxy {
            message: "upstream refused".into(),
        };
        assert!(proxy.is_unreachable());
        assert!(!proxy.is_timeout());
    }
}

//! CLI configuration: thin wrapper around `sitelens_config` shared types.
//!
//! Re-exports the shared types and layers `GlobalOpts` flag overrides
//! (--proxy, --timeout, --seed, --fast, --insecure) on top.

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use sitelens_api::{HttpFetcher, PageFetcher, ProxyFetcher, TlsMode, TransportConfig};
use sitelens_core::EngineConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use sitelens_config::{Config, FetchMode, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill output and color from `[defaults]` where no flag or env var did.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        let format =
            OutputFormat::from_str(&cfg.defaults.output, true).map_err(|reason| {
                CliError::Validation {
                    field: "defaults.output".into(),
                    reason,
                }
            })?;
        global.output = Some(format);
    }
    if global.color.is_none() {
        let mode = ColorMode::from_str(&cfg.defaults.color, true).map_err(|reason| {
            CliError::Validation {
                field: "defaults.color".into(),
                reason,
            }
        })?;
        global.color = Some(mode);
    }
    Ok(())
}

/// Engine settings with flag overrides applied.
pub fn resolve_engine(cfg: &Config, global: &GlobalOpts) -> EngineConfig {
    let mut engine = cfg.to_engine_config();
    if global.seed.is_some() {
        engine.seed = global.seed;
    }
    if global.fast {
        engine = engine.without_delays();
    }
    engine
}

/// Transport settings with flag overrides applied.
pub fn resolve_transport(cfg: &Config, global: &GlobalOpts) -> TransportConfig {
    let timeout = global
        .timeout
        .map_or_else(|| cfg.timeout(), Duration::from_secs);
    let mut transport = TransportConfig::default().with_timeout(timeout);
    if let Some(ref agent) = cfg.fetch.user_agent {
        transport.user_agent.clone_from(agent);
    }
    if global.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }
    transport
}

/// Pick the direct or proxied fetcher. `--proxy` wins over `[fetch] mode`.
pub fn build_fetcher(cfg: &Config, global: &GlobalOpts) -> Result<Arc<dyn PageFetcher>, CliError> {
    let transport = resolve_transport(cfg, global);

    if global.proxy || cfg.fetch.mode == FetchMode::Proxy {
        let proxy_url: url::Url =
            cfg.fetch
                .proxy_url
                .parse()
                .map_err(|e: url::ParseError| CliError::Validation {
                    field: "fetch.proxy_url".into(),
                    reason: e.to_string(),
                })?;
        tracing::debug!(%proxy_url, "fetching through proxy");
        return Ok(Arc::new(ProxyFetcher::new(proxy_url, &transport)?));
    }

    Ok(Arc::new(HttpFetcher::new(&transport)?))
}

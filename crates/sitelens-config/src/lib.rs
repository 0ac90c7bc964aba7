//! Shared configuration for the sitelens CLI.
//!
//! TOML file + environment loading, the configured seed-site list, and
//! translation to `sitelens_core::EngineConfig`. The CLI layers its
//! `GlobalOpts` overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitelens_core::{DEFAULT_KEYWORD, EngineConfig, SiteSeed};

/// Public envelope proxy used when `[fetch] mode = "proxy"`.
pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/get";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global output defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// How pages are retrieved.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Engine timing and randomness.
    #[serde(default)]
    pub engine: EngineSection,

    /// Sites registered at startup.
    #[serde(default)]
    pub sites: Vec<SiteSeed>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Fetch timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Direct GET against the site, or through an envelope proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Direct,
    Proxy,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FetchSection {
    #[serde(default)]
    pub mode: FetchMode,

    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    /// Override the User-Agent header.
    pub user_agent: Option<String>,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            mode: FetchMode::default(),
            proxy_url: default_proxy_url(),
            user_agent: None,
        }
    }
}

fn default_proxy_url() -> String {
    DEFAULT_PROXY_URL.into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EngineSection {
    #[serde(default = "default_optimize_delay_ms")]
    pub optimize_delay_ms: u64,

    #[serde(default = "default_quick_stagger_ms")]
    pub quick_stagger_ms: u64,

    /// Fixed random seed for reproducible runs.
    pub seed: Option<u64>,

    #[serde(default = "default_keyword")]
    pub default_keyword: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            optimize_delay_ms: default_optimize_delay_ms(),
            quick_stagger_ms: default_quick_stagger_ms(),
            seed: None,
            default_keyword: default_keyword(),
        }
    }
}

fn default_optimize_delay_ms() -> u64 {
    2000
}
fn default_quick_stagger_ms() -> u64 {
    800
}
fn default_keyword() -> String {
    DEFAULT_KEYWORD.into()
}

impl Config {
    /// Check values serde cannot: URL syntax and non-empty strings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.mode == FetchMode::Proxy {
            url::Url::parse(&self.fetch.proxy_url).map_err(|e| ConfigError::Validation {
                field: "fetch.proxy_url".into(),
                reason: e.to_string(),
            })?;
        }
        if self.engine.default_keyword.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "engine.default_keyword".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Build the core engine configuration. No CLI flag overrides.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            optimize_delay: Duration::from_millis(self.engine.optimize_delay_ms),
            quick_stagger: Duration::from_millis(self.engine.quick_stagger_ms),
            seed: self.engine.seed,
            default_keyword: self.engine.default_keyword.trim().to_owned(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "sitelens", "sitelens").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sitelens");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, still honoring `SITELENS_*` env vars.
///
/// A missing file is not an error: defaults and environment apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SITELENS_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.to_engine_config(), EngineConfig::default());
        assert_eq!(cfg.fetch.mode, FetchMode::Direct);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.sites.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[defaults]
output = "json"

[fetch]
mode = "proxy"

[engine]
optimize_delay_ms = 10
seed = 42

[[sites]]
url = "example.com"
keywords = ["rust", "seo"]
issues = ["title too short"]

[[sites]]
url = "https://blog.example.com"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.fetch.mode, FetchMode::Proxy);
        assert_eq!(cfg.fetch.proxy_url, DEFAULT_PROXY_URL);

        let engine = cfg.to_engine_config();
        assert_eq!(engine.optimize_delay, Duration::from_millis(10));
        assert_eq!(engine.quick_stagger, Duration::from_millis(800));
        assert_eq!(engine.seed, Some(42));

        assert_eq!(cfg.sites.len(), 2);
        assert_eq!(cfg.sites[0].keywords, vec!["rust", "seo"]);
        assert_eq!(cfg.sites[0].issues, vec!["title too short"]);
        assert!(cfg.sites[1].keywords.is_empty());
    }

    #[test]
    fn bad_proxy_url_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch]\nmode = \"proxy\"\nproxy_url = \"not a url\"\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "fetch.proxy_url"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.engine.seed = Some(7);
        cfg.sites.push(SiteSeed {
            url: "https://a.test/".into(),
            keywords: vec!["x".into()],
            issues: vec![],
        });
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.engine.seed, Some(7));
        assert_eq!(loaded.sites, cfg.sites);
    }
}

//! Config subcommand handlers.

use dialoguer::{Input, Select};

use sitelens_config::{DEFAULT_PROXY_URL, Defaults, EngineSection, FetchSection};
use sitelens_core::{DEFAULT_KEYWORD, SiteSeed, normalize_url};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, FetchMode};
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => init(global),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(
                global.format(),
                &cfg,
                |c| format!("{c:#?}"),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("sitelens: configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    if config_path.exists()
        && !util::confirm("A config file already exists. Overwrite it?", global.yes)?
    {
        eprintln!("Keeping the existing configuration.");
        return Ok(());
    }

    // 1. Fetch mode
    let modes = &[
        "Direct (GET each page)",
        "Proxy (JSON envelope proxy, for sites that block direct fetches)",
    ];
    let mode = if Select::new()
        .with_prompt("How should pages be fetched?")
        .items(modes)
        .default(0)
        .interact()
        .map_err(prompt_err)?
        == 0
    {
        FetchMode::Direct
    } else {
        FetchMode::Proxy
    };

    let proxy_url = if mode == FetchMode::Proxy {
        let raw: String = Input::new()
            .with_prompt("Proxy URL")
            .default(DEFAULT_PROXY_URL.into())
            .interact_text()
            .map_err(prompt_err)?;
        url::Url::parse(&raw).map_err(|e| CliError::Validation {
            field: "fetch.proxy_url".into(),
            reason: e.to_string(),
        })?;
        raw
    } else {
        DEFAULT_PROXY_URL.into()
    };

    // 2. Timeout
    let timeout: u64 = Input::new()
        .with_prompt("Fetch timeout (seconds)")
        .default(Defaults::default().timeout)
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Default keyword
    let default_keyword: String = Input::new()
        .with_prompt("Keyword for sites added without any")
        .default(DEFAULT_KEYWORD.into())
        .interact_text()
        .map_err(prompt_err)?;

    // 4. Starting sites
    let raw_sites: String = Input::new()
        .with_prompt("Sites to track (comma-separated, optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let sites = parse_site_list(&raw_sites)?;

    let cfg = Config {
        defaults: Defaults {
            timeout,
            ..Defaults::default()
        },
        fetch: FetchSection {
            mode,
            proxy_url,
            user_agent: None,
        },
        engine: EngineSection {
            default_keyword,
            ..EngineSection::default()
        },
        sites,
    };
    cfg.validate()?;

    let path = config::save_config(&cfg)?;
    eprintln!("\nConfiguration written to {}", path.display());
    eprintln!("  Sites: {}", cfg.sites.len());
    eprintln!("\n  Try it: sitelens analyze");
    Ok(())
}

/// Comma-separated URLs from the wizard, normalized.
fn parse_site_list(raw: &str) -> Result<Vec<SiteSeed>, CliError> {
    let mut seeds: Vec<SiteSeed> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let url = normalize_url(part)?;
        if seeds.iter().any(|s| s.url == url) {
            continue;
        }
        seeds.push(SiteSeed {
            url,
            ..SiteSeed::default()
        });
    }
    Ok(seeds)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn site_list_is_normalized_and_deduplicated() {
        let seeds = parse_site_list(" example.com, ,https://example.com/ , blog.test").unwrap();
        let urls: Vec<&str> = seeds.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["https://example.com/", "https://blog.test/"]);
        assert!(seeds[0].keywords.is_empty());
    }

    #[test]
    fn site_list_rejects_bad_urls() {
        let err = parse_site_list("ftp://files.test").unwrap_err();
        assert!(matches!(err, CliError::InvalidUrl { .. }));
    }

    #[test]
    fn empty_site_list_is_fine() {
        assert!(parse_site_list("  ").unwrap().is_empty());
    }
}

//! `sitelens shell`: interactive session over a live site list.
//!
//! Analyses and optimization passes run in the background so the prompt
//! stays responsive; their outcomes are printed as they finish. `watch`
//! follows the registry stream and re-renders the table on every change.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::{JoinError, JoinSet};

use sitelens_core::{
    Command as CoreCommand, CommandResult, Controller, EntityStream, Site, SiteSeed,
    parse_keywords,
};

use crate::cli::{GlobalOpts, SiteTargets};
use crate::error::CliError;
use crate::output;

use super::recommend;
use super::util::{self, SiteRow};

const HELP: &str = "\
Commands:
  add <url> [keywords]   register a site (keywords comma-separated)
  list                   show every site
  show <site>            site details and issues
  analyze <site>         fetch and score a site in the background
  optimize <site>        run one optimization pass in the background
  quick                  quick-analyze every site in the background
  watch                  live table until background work finishes
  recommend              portfolio recommendations
  remove <site>          remove a site (asks first)
  help                   this text
  quit                   leave the shell

<site> is an id (3, #3) or a URL.";

// ── Input parsing ───────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Add {
        url: String,
        keywords: Option<String>,
    },
    List,
    Show(String),
    Analyze(String),
    Optimize(String),
    Quick,
    Watch,
    Recommend,
    Remove(String),
    Help,
    Quit,
    Nothing,
}

fn parse(line: &str) -> Result<Action, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Action::Nothing);
    };
    let arg = words.next().map(str::to_owned);
    let rest: Vec<&str> = words.collect();
    let need = |usage: &str| arg.clone().ok_or_else(|| format!("usage: {usage}"));

    match verb.to_lowercase().as_str() {
        "add" => Ok(Action::Add {
            url: need("add <url> [keywords]")?,
            keywords: (!rest.is_empty()).then(|| rest.join(" ")),
        }),
        "list" | "ls" => Ok(Action::List),
        "show" => need("show <site>").map(Action::Show),
        "analyze" => need("analyze <site>").map(Action::Analyze),
        "optimize" | "opt" => need("optimize <site>").map(Action::Optimize),
        "quick" => Ok(Action::Quick),
        "watch" => Ok(Action::Watch),
        "recommend" | "rec" => Ok(Action::Recommend),
        "remove" | "rm" => need("remove <site>").map(Action::Remove),
        "help" | "?" => Ok(Action::Help),
        "quit" | "exit" | "q" => Ok(Action::Quit),
        other => Err(format!("unknown command '{other}', type `help`")),
    }
}

// ── Session ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    targets: &SiteTargets,
    seeds: Vec<SiteSeed>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::register_targets(controller, targets, seeds)?;
    let mut shell = Shell {
        controller,
        global,
        color: output::should_color(global.color_mode()),
        sites: controller.sites(),
        tasks: JoinSet::new(),
        lines: BufReader::new(tokio::io::stdin()).lines(),
    };
    shell.run().await
}

struct Shell<'a> {
    controller: &'a Controller,
    global: &'a GlobalOpts,
    color: bool,
    sites: EntityStream<Site>,
    /// Background operations; each yields the line to print when done.
    tasks: JoinSet<String>,
    lines: Lines<BufReader<Stdin>>,
}

impl Shell<'_> {
    async fn run(&mut self) -> Result<(), CliError> {
        self.say("Type `help` for commands.");
        self.render_sites();

        loop {
            self.prompt();
            let line = tokio::select! {
                line = self.lines.next_line() => line?,
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.report(joined);
                    continue;
                }
            };
            let Some(line) = line else { break };

            match parse(&line) {
                Ok(Action::Quit) => break,
                Ok(action) => {
                    if let Err(err) = self.apply(action).await {
                        eprintln!("{:?}", miette::Report::new(err));
                    }
                }
                Err(message) => eprintln!("{message}"),
            }
        }

        while let Some(joined) = self.tasks.join_next().await {
            self.report(joined);
        }
        Ok(())
    }

    async fn apply(&mut self, action: Action) -> Result<(), CliError> {
        match action {
            Action::Add { url, keywords } => {
                let default = &self.controller.config().default_keyword;
                let keywords = keywords
                    .map(|k| parse_keywords(&k, default))
                    .unwrap_or_default();
                let result = self
                    .controller
                    .execute(CoreCommand::AddSite { url, keywords })
                    .await?;
                if let CommandResult::Added(site) = result {
                    self.say(&format!("added #{} {}", site.id, site.url));
                }
            }
            Action::List => self.render_sites(),
            Action::Show(identifier) => {
                let site = self.controller.resolve_site(&identifier)?;
                let color = self.color;
                let out = output::render_single(
                    self.global.format(),
                    &site,
                    |s| util::site_detail(s, color),
                    |s| s.url.clone(),
                )?;
                self.say(&out);
            }
            Action::Analyze(identifier) => {
                let site = self.controller.resolve_site(&identifier)?;
                self.spawn_analyze(&site);
            }
            Action::Optimize(identifier) => {
                let site = self.controller.resolve_site(&identifier)?;
                self.spawn_optimize(&site);
            }
            Action::Quick => {
                let controller = self.controller.clone();
                self.say("quick analysis started");
                self.tasks.spawn(async move {
                    match controller.execute(CoreCommand::QuickAnalyzeAll).await {
                        Ok(CommandResult::QuickAnalyzed(n)) => format!("quick analysis: {n} sites"),
                        Ok(other) => format!("quick analysis: unexpected result {other:?}"),
                        Err(err) => format!("quick analysis failed: {err}"),
                    }
                });
            }
            Action::Watch => self.watch().await,
            Action::Recommend => {
                let recs = self.controller.recommendations()?;
                self.say(&recommend::render(&recs, self.global)?);
            }
            Action::Remove(identifier) => self.remove(&identifier).await?,
            Action::Help => self.say(HELP),
            Action::Quit | Action::Nothing => {}
        }
        Ok(())
    }

    // ── Background work ─────────────────────────────────────────────

    fn spawn_analyze(&mut self, site: &Site) {
        let controller = self.controller.clone();
        let (id, url) = (site.id, site.url.clone());
        self.say(&format!("analyzing {url}"));
        self.tasks.spawn(async move {
            match controller.execute(CoreCommand::AnalyzeSite { id }).await {
                Ok(CommandResult::Analyzed { site, source, .. }) => format!(
                    "analyzed {url} ({source}): seo {} perf {} a11y {}, {}",
                    site.scores.seo,
                    site.scores.performance,
                    site.scores.accessibility,
                    site.status
                ),
                Ok(other) => format!("analysis of {url}: unexpected result {other:?}"),
                Err(err) => format!("analysis of {url} failed: {err}"),
            }
        });
    }

    fn spawn_optimize(&mut self, site: &Site) {
        let controller = self.controller.clone();
        let (id, url) = (site.id, site.url.clone());
        self.say(&format!("optimizing {url}"));
        self.tasks.spawn(async move {
            match controller.execute(CoreCommand::OptimizeSite { id }).await {
                Ok(CommandResult::Optimized { site, applied }) => {
                    let applied: Vec<String> = applied.iter().map(ToString::to_string).collect();
                    format!(
                        "optimized {url}: {}; seo {} perf {} a11y {}",
                        applied.join(", "),
                        site.scores.seo,
                        site.scores.performance,
                        site.scores.accessibility
                    )
                }
                Ok(other) => format!("optimization of {url}: unexpected result {other:?}"),
                Err(err) => format!("optimization of {url} failed: {err}"),
            }
        });
    }

    fn report(&self, joined: Result<String, JoinError>) {
        match joined {
            Ok(line) => self.say(&line),
            Err(err) => eprintln!("background task failed: {err}"),
        }
    }

    /// Re-render on every registry change until background work is done.
    async fn watch(&mut self) {
        self.render_sites();
        while !self.tasks.is_empty() {
            tokio::select! {
                snapshot = self.sites.changed() => match snapshot {
                    Some(snapshot) => self.render(&snapshot),
                    None => break,
                },
                Some(joined) = self.tasks.join_next() => self.report(joined),
            }
        }
    }

    // ── Removal ─────────────────────────────────────────────────────

    async fn remove(&mut self, identifier: &str) -> Result<(), CliError> {
        let site = self.controller.resolve_site(identifier)?;
        let confirmed = if self.global.yes {
            true
        } else {
            self.ask(&format!("Remove {}? [y/N] ", site.url)).await?
        };

        match self
            .controller
            .remove_site(site.id, &|_: &Site| confirmed)?
        {
            CommandResult::Removed(site) => self.say(&format!("removed {}", site.url)),
            _ => self.say(&format!("kept {}", site.url)),
        }
        Ok(())
    }

    async fn ask(&mut self, question: &str) -> Result<bool, CliError> {
        print!("{question}");
        let _ = std::io::stdout().flush();
        let answer = self.lines.next_line().await?.unwrap_or_default();
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render_sites(&self) {
        let snapshot = self.sites.latest();
        self.render(&snapshot);
    }

    fn render(&self, sites: &[std::sync::Arc<Site>]) {
        let color = self.color;
        match output::render_list(
            self.global.format(),
            sites,
            |s| SiteRow::new(s, None, color),
            |s| s.url.clone(),
        ) {
            Ok(out) => self.say(&out),
            Err(err) => eprintln!("{:?}", miette::Report::new(err)),
        }
    }

    fn prompt(&self) {
        if self.global.quiet {
            return;
        }
        print!("sitelens> ");
        let _ = std::io::stdout().flush();
    }

    fn say(&self, line: &str) {
        output::print_output(line, self.global.quiet);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_keywords() {
        assert_eq!(
            parse("add example.com seo, rust").unwrap(),
            Action::Add {
                url: "example.com".into(),
                keywords: Some("seo, rust".into()),
            }
        );
        assert_eq!(
            parse("  add shop.test ").unwrap(),
            Action::Add {
                url: "shop.test".into(),
                keywords: None,
            }
        );
    }

    #[test]
    fn parses_site_commands_and_aliases() {
        assert_eq!(parse("analyze 3").unwrap(), Action::Analyze("3".into()));
        assert_eq!(parse("OPT #2").unwrap(), Action::Optimize("#2".into()));
        assert_eq!(parse("rm a.test").unwrap(), Action::Remove("a.test".into()));
        assert_eq!(parse("ls").unwrap(), Action::List);
        assert_eq!(parse("exit").unwrap(), Action::Quit);
        assert_eq!(parse("   ").unwrap(), Action::Nothing);
    }

    #[test]
    fn missing_argument_reports_usage() {
        assert_eq!(parse("show").unwrap_err(), "usage: show <site>");
        assert!(parse("frobnicate").unwrap_err().contains("unknown command"));
    }
}

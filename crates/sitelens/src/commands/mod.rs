//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod analyze;
pub mod config_cmd;
pub mod optimize;
pub mod recommend;
pub mod shell;
pub mod util;

use sitelens_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch an engine-bound command to the appropriate handler.
///
/// `cfg` is consumed for its `[[sites]]` list, which seeds the registry
/// when no URLs are given on the command line.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    cfg: Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let seeds = cfg.sites;
    match cmd {
        Command::Analyze(args) => analyze::handle(controller, &args, seeds, global).await,
        Command::Optimize(args) => optimize::handle(controller, &args, seeds, global).await,
        Command::Recommend(args) => recommend::handle(controller, &args, seeds, global).await,
        Command::Shell(args) => shell::handle(controller, &args, seeds, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

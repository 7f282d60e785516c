pub mod inputs;
pub mod policies_cmd;
pub mod resolve_cmd;
pub mod rules_cmd;

use std::fs;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;

use crate::policies_cmd::PoliciesCli;
use crate::resolve_cmd::ExplainCli;
use crate::resolve_cmd::ResolveCli;
use crate::rules_cmd::RulesCli;

/// Resolve built-in role permissions from administrator policy settings.
#[derive(Debug, Parser)]
#[command(name = "rolegate", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the role catalog produced by the configured policy values.
    Resolve(ResolveCli),
    /// Show which rules changed or were skipped during resolution.
    Explain(ExplainCli),
    /// Inspect and check rule table documents.
    Rules(RulesCli),
    /// List the policies the configuration model understands.
    Policies(PoliciesCli),
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve(cmd) => resolve_cmd::run_resolve(cmd),
        Command::Explain(cmd) => resolve_cmd::run_explain(cmd),
        Command::Rules(cmd) => rules_cmd::run(cmd),
        Command::Policies(cmd) => policies_cmd::run(cmd),
    }
}

pub(crate) fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}

/// Writes `contents` to `out`, or stdout when no path is given.
pub(crate) fn emit(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(path) => fs::write(path, format!("{contents}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

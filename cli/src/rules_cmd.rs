use std::borrow::Cow;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap::Subcommand;
use rolegate_core::Config;
use rolegate_core::RuleTable;
use rolegate_core::policy::normalize_policy_name;
use rolegate_core::rule_table;
use rolegate_core::verify_table;

use crate::inputs;
use crate::render_json;

/// Rule table tooling: validation, lookup and end-to-end verification.
#[derive(Debug, Parser)]
pub struct RulesCli {
    #[command(subcommand)]
    command: RulesCommand,
}

#[derive(Debug, Subcommand)]
enum RulesCommand {
    /// Report duplicate, contradictory or order-dependent rules.
    Validate {
        /// Rule table document. The embedded table when omitted.
        #[arg(long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,
        /// Emit issues as a JSON array.
        #[arg(long = "json", default_value_t = false)]
        json: bool,
    },
    /// Print the rules registered for one policy value.
    Lookup {
        #[arg(value_name = "POLICY")]
        policy: String,
        #[arg(value_name = "VALUE")]
        value: String,
        #[arg(long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,
    },
    /// Resolve every declared policy value and check each assertion holds.
    Verify {
        #[arg(long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,
        /// Base role catalog (JSON). The built-in default roles when omitted.
        #[arg(long = "roles", value_name = "FILE")]
        roles: Option<PathBuf>,
        #[arg(long = "licensed", default_value_t = false)]
        licensed: bool,
    },
}

pub fn run(cli: RulesCli) -> Result<()> {
    match cli.command {
        RulesCommand::Validate { rules, json } => validate(rules, json),
        RulesCommand::Lookup {
            policy,
            value,
            rules,
        } => lookup(&policy, &value, rules),
        RulesCommand::Verify {
            rules,
            roles,
            licensed,
        } => verify(rules, roles, licensed),
    }
}

fn validate(rules: Option<PathBuf>, json: bool) -> Result<()> {
    // Loaded leniently here so the issues can be listed rather than rejected.
    let table = match &rules {
        Some(path) => Cow::Owned(
            RuleTable::load_from_path(path)
                .with_context(|| format!("failed to load rule table {}", path.display()))?,
        ),
        None => Cow::Borrowed(
            rule_table::embedded().context("failed to load the embedded rule table")?,
        ),
    };
    let issues = table.validate();

    if json {
        println!("{}", render_json(&issues, true)?);
    } else if issues.is_empty() {
        println!(
            "ok: {} policies, {} rules",
            table.len(),
            table.rule_count()
        );
    } else {
        for issue in &issues {
            println!("{issue}");
        }
    }

    if !issues.is_empty() {
        bail!("rule table has {} issue(s)", issues.len());
    }
    Ok(())
}

fn lookup(policy: &str, value: &str, rules: Option<PathBuf>) -> Result<()> {
    let table = inputs::load_rules(rules.as_deref())?;
    if !table.contains_policy(policy) {
        bail!("no policy named '{}' in the rule table", normalize_policy_name(policy));
    }
    println!("{}", render_json(&table.lookup(policy, value), true)?);
    Ok(())
}

fn verify(rules: Option<PathBuf>, roles: Option<PathBuf>, licensed: bool) -> Result<()> {
    let table = inputs::load_rules(rules.as_deref())?;
    let base = inputs::load_roles(roles.as_deref())?;
    let violations = verify_table(&table, &base, &Config::default(), licensed);

    if violations.is_empty() {
        println!(
            "ok: {} rules hold (licensed: {licensed})",
            table.rule_count()
        );
        return Ok(());
    }
    for violation in &violations {
        println!("{violation}");
    }
    bail!("{} assertion(s) violated", violations.len());
}

//! Loading of the three resolver inputs from command-line arguments.

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Args;
use rolegate_core::Config;
use rolegate_core::PolicySourceMut;
use rolegate_core::RoleCatalog;
use rolegate_core::RuleTable;
use rolegate_core::default_roles;
use rolegate_core::roles::load_catalog;
use rolegate_core::rule_table;
use tracing::info;
use tracing::warn;

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Platform configuration (.toml or .json). Platform defaults when omitted.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Rule table document. The embedded table when omitted.
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Base role catalog (JSON). The built-in default roles when omitted.
    #[arg(long = "roles", value_name = "FILE")]
    pub roles: Option<PathBuf>,

    /// Override a policy value, e.g. `--set InviteGuests=TEAM_ADMIN`.
    #[arg(long = "set", value_name = "POLICY=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,

    /// Treat the deployment as licensed.
    #[arg(long = "licensed", default_value_t = false)]
    pub licensed: bool,
}

impl InputArgs {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = load_config(self.config.as_deref())?;
        for (policy, value) in &self.overrides {
            config
                .set_policy(policy, value)
                .with_context(|| format!("cannot apply --set {policy}={value}"))?;
        }
        Ok(config)
    }

    pub fn load_rules(&self) -> Result<Cow<'static, RuleTable>> {
        load_rules(self.rules.as_deref())
    }

    pub fn load_roles(&self) -> Result<RoleCatalog> {
        load_roles(self.roles.as_deref())
    }
}

fn parse_override(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((policy, value)) if !policy.trim().is_empty() => {
            Ok((policy.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected POLICY=VALUE, got '{arg}'")),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Loads a rule table document, warning about entries whose outcome depends
/// on ordering. Without a path the embedded table is used.
pub fn load_rules(path: Option<&Path>) -> Result<Cow<'static, RuleTable>> {
    let Some(path) = path else {
        let table =
            rule_table::embedded().context("failed to load the embedded rule table")?;
        return Ok(Cow::Borrowed(table));
    };
    let table = RuleTable::load_from_path(path)
        .with_context(|| format!("failed to load rule table {}", path.display()))?;
    for issue in table.validate() {
        warn!("{}: {issue}", path.display());
    }
    info!(
        policies = table.len(),
        rules = table.rule_count(),
        "loaded rule table from {}",
        path.display()
    );
    Ok(Cow::Owned(table))
}

pub fn load_roles(path: Option<&Path>) -> Result<RoleCatalog> {
    let Some(path) = path else {
        return Ok(default_roles());
    };
    let file = File::open(path)
        .with_context(|| format!("failed to open role catalog {}", path.display()))?;
    load_catalog(file).with_context(|| format!("failed to load role catalog {}", path.display()))
}

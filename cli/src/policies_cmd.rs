use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rolegate_core::PolicyTier;
use rolegate_core::policy::known_policies;
use serde::Serialize;

use crate::inputs;
use crate::render_json;

#[derive(Debug, Args)]
pub struct PoliciesCli {
    /// Show values from this configuration instead of the platform defaults.
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long = "json", default_value_t = false)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct PolicyRow<'a> {
    name: &'static str,
    tier: PolicyTier,
    value: &'a str,
}

pub fn run(cli: PoliciesCli) -> Result<()> {
    let config = inputs::load_config(cli.config.as_deref())?;
    let rows: Vec<PolicyRow<'_>> = known_policies()
        .map(|field| PolicyRow {
            name: field.name,
            tier: field.tier,
            value: field.read(&config),
        })
        .collect();

    if cli.json {
        println!("{}", render_json(&rows, true)?);
        return Ok(());
    }
    let width = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);
    for row in &rows {
        let tier = row.tier.to_string();
        println!("{:<width$}  {tier:<7}  {}", row.name, row.value);
    }
    Ok(())
}

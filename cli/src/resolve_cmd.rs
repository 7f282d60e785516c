use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rolegate_core::Resolution;
use rolegate_core::RoleResolver;
use rolegate_core::SkipReason;

use crate::emit;
use crate::inputs::InputArgs;
use crate::render_json;

#[derive(Debug, Args)]
pub struct ResolveCli {
    #[command(flatten)]
    inputs: InputArgs,

    /// Optional output file path (defaults to stdout when omitted).
    #[arg(long = "out", value_name = "PATH")]
    out: Option<PathBuf>,

    /// Render pretty JSON instead of a single line.
    #[arg(long = "pretty", default_value_t = false)]
    pretty: bool,
}

#[derive(Debug, Args)]
pub struct ExplainCli {
    #[command(flatten)]
    inputs: InputArgs,

    /// Emit the full resolution report as JSON.
    #[arg(long = "json", default_value_t = false)]
    json: bool,
}

pub fn run_resolve(cli: ResolveCli) -> Result<()> {
    let resolution = explain(&cli.inputs)?;
    let rendered = render_json(&resolution.roles, cli.pretty)?;
    emit(cli.out.as_deref(), &rendered)
}

pub fn run_explain(cli: ExplainCli) -> Result<()> {
    let resolution = explain(&cli.inputs)?;
    if cli.json {
        println!("{}", render_json(&resolution, true)?);
    } else {
        print!("{}", describe(&resolution));
    }
    Ok(())
}

fn explain(inputs: &InputArgs) -> Result<Resolution> {
    let config = inputs.load_config()?;
    let rules = inputs.load_rules()?;
    let roles = inputs.load_roles()?;
    Ok(RoleResolver::new(&rules).explain(&roles, &config, inputs.licensed))
}

fn describe(resolution: &Resolution) -> String {
    let mut out = String::new();
    if resolution.changes.is_empty() {
        out.push_str("no permission changes\n");
    }
    for change in &resolution.changes {
        let sign = if change.granted { '+' } else { '-' };
        out.push_str(&format!(
            "{sign} {} {} ({}={})\n",
            change.role_name, change.permission, change.policy, change.value
        ));
    }
    for skipped in &resolution.skipped {
        let reason = match skipped.reason {
            SkipReason::UnknownPolicy => "unknown policy",
            SkipReason::Unlicensed => "requires a license",
            SkipReason::UnknownRole => "role not in catalog",
        };
        let line = match (&skipped.value, &skipped.role_name, &skipped.permission) {
            (Some(value), Some(role), Some(permission)) => format!(
                "skipped {role} {permission} ({}={value}): {reason}\n",
                skipped.policy
            ),
            _ => format!("skipped {}: {reason}\n", skipped.policy),
        };
        out.push_str(&line);
    }
    out
}

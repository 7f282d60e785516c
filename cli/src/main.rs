use anyhow::Result;
use clap::Parser;
use rolegate_cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    setup_tracing();
    rolegate_cli::run(Cli::parse())
}

// Logs go to stderr; stdout carries command output.
fn setup_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

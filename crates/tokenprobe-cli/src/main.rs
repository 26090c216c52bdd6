use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod modules;
#[cfg(test)]
mod tests;

use crate::cli_args::Cli;
use crate::modules::refresh::{run_probe, HttpTokenSource, LoopOutcome, ProbeOutcome};
use crate::modules::report::print_config;
use crate::modules::system::{build_config, build_http_client};

pub(crate) const DEFAULT_ISSUER: &str = "https://dex.127.0.0.1.nip.io:32000";
pub(crate) const DEFAULT_CLIENT_ID: &str = "kubelogin-test";
pub(crate) const DEFAULT_CLIENT_SECRET: &str = "kubelogin-test-secret";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_banner(&mut out)?;

    let client = build_http_client()?;
    let config = build_config(&cli)?;
    print_config(&mut out, &config)?;

    let source = HttpTokenSource::new(client, &config);
    match run_probe(&mut out, &config, &source).await? {
        ProbeOutcome::Aborted => tracing::info!("token cache unusable; no refresh attempted"),
        ProbeOutcome::Finished(LoopOutcome::Completed { cycles }) => {
            tracing::info!(cycles, "refresh loop reached its cycle limit")
        }
        ProbeOutcome::Finished(LoopOutcome::Failed { cycles, reason }) => {
            tracing::info!(cycles, error = %reason, "refresh loop halted")
        }
    }
    Ok(())
}

fn print_banner<W: io::Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Starting OAuth2 Token Refresh Test")?;
    writeln!(out, "===================================")
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

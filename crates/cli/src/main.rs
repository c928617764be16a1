//! Cloud Run fleet CLI
//!
//! Batch entry point for the fleet health monitor and the fleet metrics
//! collector. Meant to be run by an external scheduler; each invocation is
//! one run that writes a JSON report and exits.
//!
//! Exit codes: `0` success, `1` unhealthy fleet (monitor only), `2` fatal error.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::{metrics, monitor, projects};
use fleet_lib::{observability::init_tracing, FleetConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for errors that abort a run
const EXIT_FATAL: u8 = 2;

/// Cloud Run fleet health monitor and metrics collector
#[derive(Parser)]
#[command(name = "fleetctl")]
#[command(author, version, about = "Cloud Run fleet health monitor and metrics collector", long_about = None)]
pub struct Cli {
    /// Output format for the run summary
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by both batch jobs
#[derive(clap::Args, Debug, Clone)]
pub struct JobArgs {
    /// Report path (defaults to FLEET_MONITOR_OUTPUT / FLEET_METRICS_OUTPUT)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Number of projects processed at once (overrides FLEET_CONCURRENCY)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Write run metrics in Prometheus text format to this file
    #[arg(long)]
    pub metrics_textfile: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every project and fail when any is unhealthy
    Monitor(JobArgs),

    /// Collect synthetic usage, energy and revenue metrics
    Metrics(JobArgs),

    /// List configured projects and their resolved endpoints
    Projects,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_json, if cli.verbose { "debug" } else { "info" });

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = FleetConfig::load()?;

    match cli.command {
        Commands::Monitor(args) => monitor::run_monitor(config, args, cli.format).await,
        Commands::Metrics(args) => metrics::run_metrics(config, args, cli.format).await,
        Commands::Projects => {
            projects::list_projects(config, cli.format).await?;
            Ok(0)
        }
    }
}

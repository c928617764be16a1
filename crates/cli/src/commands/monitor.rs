//! Fleet health monitor command

use anyhow::{Context, Result};
use colored::Colorize;
use fleet_lib::{FleetConfig, FleetMonitor, HealthProbe, MonitorOutcome, ProjectRegistry};
use std::sync::Arc;
use tabled::Tabled;

use super::write_metrics_textfile;
use crate::output::{
    color_status, format_latency, format_status_code, print_info, print_json, print_success,
    print_table, print_warning, OutputFormat,
};
use crate::JobArgs;

/// Row for the per-project health table
#[derive(Tabled)]
struct HealthRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Health")]
    health_code: String,
    #[tabled(rename = "Root")]
    root_code: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
}

/// Probe the fleet, write the report and return the exit code
pub async fn run_monitor(config: FleetConfig, args: JobArgs, format: OutputFormat) -> Result<u8> {
    let config = Arc::new(config);
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.monitor_output.clone());

    let probe = HealthProbe::new(config.health_timeout(), config.synthetic_timeout())?;
    let mut monitor = FleetMonitor::new(ProjectRegistry::from_config(config.clone()), probe);
    if let Some(concurrency) = args.concurrency {
        monitor = monitor.with_concurrency(concurrency);
    }

    let outcome = monitor
        .run_and_persist(&path)
        .await
        .context("Failed to persist monitor results")?;

    write_metrics_textfile(monitor.metrics(), args.metrics_textfile.as_deref())?;

    match format {
        OutputFormat::Json => print_json(&outcome.report)?,
        OutputFormat::Table => print_summary(&outcome, &path.display().to_string()),
    }

    Ok(outcome.exit_code() as u8)
}

fn print_summary(outcome: &MonitorOutcome, path: &str) {
    if outcome.report.is_empty() {
        print_info("No projects configured; set CLOUD_RUN_PROJECTS to enable monitoring.");
        return;
    }

    println!("{}", "Fleet Health".bold());
    println!("{}", "=".repeat(60));

    let rows: Vec<HealthRow> = outcome
        .report
        .iter()
        .map(|(project, entry)| HealthRow {
            project: project.clone(),
            status: color_status(if entry.is_unhealthy() {
                "unhealthy"
            } else {
                "healthy"
            }),
            health_code: format_status_code(entry.health.status_code),
            root_code: format_status_code(entry.synthetic.status_code),
            latency: format_latency(entry.synthetic.latency_ms),
            endpoint: entry.base_url.clone(),
        })
        .collect();
    print_table(&rows);
    println!();

    print_success(&format!("Wrote monitor results to {}", path));
    if outcome.is_healthy() {
        print_success("All services reported healthy.");
    } else {
        print_warning(&format!(
            "Unhealthy services detected: {}",
            outcome.unhealthy.join(", ")
        ));
    }
}

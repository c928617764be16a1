//! Fleet metrics collection command

use anyhow::{Context, Result};
use colored::Colorize;
use fleet_lib::{
    BillingClient, CloudBillingClient, FleetConfig, FleetMetricsCollector, FleetMetricsReport,
    MetricsEstimator, ProjectRegistry,
};
use std::sync::Arc;
use tabled::Tabled;
use tracing::warn;

use super::write_metrics_textfile;
use crate::output::{
    format_timestamp, format_usd, print_info, print_json, print_success, print_table,
    OutputFormat,
};
use crate::JobArgs;

/// Row for the per-project metrics table
#[derive(Tabled)]
struct MetricsRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Requests")]
    requests: u64,
    #[tabled(rename = "Energy (kWh)")]
    energy: String,
    #[tabled(rename = "Carbon (kg)")]
    carbon: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

/// Collect fleet metrics and write the report
///
/// Always returns exit code 0 once the report is written; billing
/// problems are recorded per project instead.
pub async fn run_metrics(config: FleetConfig, args: JobArgs, format: OutputFormat) -> Result<u8> {
    let config = Arc::new(config);
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.metrics_output.clone());

    let estimator = MetricsEstimator::new(config.region.clone(), billing_client(&config));
    let mut collector =
        FleetMetricsCollector::new(ProjectRegistry::from_config(config.clone()), estimator);
    if let Some(concurrency) = args.concurrency {
        collector = collector.with_concurrency(concurrency);
    }

    let report = collector
        .run_and_persist(&path)
        .await
        .context("Failed to persist metrics report")?;

    write_metrics_textfile(collector.metrics(), args.metrics_textfile.as_deref())?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_summary(&report, &path.display().to_string()),
    }

    Ok(0)
}

/// Build the billing client from `GCP_SA_KEY`, if configured
///
/// Unusable credentials are logged and treated as absent.
fn billing_client(config: &FleetConfig) -> Option<Arc<dyn BillingClient>> {
    let raw = config.billing_credentials.as_deref()?;
    match CloudBillingClient::from_key_json(raw, config.billing_timeout()) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "Ignoring billing credentials");
            None
        }
    }
}

fn print_summary(report: &FleetMetricsReport, path: &str) {
    if report.projects.is_empty() {
        print_info("No projects configured for metrics collection.");
        return;
    }

    println!("{}", "Fleet Metrics".bold());
    println!("{}", "=".repeat(60));
    println!("Generated at: {}", format_timestamp(&report.generated_at).dimmed());
    println!();

    let rows: Vec<MetricsRow> = report
        .projects
        .iter()
        .map(|record| MetricsRow {
            project: record.project_id.clone(),
            region: record.usage.region.clone(),
            requests: record.usage.requests,
            energy: format!("{:.4}", record.energy.energy_kwh),
            carbon: format!("{:.6}", record.energy.carbon_kg),
            revenue: format_usd(record.revenue.estimated_revenue_usd),
            notes: record
                .revenue
                .error
                .clone()
                .or_else(|| record.revenue.note.clone())
                .unwrap_or_default(),
        })
        .collect();
    print_table(&rows);
    println!();

    println!("{}", "Totals".bold());
    println!("{}", "-".repeat(60));
    println!("Requests:               {}", report.totals.requests);
    println!(
        "Estimated revenue:      {}",
        format_usd(Some(report.totals.estimated_revenue_usd)).green()
    );
    println!("Energy:                 {:.4} kWh", report.totals.energy_kwh);
    println!("Carbon:                 {:.6} kg", report.totals.carbon_kg);
    println!();

    print_success(&format!("Wrote metrics to {}", path));
}

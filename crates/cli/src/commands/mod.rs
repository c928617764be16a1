//! CLI command implementations

pub mod metrics;
pub mod monitor;
pub mod projects;

use anyhow::{Context, Result};
use fleet_lib::FleetMetrics;
use std::path::Path;

/// Dump run metrics for the node-exporter textfile collector
pub(crate) fn write_metrics_textfile(metrics: &FleetMetrics, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        metrics
            .write_textfile(path)
            .with_context(|| format!("Failed to write metrics textfile {}", path.display()))?;
    }
    Ok(())
}

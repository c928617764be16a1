//! Fleet metrics collector
//!
//! Builds one metrics record per project, sums fleet totals and persists
//! the report. Per-project failures live inside the records, so the job
//! itself never fails on them.

use crate::error::ReportError;
use crate::estimator::MetricsEstimator;
use crate::models::{FleetMetricsReport, MetricsRecord};
use crate::observability::{FleetMetrics, StructuredLogger};
use crate::registry::ProjectRegistry;
use crate::report::write_report;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::path::Path;

/// Orchestrates metrics estimation across the fleet
pub struct FleetMetricsCollector {
    registry: ProjectRegistry,
    estimator: MetricsEstimator,
    metrics: FleetMetrics,
    logger: StructuredLogger,
    concurrency: usize,
}

impl FleetMetricsCollector {
    pub fn new(registry: ProjectRegistry, estimator: MetricsEstimator) -> Self {
        let concurrency = registry.config().concurrency.max(1);
        Self {
            registry,
            estimator,
            metrics: FleetMetrics::new(),
            logger: StructuredLogger::new("metrics"),
            concurrency,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn metrics(&self) -> &FleetMetrics {
        &self.metrics
    }

    /// Collect records for every project; totals are summed after fan-in
    pub async fn run(&self) -> FleetMetricsReport {
        let projects = self.registry.list_projects();
        if projects.is_empty() {
            self.logger.log_no_projects();
            return FleetMetricsReport::from_records(Utc::now(), Vec::new());
        }

        self.logger.log_run_started(projects.len(), self.concurrency);

        let records: Vec<MetricsRecord> = stream::iter(projects)
            .map(|project| async move {
                let record = self.estimator.collect_for_project(&project).await;
                self.metrics.record_metrics_record(&record.revenue);
                self.logger.log_revenue(&project, &record.revenue);
                record
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = FleetMetricsReport::from_records(Utc::now(), records);
        self.logger.log_run_finished(report.projects.len(), &[]);
        report
    }

    /// Collect and overwrite the report at `path`
    pub async fn run_and_persist(&self, path: &Path) -> Result<FleetMetricsReport, ReportError> {
        let report = self.run().await;
        write_report(path, &report).await?;
        self.logger.log_report_written(path);
        Ok(report)
    }
}

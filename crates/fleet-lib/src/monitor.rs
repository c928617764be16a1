//! Fleet health monitor
//!
//! Probes every registered project, writes the full report once all
//! probes have completed, and derives the job's exit code.

use crate::error::ReportError;
use crate::models::{FleetHealthReport, ProjectHealth, ProjectId};
use crate::observability::{FleetMetrics, StructuredLogger};
use crate::probe::HealthProbe;
use crate::registry::ProjectRegistry;
use crate::report::write_report;
use futures_util::stream::{self, StreamExt};
use std::path::Path;

/// Exit code when every project is healthy or none is configured
pub const EXIT_HEALTHY: i32 = 0;

/// Exit code when at least one project is unhealthy
pub const EXIT_UNHEALTHY: i32 = 1;

/// Result of one monitor run
#[derive(Debug, Clone)]
pub struct MonitorOutcome {
    pub report: FleetHealthReport,
    /// Unhealthy projects in registry order
    pub unhealthy: Vec<ProjectId>,
}

impl MonitorOutcome {
    pub fn is_healthy(&self) -> bool {
        self.unhealthy.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_healthy() {
            EXIT_HEALTHY
        } else {
            EXIT_UNHEALTHY
        }
    }
}

/// Orchestrates health probes across the fleet
pub struct FleetMonitor {
    registry: ProjectRegistry,
    probe: HealthProbe,
    metrics: FleetMetrics,
    logger: StructuredLogger,
    concurrency: usize,
}

impl FleetMonitor {
    pub fn new(registry: ProjectRegistry, probe: HealthProbe) -> Self {
        let concurrency = registry.config().concurrency.max(1);
        Self {
            registry,
            probe,
            metrics: FleetMetrics::new(),
            logger: StructuredLogger::new("monitor"),
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

    /// Probe every project without persisting anything
    pub async fn run(&self) -> MonitorOutcome {
        let projects = self.registry.list_projects();
        if projects.is_empty() {
            self.logger.log_no_projects();
            return MonitorOutcome {
                report: FleetHealthReport::new(),
                unhealthy: Vec::new(),
            };
        }

        self.logger.log_run_started(projects.len(), self.concurrency);

        // `buffered` yields in input order regardless of completion order
        let results: Vec<(ProjectId, ProjectHealth)> = stream::iter(projects)
            .map(|project| async move {
                let entry = self.probe_project(&project).await;
                (project, entry)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = FleetHealthReport::new();
        let mut unhealthy = Vec::new();
        for (project, entry) in results {
            if entry.is_unhealthy() && !unhealthy.contains(&project) {
                unhealthy.push(project.clone());
            }
            report.insert(project, entry);
        }

        self.metrics.set_unhealthy_projects(unhealthy.len());
        self.logger.log_run_finished(report.len(), &unhealthy);

        MonitorOutcome { report, unhealthy }
    }

    /// Run the monitor and overwrite the report at `path`
    pub async fn run_and_persist(&self, path: &Path) -> Result<MonitorOutcome, ReportError> {
        let outcome = self.run().await;
        write_report(path, &outcome.report).await?;
        self.logger.log_report_written(path);
        Ok(outcome)
    }

    async fn probe_project(&self, project: &str) -> ProjectHealth {
        let endpoint = self.registry.resolve_endpoint(project).await;
        self.metrics.record_endpoint(endpoint.source);
        self.logger
            .log_endpoint_resolved(project, &endpoint.url, endpoint.source);

        let health = self.probe.check_health(&endpoint.url).await;
        self.metrics.record_health(&health);
        self.logger.log_health(project, &health);

        let synthetic = self.probe.synthetic_probe(&endpoint.url).await;
        self.metrics.record_synthetic(&synthetic);
        self.logger.log_synthetic(project, &synthetic);

        ProjectHealth {
            base_url: endpoint.url,
            health,
            synthetic,
        }
    }
}

//! Observability infrastructure for fleet jobs
//!
//! Provides:
//! - Prometheus run metrics (probe outcomes, probe latency, unhealthy projects)
//! - Structured logging with tracing

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::models::{EndpointSource, HealthResult, RevenueEstimate, SyntheticProbeResult};

/// Histogram buckets for probe latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0];

/// Initialize the global tracing subscriber
///
/// Logs go to stderr so stdout stays reserved for command output.
pub fn init_tracing(json: bool, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

struct FleetMetricsInner {
    registry: Registry,
    probes_total: IntCounterVec,
    probe_latency_seconds: Histogram,
    endpoints_resolved: IntCounterVec,
    unhealthy_projects: IntGauge,
    metrics_records: IntCounter,
    billing_errors: IntCounter,
}

/// Run metrics for one job invocation
///
/// Each instance owns its registry, so jobs and tests never collide on
/// metric names.
#[derive(Clone)]
pub struct FleetMetrics {
    inner: Arc<FleetMetricsInner>,
}

impl Default for FleetMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let probes_total = IntCounterVec::new(
            Opts::new("fleet_probes_total", "Probes executed by kind and outcome"),
            &["kind", "outcome"],
        )
        .expect("Failed to create probes_total");

        let probe_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "fleet_synthetic_probe_latency_seconds",
                "Latency of synthetic probes against service roots",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
        )
        .expect("Failed to create probe_latency_seconds");

        let endpoints_resolved = IntCounterVec::new(
            Opts::new(
                "fleet_endpoints_resolved_total",
                "Service endpoints resolved by resolution tier",
            ),
            &["source"],
        )
        .expect("Failed to create endpoints_resolved");

        let unhealthy_projects = IntGauge::new(
            "fleet_unhealthy_projects",
            "Projects classified unhealthy in the last monitor run",
        )
        .expect("Failed to create unhealthy_projects");

        let metrics_records = IntCounter::new(
            "fleet_metrics_records_total",
            "Per-project metrics records produced",
        )
        .expect("Failed to create metrics_records");

        let billing_errors = IntCounter::new(
            "fleet_billing_errors_total",
            "Billing collaborator calls that failed",
        )
        .expect("Failed to create billing_errors");

        registry
            .register(Box::new(probes_total.clone()))
            .expect("Failed to register probes_total");
        registry
            .register(Box::new(probe_latency_seconds.clone()))
            .expect("Failed to register probe_latency_seconds");
        registry
            .register(Box::new(endpoints_resolved.clone()))
            .expect("Failed to register endpoints_resolved");
        registry
            .register(Box::new(unhealthy_projects.clone()))
            .expect("Failed to register unhealthy_projects");
        registry
            .register(Box::new(metrics_records.clone()))
            .expect("Failed to register metrics_records");
        registry
            .register(Box::new(billing_errors.clone()))
            .expect("Failed to register billing_errors");

        Self {
            inner: Arc::new(FleetMetricsInner {
                registry,
                probes_total,
                probe_latency_seconds,
                endpoints_resolved,
                unhealthy_projects,
                metrics_records,
                billing_errors,
            }),
        }
    }

    pub fn record_endpoint(&self, source: EndpointSource) {
        let label = source.to_string();
        self.inner
            .endpoints_resolved
            .with_label_values(&[label.as_str()])
            .inc();
    }

    pub fn record_health(&self, result: &HealthResult) {
        let outcome = if result.healthy { "success" } else { "failure" };
        self.inner
            .probes_total
            .with_label_values(&["health", outcome])
            .inc();
    }

    pub fn record_synthetic(&self, result: &SyntheticProbeResult) {
        let outcome = if result.ok { "success" } else { "failure" };
        self.inner
            .probes_total
            .with_label_values(&["synthetic", outcome])
            .inc();
        if let Some(latency_ms) = result.latency_ms {
            self.inner.probe_latency_seconds.observe(latency_ms / 1000.0);
        }
    }

    pub fn set_unhealthy_projects(&self, count: usize) {
        self.inner.unhealthy_projects.set(count as i64);
    }

    pub fn record_metrics_record(&self, revenue: &RevenueEstimate) {
        self.inner.metrics_records.inc();
        if revenue.error.is_some() {
            self.inner.billing_errors.inc();
        }
    }

    pub fn probe_count(&self, kind: &str, outcome: &str) -> u64 {
        self.inner
            .probes_total
            .with_label_values(&[kind, outcome])
            .get()
    }

    pub fn unhealthy_projects(&self) -> i64 {
        self.inner.unhealthy_projects.get()
    }

    /// Render the registry in Prometheus text exposition format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.inner.registry.gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode run metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Write the rendered registry to a textfile-collector file
    pub fn write_textfile(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render())
    }
}

/// Structured logger for fleet job events
#[derive(Clone)]
pub struct StructuredLogger {
    job: String,
}

impl StructuredLogger {
    pub fn new(job: impl Into<String>) -> Self {
        Self { job: job.into() }
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn log_run_started(&self, project_count: usize, concurrency: usize) {
        info!(
            event = "run_started",
            job = %self.job,
            project_count = project_count,
            concurrency = concurrency,
            "Fleet run started"
        );
    }

    pub fn log_no_projects(&self) {
        info!(
            event = "run_skipped",
            job = %self.job,
            "No projects configured; set CLOUD_RUN_PROJECTS to enable this job"
        );
    }

    pub fn log_endpoint_resolved(&self, project: &str, url: &str, source: EndpointSource) {
        info!(
            event = "endpoint_resolved",
            job = %self.job,
            project = %project,
            url = %url,
            source = %source,
            "Resolved service endpoint"
        );
    }

    pub fn log_health(&self, project: &str, result: &HealthResult) {
        if result.healthy {
            info!(
                event = "health_checked",
                job = %self.job,
                project = %project,
                status_code = ?result.status_code,
                healthy = true,
                "Health check passed"
            );
        } else {
            warn!(
                event = "health_checked",
                job = %self.job,
                project = %project,
                status_code = ?result.status_code,
                error = ?result.error,
                healthy = false,
                "Health check failed"
            );
        }
    }

    pub fn log_synthetic(&self, project: &str, result: &SyntheticProbeResult) {
        if result.ok {
            info!(
                event = "synthetic_probed",
                job = %self.job,
                project = %project,
                latency_ms = ?result.latency_ms,
                status_code = ?result.status_code,
                ok = true,
                "Synthetic probe succeeded"
            );
        } else {
            warn!(
                event = "synthetic_probed",
                job = %self.job,
                project = %project,
                latency_ms = ?result.latency_ms,
                status_code = ?result.status_code,
                error = ?result.error,
                ok = false,
                "Synthetic probe failed"
            );
        }
    }

    pub fn log_revenue(&self, project: &str, revenue: &RevenueEstimate) {
        match &revenue.error {
            Some(error) => warn!(
                event = "revenue_estimated",
                job = %self.job,
                project = %project,
                error = %error,
                "Billing lookup failed; revenue left empty"
            ),
            None => info!(
                event = "revenue_estimated",
                job = %self.job,
                project = %project,
                estimated_revenue_usd = ?revenue.estimated_revenue_usd,
                billing_account = ?revenue.billing_account,
                "Revenue estimated"
            ),
        }
    }

    pub fn log_report_written(&self, path: &Path) {
        info!(
            event = "report_written",
            job = %self.job,
            path = %path.display(),
            "Wrote report"
        );
    }

    pub fn log_run_finished(&self, project_count: usize, unhealthy: &[String]) {
        if unhealthy.is_empty() {
            info!(
                event = "run_finished",
                job = %self.job,
                project_count = project_count,
                "Fleet run finished"
            );
        } else {
            warn!(
                event = "run_finished",
                job = %self.job,
                project_count = project_count,
                unhealthy = %unhealthy.join(", "),
                "Fleet run finished with unhealthy projects"
            );
        }
    }
}

//! Core data models for fleet reports

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque name of one deployment target
pub type ProjectId = String;

/// How a service endpoint was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointSource {
    Override,
    Discovery,
    Template,
}

impl fmt::Display for EndpointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointSource::Override => "override",
            EndpointSource::Discovery => "discovery",
            EndpointSource::Template => "template",
        };
        f.write_str(name)
    }
}

/// Resolved base URL for a project, without a trailing slash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub project_id: ProjectId,
    pub url: String,
    pub source: EndpointSource,
}

/// Body captured from a health response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

/// Outcome of the `/health` liveness check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResult {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ResponseBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResult {
    pub fn from_response(status_code: u16, body: ResponseBody) -> Self {
        Self {
            healthy: status_code == 200,
            status_code: Some(status_code),
            body: Some(body),
            error: None,
        }
    }

    pub fn from_error(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            status_code: None,
            body: None,
            error: Some(error.into()),
        }
    }
}

/// Latency sample against the service root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticProbeResult {
    pub latency_ms: Option<f64>,
    pub status_code: Option<u16>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyntheticProbeResult {
    pub fn from_error(error: impl Into<String>) -> Self {
        Self {
            latency_ms: None,
            status_code: None,
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Monitor entry for a single project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectHealth {
    pub base_url: String,
    pub health: HealthResult,
    pub synthetic: SyntheticProbeResult,
}

impl ProjectHealth {
    /// A project is unhealthy when either probe failed
    pub fn is_unhealthy(&self) -> bool {
        !self.health.healthy || !self.synthetic.ok
    }
}

/// Monitor report keyed by project id, in registry order
pub type FleetHealthReport = IndexMap<ProjectId, ProjectHealth>;

/// Stubbed usage figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub requests: u64,
    pub avg_latency_ms: f64,
    pub region: String,
}

/// Stubbed quota figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    pub cpu_allocated: String,
    pub memory_mb: u32,
    pub concurrency: u32,
}

/// Synthetic energy and carbon estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    pub energy_kwh: f64,
    pub carbon_kg: f64,
}

/// Revenue estimate returned by the billing collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueEstimate {
    pub estimated_revenue_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Metrics entry for a single project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub project_id: ProjectId,
    pub usage: Usage,
    pub quota: Quota,
    pub energy: EnergyEstimate,
    pub revenue: RevenueEstimate,
}

/// Fleet-wide sums
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsTotals {
    pub requests: u64,
    pub estimated_revenue_usd: f64,
    pub energy_kwh: f64,
    pub carbon_kg: f64,
}

impl MetricsTotals {
    /// Add one record; a missing revenue counts as zero
    pub fn accumulate(&mut self, record: &MetricsRecord) {
        self.requests += record.usage.requests;
        self.estimated_revenue_usd += record.revenue.estimated_revenue_usd.unwrap_or(0.0);
        self.energy_kwh += record.energy.energy_kwh;
        self.carbon_kg += record.energy.carbon_kg;
    }
}

/// Metrics report for a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetMetricsReport {
    pub generated_at: DateTime<Utc>,
    pub projects: Vec<MetricsRecord>,
    pub totals: MetricsTotals,
}

impl FleetMetricsReport {
    /// Build a report from records in registry order
    pub fn from_records(generated_at: DateTime<Utc>, projects: Vec<MetricsRecord>) -> Self {
        let mut totals = MetricsTotals::default();
        for record in &projects {
            totals.accumulate(record);
        }
        Self {
            generated_at,
            projects,
            totals,
        }
    }
}

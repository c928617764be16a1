//! Fleet library for Cloud Run health monitoring and metrics collection
//!
//! This crate provides the core functionality for:
//! - Project registry and service endpoint resolution
//! - Liveness and synthetic latency probes
//! - Synthetic usage, energy and revenue estimation
//! - Fleet-wide orchestration and report persistence
//! - Structured logging and run metrics

pub mod collector;
pub mod config;
pub mod error;
pub mod estimator;
pub mod models;
pub mod monitor;
pub mod observability;
pub mod probe;
pub mod registry;
pub mod report;

pub use collector::FleetMetricsCollector;
pub use config::FleetConfig;
pub use error::{BillingError, ConfigError, DiscoveryError, ReportError, TransportError};
pub use estimator::{estimate_energy, BillingClient, CloudBillingClient, MetricsEstimator};
pub use models::*;
pub use monitor::{FleetMonitor, MonitorOutcome};
pub use observability::{FleetMetrics, StructuredLogger};
pub use probe::HealthProbe;
pub use registry::{EndpointDiscovery, GcloudDiscovery, ProjectRegistry};

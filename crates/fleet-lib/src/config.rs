//! Fleet configuration
//!
//! All settings are read once per run from the process environment and
//! passed explicitly into each component.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration shared by the monitor and metrics jobs
#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    /// Raw comma-separated project list (`CLOUD_RUN_PROJECTS`)
    #[serde(default, rename = "cloud_run_projects")]
    pub projects: Option<String>,

    /// Deploy region (`DEPLOY_REGION`)
    #[serde(default = "default_region", rename = "deploy_region")]
    pub region: String,

    /// Cloud Run service name (`CLOUD_RUN_SERVICE`)
    #[serde(default = "default_service", rename = "cloud_run_service")]
    pub service: String,

    /// Base URL applied to every project, skipping discovery (`CLOUD_RUN_BASE_URL`)
    #[serde(default, rename = "cloud_run_base_url")]
    pub base_url_override: Option<String>,

    /// Fallback URL template with `{service}`, `{region}` and `{project}` placeholders
    #[serde(default = "default_url_template", rename = "cloud_run_service_url_template")]
    pub url_template: String,

    /// Service-account key JSON enabling the billing collaborator (`GCP_SA_KEY`)
    #[serde(default, rename = "gcp_sa_key")]
    pub billing_credentials: Option<String>,

    /// Whether to query `gcloud` for the live service URL
    #[serde(default = "default_discovery_enabled", rename = "cloud_run_discovery")]
    pub discovery_enabled: bool,

    #[serde(default = "default_health_timeout", rename = "fleet_health_timeout_secs")]
    pub health_timeout_secs: u64,

    #[serde(default = "default_synthetic_timeout", rename = "fleet_synthetic_timeout_secs")]
    pub synthetic_timeout_secs: u64,

    #[serde(default = "default_discovery_timeout", rename = "fleet_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,

    #[serde(default = "default_billing_timeout", rename = "fleet_billing_timeout_secs")]
    pub billing_timeout_secs: u64,

    /// Maximum number of projects processed at once
    #[serde(default = "default_concurrency", rename = "fleet_concurrency")]
    pub concurrency: usize,

    /// Monitor report path (`FLEET_MONITOR_OUTPUT`)
    #[serde(default = "default_monitor_output", rename = "fleet_monitor_output")]
    pub monitor_output: PathBuf,

    /// Metrics report path (`FLEET_METRICS_OUTPUT`)
    #[serde(default = "default_metrics_output", rename = "fleet_metrics_output")]
    pub metrics_output: PathBuf,
}

fn default_region() -> String {
    "us-central1".to_string()
}

fn default_service() -> String {
    "gpt5-dashboard".to_string()
}

fn default_url_template() -> String {
    "https://{service}-{region}-{project}.run.app".to_string()
}

fn default_discovery_enabled() -> bool {
    true
}

fn default_health_timeout() -> u64 {
    10
}

fn default_synthetic_timeout() -> u64 {
    15
}

fn default_discovery_timeout() -> u64 {
    30
}

fn default_billing_timeout() -> u64 {
    30
}

fn default_concurrency() -> usize {
    1
}

fn default_monitor_output() -> PathBuf {
    PathBuf::from("monitor_results.json")
}

fn default_metrics_output() -> PathBuf {
    PathBuf::from("metrics.json")
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            projects: None,
            region: default_region(),
            service: default_service(),
            base_url_override: None,
            url_template: default_url_template(),
            billing_credentials: None,
            discovery_enabled: default_discovery_enabled(),
            health_timeout_secs: default_health_timeout(),
            synthetic_timeout_secs: default_synthetic_timeout(),
            discovery_timeout_secs: default_discovery_timeout(),
            billing_timeout_secs: default_billing_timeout(),
            concurrency: default_concurrency(),
            monitor_output: default_monitor_output(),
            metrics_output: default_metrics_output(),
        }
    }
}

impl FleetConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    /// Values stay strings until serde converts the typed fields, so
    /// project ids such as `007` are never rewritten as numbers.
    fn from_environment(environment: config::Environment) -> Result<Self, ConfigError> {
        let config = config::Config::builder().add_source(environment).build()?;

        let mut loaded: FleetConfig = config.try_deserialize()?;
        loaded.normalize();
        Ok(loaded)
    }

    fn normalize(&mut self) {
        self.concurrency = self.concurrency.max(1);
        if matches!(self.base_url_override.as_deref(), Some("")) {
            self.base_url_override = None;
        }
        if matches!(self.billing_credentials.as_deref(), Some("")) {
            self.billing_credentials = None;
        }
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn synthetic_timeout(&self) -> Duration {
        Duration::from_secs(self.synthetic_timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn billing_timeout(&self) -> Duration {
        Duration::from_secs(self.billing_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_job() {
        let config = FleetConfig::default();
        assert_eq!(config.region, "us-central1");
        assert_eq!(config.service, "gpt5-dashboard");
        assert_eq!(config.health_timeout(), Duration::from_secs(10));
        assert_eq!(config.synthetic_timeout(), Duration::from_secs(15));
        assert_eq!(config.concurrency, 1);
        assert!(config.projects.is_none());
        assert!(config.discovery_enabled);
    }

    fn load_from(vars: &[(&str, &str)]) -> Result<FleetConfig, ConfigError> {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FleetConfig::from_environment(config::Environment::default().source(Some(source)))
    }

    #[test]
    fn test_numeric_looking_values_load_verbatim() {
        let config = load_from(&[
            ("CLOUD_RUN_PROJECTS", "007,1e5,12.50"),
            ("CLOUD_RUN_SERVICE", "0123"),
            ("DEPLOY_REGION", "1"),
        ])
        .unwrap();

        assert_eq!(config.projects.as_deref(), Some("007,1e5,12.50"));
        assert_eq!(config.service, "0123");
        assert_eq!(config.region, "1");
    }

    #[test]
    fn test_typed_fields_parse_from_strings() {
        let config = load_from(&[
            ("FLEET_CONCURRENCY", "4"),
            ("FLEET_HEALTH_TIMEOUT_SECS", "3"),
            ("CLOUD_RUN_DISCOVERY", "false"),
            ("FLEET_MONITOR_OUTPUT", "out/monitor.json"),
        ])
        .unwrap();

        assert_eq!(config.concurrency, 4);
        assert_eq!(config.health_timeout(), Duration::from_secs(3));
        assert!(!config.discovery_enabled);
        assert_eq!(config.monitor_output, PathBuf::from("out/monitor.json"));
        assert_eq!(config.service, "gpt5-dashboard");
    }

    #[test]
    fn test_unparseable_number_is_invalid() {
        let err = load_from(&[("FLEET_CONCURRENCY", "lots")]).unwrap_err();
        assert!(err.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn test_normalize_clears_empty_values() {
        let mut config = FleetConfig {
            base_url_override: Some(String::new()),
            billing_credentials: Some(String::new()),
            concurrency: 0,
            ..Default::default()
        };
        config.normalize();

        assert!(config.base_url_override.is_none());
        assert!(config.billing_credentials.is_none());
        assert_eq!(config.concurrency, 1);
    }
}

//! Project registry and service endpoint resolution
//!
//! Endpoints are resolved fresh on every run, in order:
//! 1. the configured base-URL override (applies to every project)
//! 2. live discovery through the deployment platform
//! 3. the configured URL template

use crate::config::FleetConfig;
use crate::error::DiscoveryError;
use crate::models::{EndpointSource, ProjectId, ServiceEndpoint};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Live lookup of a deployed service's public URL
#[async_trait]
pub trait EndpointDiscovery: Send + Sync {
    async fn discover(
        &self,
        service: &str,
        project: &str,
        region: &str,
    ) -> Result<String, DiscoveryError>;
}

/// Discovery through `gcloud run services describe`
pub struct GcloudDiscovery {
    binary: String,
    timeout: Duration,
}

impl GcloudDiscovery {
    pub fn new(timeout: Duration) -> Self {
        Self {
            binary: "gcloud".to_string(),
            timeout,
        }
    }

    /// Use a different executable, e.g. a wrapper script
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

#[async_trait]
impl EndpointDiscovery for GcloudDiscovery {
    async fn discover(
        &self,
        service: &str,
        project: &str,
        region: &str,
    ) -> Result<String, DiscoveryError> {
        let mut command = Command::new(&self.binary);
        command
            .args(["run", "services", "describe", service])
            .args(["--project", project])
            .args(["--region", region])
            .arg("--format=value(status.url)")
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| DiscoveryError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(DiscoveryError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if url.is_empty() {
            return Err(DiscoveryError::Empty);
        }
        Ok(url)
    }
}

/// Source of the project list and per-project endpoints
#[derive(Clone)]
pub struct ProjectRegistry {
    config: Arc<FleetConfig>,
    discovery: Option<Arc<dyn EndpointDiscovery>>,
}

impl ProjectRegistry {
    pub fn new(config: Arc<FleetConfig>, discovery: Option<Arc<dyn EndpointDiscovery>>) -> Self {
        Self { config, discovery }
    }

    /// Build a registry using `gcloud` discovery when enabled in the config
    pub fn from_config(config: Arc<FleetConfig>) -> Self {
        let discovery: Option<Arc<dyn EndpointDiscovery>> = if config.discovery_enabled {
            Some(Arc::new(GcloudDiscovery::new(config.discovery_timeout())))
        } else {
            None
        };
        Self::new(config, discovery)
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Configured projects in input order
    pub fn list_projects(&self) -> Vec<ProjectId> {
        parse_projects(self.config.projects.as_deref())
    }

    /// Resolve the base URL for one project
    ///
    /// Discovery failures are never returned; they fall through to the
    /// template.
    pub async fn resolve_endpoint(&self, project: &str) -> ServiceEndpoint {
        if let Some(url) = &self.config.base_url_override {
            return ServiceEndpoint {
                project_id: project.to_string(),
                url: trim_trailing_slash(url),
                source: EndpointSource::Override,
            };
        }

        if let Some(discovery) = &self.discovery {
            match discovery
                .discover(&self.config.service, project, &self.config.region)
                .await
            {
                Ok(url) if !url.trim().is_empty() => {
                    return ServiceEndpoint {
                        project_id: project.to_string(),
                        url: trim_trailing_slash(url.trim()),
                        source: EndpointSource::Discovery,
                    };
                }
                Ok(_) => debug!(project = %project, "Discovery returned no URL, using template"),
                Err(e) => debug!(project = %project, error = %e, "Discovery failed, using template"),
            }
        }

        ServiceEndpoint {
            project_id: project.to_string(),
            url: render_template(
                &self.config.url_template,
                &self.config.service,
                &self.config.region,
                project,
            ),
            source: EndpointSource::Template,
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn parse_projects(raw: Option<&str>) -> Vec<ProjectId> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn render_template(template: &str, service: &str, region: &str, project: &str) -> String {
    let url = template
        .replace("{service}", service)
        .replace("{region}", region)
        .replace("{project}", project);
    trim_trailing_slash(&url)
}

fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

//! Project inspection command

use anyhow::Result;
use fleet_lib::{FleetConfig, ProjectRegistry, ServiceEndpoint};
use std::sync::Arc;
use tabled::Tabled;

use crate::output::{print_info, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Endpoint")]
    url: String,
    #[tabled(rename = "Resolved Via")]
    source: String,
}

/// Resolve and print every configured project's endpoint; no probes are sent
pub async fn list_projects(config: FleetConfig, format: OutputFormat) -> Result<()> {
    let registry = ProjectRegistry::from_config(Arc::new(config));

    let mut endpoints: Vec<ServiceEndpoint> = Vec::new();
    for project in registry.list_projects() {
        endpoints.push(registry.resolve_endpoint(&project).await);
    }

    match format {
        OutputFormat::Json => print_json(&endpoints)?,
        OutputFormat::Table => {
            if endpoints.is_empty() {
                print_info("No projects configured; set CLOUD_RUN_PROJECTS.");
                return Ok(());
            }
            let rows: Vec<EndpointRow> = endpoints
                .into_iter()
                .map(|e| EndpointRow {
                    project: e.project_id,
                    url: e.url,
                    source: e.source.to_string(),
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}

//! Liveness and synthetic latency probes
//!
//! The two probes are independent requests: `/health` is the contract
//! check, the service root is the latency sample.

use crate::error::TransportError;
use crate::models::{HealthResult, ResponseBody, SyntheticProbeResult};
use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::{Duration, Instant};

/// HTTP prober for one fleet run
#[derive(Clone)]
pub struct HealthProbe {
    client: Client,
    health_timeout: Duration,
    synthetic_timeout: Duration,
}

impl HealthProbe {
    /// Create a new prober with per-request timeouts
    pub fn new(health_timeout: Duration, synthetic_timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fleet-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            health_timeout,
            synthetic_timeout,
        })
    }

    /// GET `{base_url}/health`
    pub async fn check_health(&self, base_url: &str) -> HealthResult {
        match self.fetch_health(base_url).await {
            Ok((status, body)) => HealthResult::from_response(status, body),
            Err(e) => HealthResult::from_error(e.to_string()),
        }
    }

    async fn fetch_health(&self, base_url: &str) -> Result<(u16, ResponseBody), TransportError> {
        let response = self
            .client
            .get(format!("{}/health", base_url))
            .timeout(self.health_timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        let text = response.text().await?;
        let body = if is_json {
            serde_json::from_str(&text)
                .map(ResponseBody::Json)
                .unwrap_or(ResponseBody::Text(text))
        } else {
            ResponseBody::Text(text)
        };

        Ok((status, body))
    }

    /// GET `base_url` and measure wall-clock latency
    pub async fn synthetic_probe(&self, base_url: &str) -> SyntheticProbeResult {
        let start = Instant::now();
        match self.fetch_root(base_url).await {
            Ok(status) => {
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                SyntheticProbeResult {
                    latency_ms: Some(round_to(latency_ms, 2)),
                    status_code: Some(status),
                    ok: status < 400,
                    error: None,
                }
            }
            Err(e) => SyntheticProbeResult::from_error(e.to_string()),
        }
    }

    async fn fetch_root(&self, base_url: &str) -> Result<u16, TransportError> {
        let response = self
            .client
            .get(base_url)
            .timeout(self.synthetic_timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        response.bytes().await?;
        Ok(status)
    }
}

/// Round to a fixed number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

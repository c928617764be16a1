//! Synthetic usage, energy and revenue estimation
//!
//! Usage and quota are static placeholders until real request telemetry is
//! wired in. Energy is a fixed linear model over the request count.

mod billing;

pub use billing::{BillingAccount, BillingClient, CloudBillingClient, ServiceAccountKey};

use crate::models::{EnergyEstimate, MetricsRecord, Quota, RevenueEstimate, Usage};
use crate::probe::round_to;
use std::sync::Arc;

/// kWh attributed to a single request
pub const KWH_PER_REQUEST: f64 = 0.0002;

/// kg CO2 per kWh
pub const CARBON_KG_PER_KWH: f64 = 0.0004;

/// Energy and carbon for a request count
pub fn estimate_energy(request_count: u64) -> EnergyEstimate {
    let energy_kwh = round_to(request_count as f64 * KWH_PER_REQUEST, 4);
    let carbon_kg = round_to(energy_kwh * CARBON_KG_PER_KWH, 6);
    EnergyEstimate {
        energy_kwh,
        carbon_kg,
    }
}

/// Revenue placeholder backed by the billing collaborator
///
/// Never fails: collaborator errors become a null revenue with an error note.
pub async fn estimate_revenue(
    client: Option<&dyn BillingClient>,
    project_id: &str,
) -> RevenueEstimate {
    let Some(client) = client else {
        return RevenueEstimate {
            estimated_revenue_usd: None,
            billing_account: None,
            note: Some("No billing client configured".to_string()),
            error: None,
        };
    };

    match client.list_billing_accounts(1).await {
        Ok(accounts) => RevenueEstimate {
            estimated_revenue_usd: Some(0.0),
            billing_account: accounts.into_iter().next().and_then(|a| a.name),
            note: Some("Replace stub with project-level spend query".to_string()),
            error: None,
        },
        Err(e) => {
            tracing::debug!(project = %project_id, error = %e, "Billing lookup failed");
            RevenueEstimate {
                estimated_revenue_usd: None,
                billing_account: None,
                note: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Builds per-project metrics records
#[derive(Clone)]
pub struct MetricsEstimator {
    region: String,
    billing: Option<Arc<dyn BillingClient>>,
}

impl MetricsEstimator {
    pub fn new(region: impl Into<String>, billing: Option<Arc<dyn BillingClient>>) -> Self {
        Self {
            region: region.into(),
            billing,
        }
    }

    pub async fn collect_for_project(&self, project_id: &str) -> MetricsRecord {
        let usage = Usage {
            requests: 0,
            avg_latency_ms: 0.0,
            region: self.region.clone(),
        };

        let quota = Quota {
            cpu_allocated: "shared".to_string(),
            memory_mb: 512,
            concurrency: 80,
        };

        let energy = estimate_energy(usage.requests);
        let revenue = estimate_revenue(self.billing.as_deref(), project_id).await;

        MetricsRecord {
            project_id: project_id.to_string(),
            usage,
            quota,
            energy,
            revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BillingError, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StaticBilling {
        accounts: Vec<BillingAccount>,
        last_page_size: AtomicU32,
    }

    #[async_trait]
    impl BillingClient for StaticBilling {
        async fn list_billing_accounts(
            &self,
            page_size: u32,
        ) -> Result<Vec<BillingAccount>, BillingError> {
            self.last_page_size.store(page_size, Ordering::SeqCst);
            Ok(self.accounts.clone())
        }
    }

    struct BrokenBilling;

    #[async_trait]
    impl BillingClient for BrokenBilling {
        async fn list_billing_accounts(&self, _: u32) -> Result<Vec<BillingAccount>, BillingError> {
            Err(BillingError::Transport(TransportError::Timeout(
                "operation timed out".to_string(),
            )))
        }
    }

    #[test]
    fn test_estimate_energy_zero_requests() {
        let energy = estimate_energy(0);
        assert_eq!(energy.energy_kwh, 0.0);
        assert_eq!(energy.carbon_kg, 0.0);
    }

    #[test]
    fn test_estimate_energy_linear_model() {
        for requests in [1u64, 7, 1_000, 123_456, 10_000_000] {
            let energy = estimate_energy(requests);
            let expected_kwh = round_to(requests as f64 * 0.0002, 4);
            assert_eq!(energy.energy_kwh, expected_kwh);
            assert_eq!(energy.carbon_kg, round_to(expected_kwh * 0.0004, 6));
            assert_eq!(estimate_energy(requests), energy);
        }
        assert_eq!(estimate_energy(10_000).energy_kwh, 2.0);
        assert_eq!(estimate_energy(10_000).carbon_kg, 0.0008);
    }

    #[tokio::test]
    async fn test_revenue_without_client() {
        let revenue = estimate_revenue(None, "alpha").await;
        assert!(revenue.estimated_revenue_usd.is_none());
        assert_eq!(revenue.note.as_deref(), Some("No billing client configured"));
        assert!(revenue.error.is_none());
    }

    #[tokio::test]
    async fn test_revenue_with_client_attaches_account() {
        let billing = StaticBilling {
            accounts: vec![BillingAccount {
                name: Some("billingAccounts/0123AB-4567CD-89EF01".to_string()),
                display_name: Some("Main".to_string()),
                open: Some(true),
            }],
            last_page_size: AtomicU32::new(0),
        };

        let revenue = estimate_revenue(Some(&billing), "alpha").await;

        assert_eq!(revenue.estimated_revenue_usd, Some(0.0));
        assert_eq!(
            revenue.billing_account.as_deref(),
            Some("billingAccounts/0123AB-4567CD-89EF01")
        );
        assert_eq!(billing.last_page_size.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_revenue_with_no_accounts() {
        let billing = StaticBilling {
            accounts: Vec::new(),
            last_page_size: AtomicU32::new(0),
        };

        let revenue = estimate_revenue(Some(&billing), "alpha").await;
        assert_eq!(revenue.estimated_revenue_usd, Some(0.0));
        assert!(revenue.billing_account.is_none());
    }

    #[tokio::test]
    async fn test_revenue_error_is_captured() {
        let revenue = estimate_revenue(Some(&BrokenBilling), "alpha").await;
        assert!(revenue.estimated_revenue_usd.is_none());
        assert!(revenue.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_collect_for_project_stub_values() {
        let estimator = MetricsEstimator::new("us-east4", None);
        let record = estimator.collect_for_project("alpha").await;

        assert_eq!(record.project_id, "alpha");
        assert_eq!(record.usage.requests, 0);
        assert_eq!(record.usage.region, "us-east4");
        assert_eq!(record.quota.cpu_allocated, "shared");
        assert_eq!(record.quota.memory_mb, 512);
        assert_eq!(record.quota.concurrency, 80);
        assert_eq!(record.energy, estimate_energy(0));
        assert!(record.revenue.estimated_revenue_usd.is_none());
    }
}

//! Service Usage adapter: listing and batch-enabling provider APIs.

use notifier_core::provider::ServiceUsage;
use notifier_core::Result;
use serde::Deserialize;
use serde_json::json;

use crate::GcpClient;

const BASE: &str = "https://serviceusage.googleapis.com/v1";

#[derive(Debug, Deserialize)]
struct ServiceConfig {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EnabledService {
    config: Option<ServiceConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    services: Vec<EnabledService>,
    next_page_token: Option<String>,
}

/// Adapter over the Service Usage v1 REST API.
///
/// Batch enablement is a long-running operation; the adapter polls it to
/// completion before returning.
#[derive(Debug, Clone)]
pub struct ServiceUsageAdapter {
    client: GcpClient,
}

impl ServiceUsageAdapter {
    /// Creates a new adapter.
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ServiceUsage for ServiceUsageAdapter {
    async fn list_enabled(&self, project_id: &str) -> Result<Vec<String>> {
        let mut enabled = Vec::new();
        let mut page_token = String::new();

        loop {
            let url = format!(
                "{BASE}/projects/{project_id}/services?filter=state:ENABLED&pageSize=200&pageToken={page_token}"
            );
            let page: ListResponse = self
                .client
                .get(&url)
                .await
                .map_err(crate::Error::into_core)?;

            enabled.extend(
                page.services
                    .into_iter()
                    .filter_map(|service| service.config.map(|config| config.name)),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = token,
                _ => return Ok(enabled),
            }
        }
    }

    async fn batch_enable(&self, project_id: &str, service_ids: &[String]) -> Result<()> {
        if service_ids.is_empty() {
            return Ok(());
        }

        let operation = self
            .client
            .post(
                &format!("{BASE}/projects/{project_id}/services:batchEnable"),
                &json!({ "serviceIds": service_ids }),
            )
            .await
            .map_err(crate::Error::into_core)?;

        self.client
            .await_operation(BASE, operation)
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }
}

//! Cloud Run (v2) adapter.

use std::collections::BTreeMap;

use notifier_core::provider::{ComputeService, ContainerSpec, Service};
use notifier_core::{Result, names};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{GcpClient, TRACING_TARGET};

const BASE: &str = "https://run.googleapis.com/v2";

#[derive(Debug, Deserialize)]
struct ApiService {
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

impl From<ApiService> for Service {
    fn from(service: ApiService) -> Self {
        Self {
            name: service.name,
            uri: service.uri,
            labels: service.labels,
        }
    }
}

fn service_path(project_id: &str, region: &str, service_id: &str) -> String {
    format!("projects/{project_id}/locations/{region}/services/{service_id}")
}

/// Adapter over the Cloud Run Admin v2 REST API.
///
/// Deployments use the update-with-allow-missing call, giving
/// create-or-update semantics in one request. Rollouts and deletions are
/// long-running operations polled to completion.
#[derive(Debug, Clone)]
pub struct CloudRunAdapter {
    client: GcpClient,
}

impl CloudRunAdapter {
    /// Creates a new adapter.
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ComputeService for CloudRunAdapter {
    async fn deploy(
        &self,
        project_id: &str,
        region: &str,
        service_id: &str,
        container: &ContainerSpec,
    ) -> Result<Service> {
        let name = service_path(project_id, region, service_id);
        let env: Vec<Value> = container
            .env
            .iter()
            .map(|var| json!({ "name": var.name, "value": var.value }))
            .collect();
        let body = json!({
            "labels": { names::CREATOR_LABEL: names::TOOL_NAME },
            "template": {
                "containers": [{ "image": container.image, "env": env }],
            },
        });

        let operation = self
            .client
            .patch(&format!("{BASE}/{name}?allowMissing=true"), &body)
            .await
            .map_err(crate::Error::into_core)?;
        self.client
            .await_operation(BASE, operation)
            .await
            .map_err(crate::Error::into_core)?;

        // Re-read the service: the rollout response does not reliably carry
        // the serving URI.
        let service: ApiService = self
            .client
            .get(&format!("{BASE}/{name}"))
            .await
            .map_err(crate::Error::into_core)?;
        info!(target: TRACING_TARGET, service = %service.name, uri = %service.uri, "Service deployed");
        Ok(service.into())
    }

    async fn get_service(
        &self,
        project_id: &str,
        region: &str,
        service_id: &str,
    ) -> Result<Option<Service>> {
        let name = service_path(project_id, region, service_id);
        let service: Option<ApiService> = self
            .client
            .get_optional(&format!("{BASE}/{name}"))
            .await
            .map_err(crate::Error::into_core)?;
        Ok(service.map(Service::from))
    }

    async fn add_invoker(&self, service_name: &str, members: &[String]) -> Result<()> {
        let mut policy: Value = self
            .client
            .get(&format!("{BASE}/{service_name}:getIamPolicy"))
            .await
            .map_err(crate::Error::into_core)?;

        let binding = json!({ "role": names::ROLE_RUN_INVOKER, "members": members });
        match policy.get_mut("bindings").and_then(Value::as_array_mut) {
            Some(bindings) => bindings.push(binding),
            None => {
                policy["bindings"] = Value::Array(vec![binding]);
            }
        }

        self.client
            .post(
                &format!("{BASE}/{service_name}:setIamPolicy"),
                &json!({ "policy": policy }),
            )
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }

    async fn delete_service(
        &self,
        project_id: &str,
        region: &str,
        service_id: &str,
    ) -> Result<()> {
        let name = service_path(project_id, region, service_id);
        let operation = match self.client.delete(&format!("{BASE}/{name}")).await {
            Ok(operation) => operation,
            Err(error) if error.is_not_found() => {
                info!(target: TRACING_TARGET, service = %name, "Service already absent");
                return Ok(());
            }
            Err(error) => return Err(error.into_core()),
        };

        self.client
            .await_operation(BASE, operation)
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }
}

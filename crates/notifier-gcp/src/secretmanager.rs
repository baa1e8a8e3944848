//! Secret Manager adapter.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use notifier_core::provider::{Secret, SecretStore};
use notifier_core::{Result, names};
use serde_json::json;
use tracing::info;

use crate::{GcpClient, TRACING_TARGET};

const BASE: &str = "https://secretmanager.googleapis.com/v1";

/// Adapter over the Secret Manager v1 REST API.
#[derive(Debug, Clone)]
pub struct SecretManagerAdapter {
    client: GcpClient,
}

impl SecretManagerAdapter {
    /// Creates a new adapter.
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SecretStore for SecretManagerAdapter {
    async fn ensure_secret(&self, project_id: &str, secret_id: &str) -> Result<Secret> {
        let name = names::secret_path(project_id, secret_id);

        let existing: Option<serde_json::Value> = self
            .client
            .get_optional(&format!("{BASE}/{name}"))
            .await
            .map_err(crate::Error::into_core)?;
        if existing.is_some() {
            info!(target: TRACING_TARGET, secret = %secret_id, "Secret already exists");
            return Ok(Secret { name });
        }

        self.client
            .post(
                &format!("{BASE}/projects/{project_id}/secrets?secretId={secret_id}"),
                &json!({ "replication": { "automatic": {} } }),
            )
            .await
            .map_err(crate::Error::into_core)?;
        Ok(Secret { name })
    }

    async fn add_version(&self, secret_name: &str, payload: &[u8]) -> Result<()> {
        self.client
            .post(
                &format!("{BASE}/{secret_name}:addVersion"),
                &json!({ "payload": { "data": BASE64.encode(payload) } }),
            )
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }

    async fn set_accessors(&self, secret_name: &str, members: &[String]) -> Result<()> {
        // Replaces the whole policy: a single accessor binding, nothing else.
        let policy = json!({
            "policy": {
                "bindings": [{
                    "role": names::ROLE_SECRET_ACCESSOR,
                    "members": members,
                }],
            },
        });
        self.client
            .post(&format!("{BASE}/{secret_name}:setIamPolicy"), &policy)
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }

    async fn access_version(&self, secret_name: &str, version: Option<&str>) -> Result<Vec<u8>> {
        let version = version.unwrap_or("latest");
        let response = self
            .client
            .get::<serde_json::Value>(&format!("{BASE}/{secret_name}/versions/{version}:access"))
            .await
            .map_err(crate::Error::into_core)?;

        let data = response
            .pointer("/payload/data")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        BASE64.decode(data).map_err(|e| {
            notifier_core::Error::serialization()
                .with_message("secret payload is not valid base64")
                .with_source(e)
        })
    }

    async fn delete_secret(&self, secret_name: &str) -> Result<()> {
        match self.client.delete(&format!("{BASE}/{secret_name}")).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_not_found() => {
                info!(target: TRACING_TARGET, secret = %secret_name, "Secret already absent");
                Ok(())
            }
            Err(error) => Err(error.into_core()),
        }
    }
}

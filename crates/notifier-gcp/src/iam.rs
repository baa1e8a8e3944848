//! IAM service account adapter.

use notifier_core::Result;
use notifier_core::provider::IdentityStore;
use serde_json::json;
use tracing::info;

use crate::{GcpClient, TRACING_TARGET};

const BASE: &str = "https://iam.googleapis.com/v1";

/// Adapter over the IAM REST API for service account lifecycle.
#[derive(Debug, Clone)]
pub struct IamAdapter {
    client: GcpClient,
}

impl IamAdapter {
    /// Creates a new adapter.
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl IdentityStore for IamAdapter {
    async fn ensure_service_account(
        &self,
        project_id: &str,
        account_id: &str,
        display_name: &str,
    ) -> Result<()> {
        let url = format!("{BASE}/projects/{project_id}/serviceAccounts");
        let body = json!({
            "accountId": account_id,
            "serviceAccount": { "displayName": display_name },
        });

        match self.client.post(&url, &body).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_already_exists() => {
                info!(target: TRACING_TARGET, account = %account_id, "Service account already exists");
                Ok(())
            }
            Err(error) => Err(error.into_core()),
        }
    }

    async fn delete_service_account(&self, project_id: &str, account_id: &str) -> Result<()> {
        let email = format!("{account_id}@{project_id}.iam.gserviceaccount.com");
        let url = format!("{BASE}/projects/{project_id}/serviceAccounts/{email}");

        match self.client.delete(&url).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_not_found() => {
                info!(target: TRACING_TARGET, account = %email, "Service account already absent");
                Ok(())
            }
            Err(error) => Err(error.into_core()),
        }
    }
}

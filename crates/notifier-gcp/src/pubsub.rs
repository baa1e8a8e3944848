//! Pub/Sub adapter.

use notifier_core::Result;
use notifier_core::provider::{Messaging, PushConfig};
use serde_json::{Value, json};
use tracing::info;

use crate::{GcpClient, TRACING_TARGET};

const BASE: &str = "https://pubsub.googleapis.com/v1";

fn topic_path(project_id: &str, topic_id: &str) -> String {
    format!("projects/{project_id}/topics/{topic_id}")
}

fn subscription_path(project_id: &str, subscription_id: &str) -> String {
    format!("projects/{project_id}/subscriptions/{subscription_id}")
}

/// Adapter over the Pub/Sub REST API.
///
/// Creation calls check for an existing resource first; deletion surfaces
/// absence as an error so callers notice when a teardown target was never
/// provisioned.
#[derive(Debug, Clone)]
pub struct PubSubAdapter {
    client: GcpClient,
}

impl PubSubAdapter {
    /// Creates a new adapter.
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Messaging for PubSubAdapter {
    async fn ensure_topic(&self, project_id: &str, topic_id: &str) -> Result<()> {
        let name = topic_path(project_id, topic_id);
        let url = format!("{BASE}/{name}");

        let existing: Option<Value> = self
            .client
            .get_optional(&url)
            .await
            .map_err(crate::Error::into_core)?;
        if existing.is_some() {
            info!(target: TRACING_TARGET, topic = %name, "Topic already exists");
            return Ok(());
        }

        match self.client.put(&url, &json!({})).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_already_exists() => Ok(()),
            Err(error) => Err(error.into_core()),
        }
    }

    async fn ensure_push_subscription(
        &self,
        project_id: &str,
        subscription_id: &str,
        topic_id: &str,
        push: &PushConfig,
    ) -> Result<()> {
        let name = subscription_path(project_id, subscription_id);
        let url = format!("{BASE}/{name}");

        let existing: Option<Value> = self
            .client
            .get_optional(&url)
            .await
            .map_err(crate::Error::into_core)?;
        if existing.is_some() {
            info!(target: TRACING_TARGET, subscription = %name, "Subscription already exists");
            return Ok(());
        }

        let body = json!({
            "topic": topic_path(project_id, topic_id),
            "pushConfig": {
                "pushEndpoint": push.push_endpoint,
                "oidcToken": { "serviceAccountEmail": push.oidc_service_account },
            },
        });
        match self.client.put(&url, &body).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_already_exists() => Ok(()),
            Err(error) => Err(error.into_core()),
        }
    }

    async fn delete_subscription(&self, project_id: &str, subscription_id: &str) -> Result<()> {
        let name = subscription_path(project_id, subscription_id);
        let _: Value = self
            .client
            .delete(&format!("{BASE}/{name}"))
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }

    async fn delete_topic(&self, project_id: &str, topic_id: &str) -> Result<()> {
        let name = topic_path(project_id, topic_id);
        let _: Value = self
            .client
            .delete(&format!("{BASE}/{name}"))
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }
}

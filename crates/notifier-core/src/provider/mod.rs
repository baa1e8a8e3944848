//! Provider ports: one trait per cloud capability.
//!
//! Each trait is a thin, object-safe surface over one provider API. The
//! workflows depend only on these traits, so they can run against the real
//! REST adapters or against the in-memory mock.

mod types;

use std::sync::Arc;

pub use types::{Binding, ContainerSpec, EnvVar, Project, PushConfig, Secret, Service};

use crate::Result;

/// Project lookup and project-level IAM policy operations.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// Resolves a project by id.
    async fn get_project(&self, project_id: &str) -> Result<Project>;

    /// Lists projects in `ACTIVE` state visible to the caller.
    async fn list_active_projects(&self) -> Result<Vec<Project>>;

    /// Appends bindings to the project IAM policy (read-modify-write).
    async fn add_bindings(&self, project_id: &str, bindings: &[Binding]) -> Result<()>;
}

/// Provider API enablement.
#[async_trait::async_trait]
pub trait ServiceUsage: Send + Sync {
    /// Lists service ids currently in `ENABLED` state.
    async fn list_enabled(&self, project_id: &str) -> Result<Vec<String>>;

    /// Enables the given services in one batch call, awaiting completion.
    async fn batch_enable(&self, project_id: &str, service_ids: &[String]) -> Result<()>;
}

/// Secret storage operations.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// Creates the secret or returns it when it already exists.
    async fn ensure_secret(&self, project_id: &str, secret_id: &str) -> Result<Secret>;

    /// Appends a new version holding the given payload bytes.
    async fn add_version(&self, secret_name: &str, payload: &[u8]) -> Result<()>;

    /// Replaces the secret access policy with an accessor binding for the
    /// given members. Non-additive: existing bindings are overwritten.
    async fn set_accessors(&self, secret_name: &str, members: &[String]) -> Result<()>;

    /// Reads back a secret version payload (latest when `version` is `None`).
    async fn access_version(&self, secret_name: &str, version: Option<&str>) -> Result<Vec<u8>>;

    /// Deletes the secret. Absence is treated as success.
    async fn delete_secret(&self, secret_name: &str) -> Result<()>;
}

/// Object storage operations.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Creates the bucket in the given project or succeeds when it already
    /// exists.
    async fn ensure_bucket(&self, project_id: &str, bucket: &str) -> Result<()>;

    /// Appends an object-viewer binding to the bucket policy (additive).
    async fn add_viewers(&self, bucket: &str, members: &[String]) -> Result<()>;

    /// Writes an object, overwriting any existing content, and returns its
    /// `gs://{bucket}/{object}` locator.
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<String>;

    /// Recursively deletes the bucket and all contained objects. Absence is
    /// treated as success.
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
}

/// Managed container service operations.
#[async_trait::async_trait]
pub trait ComputeService: Send + Sync {
    /// Creates or updates the service and awaits the rollout. The adapter
    /// attaches the ownership label identifying this tool as creator.
    async fn deploy(
        &self,
        project_id: &str,
        region: &str,
        service_id: &str,
        container: &ContainerSpec,
    ) -> Result<Service>;

    /// Looks up the service, returning `None` when it does not exist.
    async fn get_service(
        &self,
        project_id: &str,
        region: &str,
        service_id: &str,
    ) -> Result<Option<Service>>;

    /// Appends an invoker binding to the service access policy (additive).
    async fn add_invoker(&self, service_name: &str, members: &[String]) -> Result<()>;

    /// Deletes the service and awaits completion. Absence is treated as
    /// success; the ownership guard lives in the cleanup workflow.
    async fn delete_service(&self, project_id: &str, region: &str, service_id: &str)
    -> Result<()>;
}

/// Topic and push subscription operations.
#[async_trait::async_trait]
pub trait Messaging: Send + Sync {
    /// Creates the topic unless it already exists.
    async fn ensure_topic(&self, project_id: &str, topic_id: &str) -> Result<()>;

    /// Creates the push subscription unless it already exists.
    async fn ensure_push_subscription(
        &self,
        project_id: &str,
        subscription_id: &str,
        topic_id: &str,
        push: &PushConfig,
    ) -> Result<()>;

    /// Deletes the subscription. Absence is a hard error.
    async fn delete_subscription(&self, project_id: &str, subscription_id: &str) -> Result<()>;

    /// Deletes the topic. Absence is a hard error.
    async fn delete_topic(&self, project_id: &str, topic_id: &str) -> Result<()>;
}

/// Service account lifecycle operations.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    /// Creates the service account; an existing account is success.
    async fn ensure_service_account(
        &self,
        project_id: &str,
        account_id: &str,
        display_name: &str,
    ) -> Result<()>;

    /// Deletes the service account; absence is success.
    async fn delete_service_account(&self, project_id: &str, account_id: &str) -> Result<()>;
}

/// Container for all provider ports.
///
/// Holds one shared handle per capability, enabling dependency injection
/// into the workflows and tests.
#[derive(Clone)]
pub struct CloudServices {
    /// Project lookup and project-level IAM.
    pub projects: Arc<dyn ProjectStore>,
    /// Provider API enablement.
    pub service_usage: Arc<dyn ServiceUsage>,
    /// Secret storage.
    pub secrets: Arc<dyn SecretStore>,
    /// Object storage.
    pub objects: Arc<dyn ObjectStore>,
    /// Managed container services.
    pub compute: Arc<dyn ComputeService>,
    /// Topics and subscriptions.
    pub messaging: Arc<dyn Messaging>,
    /// Service accounts.
    pub identity: Arc<dyn IdentityStore>,
}

impl CloudServices {
    /// Creates a new services container.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        service_usage: Arc<dyn ServiceUsage>,
        secrets: Arc<dyn SecretStore>,
        objects: Arc<dyn ObjectStore>,
        compute: Arc<dyn ComputeService>,
        messaging: Arc<dyn Messaging>,
        identity: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            projects,
            service_usage,
            secrets,
            objects,
            compute,
            messaging,
            identity,
        }
    }
}

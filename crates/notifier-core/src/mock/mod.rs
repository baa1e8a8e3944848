//! In-memory mock implementation of every provider port.
//!
//! This module provides a unified mock provider for unit and integration
//! testing of the workflows. All resources live in one shared state that
//! tests can inspect, and individual operations can be made to fail.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! notifier-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::provider::{
    Binding, CloudServices, ComputeService, ContainerSpec, IdentityStore, Messaging, ObjectStore,
    Project, ProjectStore, PushConfig, Secret, SecretStore, Service, ServiceUsage,
};
use crate::{Error, Result, names};

/// A stored secret with its versions and accessor policy.
#[derive(Debug, Default, Clone)]
pub struct MockSecret {
    /// Appended version payloads, oldest first.
    pub versions: Vec<Vec<u8>>,
    /// Current accessor members (replaced, not merged).
    pub accessors: Vec<String>,
}

/// A stored object with its content type.
#[derive(Debug, Clone)]
pub struct MockObject {
    /// Raw object bytes.
    pub content: Vec<u8>,
    /// Declared content type.
    pub content_type: String,
}

/// A stored bucket with its objects and viewer policy.
#[derive(Debug, Default, Clone)]
pub struct MockBucket {
    /// Objects by name.
    pub objects: BTreeMap<String, MockObject>,
    /// Appended viewer members.
    pub viewers: Vec<String>,
}

/// A stored push subscription.
#[derive(Debug, Clone)]
pub struct MockSubscription {
    /// Topic id the subscription is attached to.
    pub topic_id: String,
    /// Push delivery configuration.
    pub push: PushConfig,
}

/// Shared state of the mock provider.
#[derive(Debug, Default)]
pub struct MockState {
    /// Known projects.
    pub projects: Vec<Project>,
    /// Enabled service ids per project id.
    pub enabled_services: BTreeMap<String, BTreeSet<String>>,
    /// Appended project-level bindings per project id.
    pub project_bindings: BTreeMap<String, Vec<Binding>>,
    /// Secrets by full resource name.
    pub secrets: BTreeMap<String, MockSecret>,
    /// Buckets by name.
    pub buckets: BTreeMap<String, MockBucket>,
    /// Services by full resource name.
    pub services: BTreeMap<String, Service>,
    /// Deployed container specs by service resource name.
    pub containers: BTreeMap<String, ContainerSpec>,
    /// Invoker members per service resource name.
    pub invokers: BTreeMap<String, Vec<String>>,
    /// Topic ids per project id.
    pub topics: BTreeMap<String, BTreeSet<String>>,
    /// Subscriptions by `{project_id}/{subscription_id}`.
    pub subscriptions: BTreeMap<String, MockSubscription>,
    /// Service account ids per project id.
    pub service_accounts: BTreeMap<String, BTreeSet<String>>,
    /// Operations forced to fail.
    deny: BTreeSet<String>,
}

/// Unified mock provider implementing every port.
#[derive(Debug, Clone, Default)]
pub struct MockCloud {
    state: Arc<Mutex<MockState>>,
}

impl MockCloud {
    /// Creates an empty mock cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a project with the given id and number.
    #[must_use]
    pub fn with_project(self, project_id: &str, project_number: &str) -> Self {
        self.state().projects.push(Project {
            name: format!("projects/{project_number}"),
            project_id: project_id.to_owned(),
            display_name: project_id.to_owned(),
        });
        self
    }

    /// Forces the named operation to fail until [`MockCloud::allow`] is called.
    pub fn deny(&self, operation: &str) {
        self.state().deny.insert(operation.to_owned());
    }

    /// Clears a failure injection.
    pub fn allow(&self, operation: &str) {
        self.state().deny.remove(operation);
    }

    /// Locks and returns the shared state for inspection or seeding.
    ///
    /// # Panics
    ///
    /// Panics when the state mutex is poisoned.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state mutex poisoned")
    }

    /// Wraps this mock into a [`CloudServices`] container.
    pub fn into_services(self) -> CloudServices {
        let shared = Arc::new(self);
        CloudServices::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared,
        )
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.state().deny.contains(operation) {
            return Err(Error::external_error()
                .with_message(format!("mock operation {operation} denied")));
        }
        Ok(())
    }

    fn service_name(project_id: &str, region: &str, service_id: &str) -> String {
        format!("projects/{project_id}/locations/{region}/services/{service_id}")
    }
}

#[async_trait::async_trait]
impl ProjectStore for MockCloud {
    async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.check("get_project")?;
        self.state()
            .projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned()
            .ok_or_else(|| Error::not_found().with_message(format!("project {project_id}")))
    }

    async fn list_active_projects(&self) -> Result<Vec<Project>> {
        self.check("list_active_projects")?;
        Ok(self.state().projects.clone())
    }

    async fn add_bindings(&self, project_id: &str, bindings: &[Binding]) -> Result<()> {
        self.check("add_bindings")?;
        self.state()
            .project_bindings
            .entry(project_id.to_owned())
            .or_default()
            .extend_from_slice(bindings);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ServiceUsage for MockCloud {
    async fn list_enabled(&self, project_id: &str) -> Result<Vec<String>> {
        self.check("list_enabled")?;
        Ok(self
            .state()
            .enabled_services
            .get(project_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn batch_enable(&self, project_id: &str, service_ids: &[String]) -> Result<()> {
        self.check("batch_enable")?;
        self.state()
            .enabled_services
            .entry(project_id.to_owned())
            .or_default()
            .extend(service_ids.iter().cloned());
        Ok(())
    }
}

#[async_trait::async_trait]
impl SecretStore for MockCloud {
    async fn ensure_secret(&self, project_id: &str, secret_id: &str) -> Result<Secret> {
        self.check("ensure_secret")?;
        let name = names::secret_path(project_id, secret_id);
        self.state().secrets.entry(name.clone()).or_default();
        Ok(Secret { name })
    }

    async fn add_version(&self, secret_name: &str, payload: &[u8]) -> Result<()> {
        self.check("add_version")?;
        let mut state = self.state();
        let secret = state
            .secrets
            .get_mut(secret_name)
            .ok_or_else(|| Error::not_found().with_message(format!("secret {secret_name}")))?;
        secret.versions.push(payload.to_vec());
        Ok(())
    }

    async fn set_accessors(&self, secret_name: &str, members: &[String]) -> Result<()> {
        self.check("set_accessors")?;
        let mut state = self.state();
        let secret = state
            .secrets
            .get_mut(secret_name)
            .ok_or_else(|| Error::not_found().with_message(format!("secret {secret_name}")))?;
        secret.accessors = members.to_vec();
        Ok(())
    }

    async fn access_version(&self, secret_name: &str, version: Option<&str>) -> Result<Vec<u8>> {
        self.check("access_version")?;
        let state = self.state();
        let secret = state
            .secrets
            .get(secret_name)
            .ok_or_else(|| Error::not_found().with_message(format!("secret {secret_name}")))?;
        let payload = match version {
            None | Some("latest") => secret.versions.last(),
            Some(index) => index
                .parse::<usize>()
                .ok()
                .and_then(|i| secret.versions.get(i.saturating_sub(1))),
        };
        payload
            .cloned()
            .ok_or_else(|| Error::not_found().with_message("secret version"))
    }

    async fn delete_secret(&self, secret_name: &str) -> Result<()> {
        self.check("delete_secret")?;
        self.state().secrets.remove(secret_name);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockCloud {
    async fn ensure_bucket(&self, _project_id: &str, bucket: &str) -> Result<()> {
        self.check("ensure_bucket")?;
        self.state().buckets.entry(bucket.to_owned()).or_default();
        Ok(())
    }

    async fn add_viewers(&self, bucket: &str, members: &[String]) -> Result<()> {
        self.check("add_viewers")?;
        let mut state = self.state();
        let bucket = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::not_found().with_message("bucket"))?;
        bucket.viewers.extend_from_slice(members);
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<String> {
        self.check("upload")?;
        let mut state = self.state();
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::not_found().with_message("bucket"))?;
        entry.objects.insert(
            object.to_owned(),
            MockObject {
                content: content.to_vec(),
                content_type: content_type.to_owned(),
            },
        );
        Ok(format!("gs://{bucket}/{object}"))
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.check("delete_bucket")?;
        self.state().buckets.remove(bucket);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ComputeService for MockCloud {
    async fn deploy(
        &self,
        project_id: &str,
        region: &str,
        service_id: &str,
        container: &ContainerSpec,
    ) -> Result<Service> {
        self.check("deploy")?;
        let name = Self::service_name(project_id, region, service_id);
        let mut state = self.state();
        let service = state.services.entry(name.clone()).or_insert_with(|| Service {
            name: name.clone(),
            uri: format!("https://{service_id}-{project_id}.mock.run.app"),
            labels: BTreeMap::new(),
        });
        service
            .labels
            .insert(names::CREATOR_LABEL.to_owned(), names::TOOL_NAME.to_owned());
        let service = service.clone();
        state.containers.insert(name, container.clone());
        Ok(service)
    }

    async fn get_service(
        &self,
        project_id: &str,
        region: &str,
        service_id: &str,
    ) -> Result<Option<Service>> {
        self.check("get_service")?;
        let name = Self::service_name(project_id, region, service_id);
        Ok(self.state().services.get(&name).cloned())
    }

    async fn add_invoker(&self, service_name: &str, members: &[String]) -> Result<()> {
        self.check("add_invoker")?;
        self.state()
            .invokers
            .entry(service_name.to_owned())
            .or_default()
            .extend_from_slice(members);
        Ok(())
    }

    async fn delete_service(
        &self,
        project_id: &str,
        region: &str,
        service_id: &str,
    ) -> Result<()> {
        self.check("delete_service")?;
        let name = Self::service_name(project_id, region, service_id);
        let mut state = self.state();
        state.services.remove(&name);
        state.containers.remove(&name);
        state.invokers.remove(&name);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Messaging for MockCloud {
    async fn ensure_topic(&self, project_id: &str, topic_id: &str) -> Result<()> {
        self.check("ensure_topic")?;
        self.state()
            .topics
            .entry(project_id.to_owned())
            .or_default()
            .insert(topic_id.to_owned());
        Ok(())
    }

    async fn ensure_push_subscription(
        &self,
        project_id: &str,
        subscription_id: &str,
        topic_id: &str,
        push: &PushConfig,
    ) -> Result<()> {
        self.check("ensure_push_subscription")?;
        let key = format!("{project_id}/{subscription_id}");
        self.state()
            .subscriptions
            .entry(key)
            .or_insert_with(|| MockSubscription {
                topic_id: topic_id.to_owned(),
                push: push.clone(),
            });
        Ok(())
    }

    async fn delete_subscription(&self, project_id: &str, subscription_id: &str) -> Result<()> {
        self.check("delete_subscription")?;
        let key = format!("{project_id}/{subscription_id}");
        match self.state().subscriptions.remove(&key) {
            Some(_) => Ok(()),
            None => {
                Err(Error::not_found().with_message(format!("subscription {subscription_id}")))
            }
        }
    }

    async fn delete_topic(&self, project_id: &str, topic_id: &str) -> Result<()> {
        self.check("delete_topic")?;
        let removed = self
            .state()
            .topics
            .get_mut(project_id)
            .is_some_and(|topics| topics.remove(topic_id));
        if removed {
            Ok(())
        } else {
            Err(Error::not_found().with_message(format!("topic {topic_id}")))
        }
    }
}

#[async_trait::async_trait]
impl IdentityStore for MockCloud {
    async fn ensure_service_account(
        &self,
        project_id: &str,
        account_id: &str,
        _display_name: &str,
    ) -> Result<()> {
        self.check("ensure_service_account")?;
        self.state()
            .service_accounts
            .entry(project_id.to_owned())
            .or_default()
            .insert(account_id.to_owned());
        Ok(())
    }

    async fn delete_service_account(&self, project_id: &str, account_id: &str) -> Result<()> {
        self.check("delete_service_account")?;
        if let Some(accounts) = self.state().service_accounts.get_mut(project_id) {
            accounts.remove(account_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deny_and_allow() {
        let mock = MockCloud::new().with_project("demo", "123");
        mock.deny("get_project");
        assert!(mock.get_project("demo").await.is_err());

        mock.allow("get_project");
        let project = mock.get_project("demo").await.unwrap();
        assert_eq!(project.number().unwrap(), "123");
    }

    #[tokio::test]
    async fn test_messaging_delete_requires_existence() {
        let mock = MockCloud::new();
        let error = mock.delete_topic("demo", "cloud-builds").await.unwrap_err();
        assert_eq!(error.kind, crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_secret_versions_and_accessors() {
        let mock = MockCloud::new();
        let secret = mock.ensure_secret("demo", "s").await.unwrap();
        mock.add_version(&secret.name, b"one").await.unwrap();
        mock.add_version(&secret.name, b"two").await.unwrap();
        mock.set_accessors(&secret.name, &["serviceAccount:a".to_owned()])
            .await
            .unwrap();
        mock.set_accessors(&secret.name, &["serviceAccount:b".to_owned()])
            .await
            .unwrap();

        let latest = mock.access_version(&secret.name, None).await.unwrap();
        assert_eq!(latest, b"two");

        let state = mock.state();
        let stored = state.secrets.get(&secret.name).unwrap();
        // Accessor policy is replaced, not merged.
        assert_eq!(stored.accessors, vec!["serviceAccount:b".to_owned()]);
    }
}

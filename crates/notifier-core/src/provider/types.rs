//! Request/response types shared by the provider ports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A cloud project as returned by the resource manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Full resource name, e.g. `projects/123456789`.
    pub name: String,
    /// Project id, e.g. `demo`.
    pub project_id: String,
    /// Human-readable display name.
    pub display_name: String,
}

impl Project {
    /// Project number, parsed as the second path segment of the resource name.
    ///
    /// # Errors
    ///
    /// Returns an error when the resource name is not of the
    /// `projects/{number}` shape.
    pub fn number(&self) -> Result<&str> {
        self.name
            .split('/')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| {
                Error::external_error()
                    .with_message(format!("malformed project resource name: {}", self.name))
            })
    }
}

/// A single role-to-members IAM binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Role to grant, e.g. `roles/run.invoker`.
    pub role: String,
    /// Member strings, e.g. `serviceAccount:…`.
    pub members: Vec<String>,
}

impl Binding {
    /// Creates a binding of one role to the given members.
    pub fn new(role: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            role: role.into(),
            members,
        }
    }
}

/// A secret resource reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Full resource name, e.g. `projects/demo/secrets/foo`.
    pub name: String,
}

/// An environment variable passed to the deployed container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
}

impl EnvVar {
    /// Creates a new environment variable.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Container image and environment for a service deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Container image reference.
    pub image: String,
    /// Environment variables.
    pub env: Vec<EnvVar>,
}

/// A deployed managed container service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Full resource name, e.g. `projects/demo/locations/us-east1/services/foo`.
    pub name: String,
    /// Public HTTPS endpoint of the service.
    pub uri: String,
    /// Labels attached to the service.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Service {
    /// Value of a label, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Push delivery configuration for a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConfig {
    /// HTTPS endpoint push deliveries are sent to.
    pub push_endpoint: String,
    /// Service account email named in the OIDC identity token.
    pub oidc_service_account: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_number() {
        let project = Project {
            name: "projects/123456789".to_owned(),
            project_id: "demo".to_owned(),
            display_name: "Demo".to_owned(),
        };
        assert_eq!(project.number().unwrap(), "123456789");
    }

    #[test]
    fn test_project_number_malformed() {
        let project = Project {
            name: "projects".to_owned(),
            project_id: "demo".to_owned(),
            display_name: "Demo".to_owned(),
        };
        assert!(project.number().is_err());
    }

    #[test]
    fn test_service_label() {
        let mut labels = BTreeMap::new();
        labels.insert("creator".to_owned(), "cloud-build-notifier".to_owned());
        let service = Service {
            name: "projects/demo/locations/us-east1/services/n".to_owned(),
            uri: "https://n-xyz.a.run.app".to_owned(),
            labels,
        };
        assert_eq!(service.label("creator"), Some("cloud-build-notifier"));
        assert_eq!(service.label("missing"), None);
    }
}

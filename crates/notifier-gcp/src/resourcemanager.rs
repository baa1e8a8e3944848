//! Resource Manager adapter: project lookup and project-level IAM.

use notifier_core::provider::{Binding, Project, ProjectStore};
use notifier_core::Result;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::GcpClient;

const BASE: &str = "https://cloudresourcemanager.googleapis.com/v3";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProject {
    name: String,
    project_id: String,
    #[serde(default)]
    display_name: String,
}

impl From<ApiProject> for Project {
    fn from(project: ApiProject) -> Self {
        Self {
            name: project.name,
            project_id: project.project_id,
            display_name: project.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    projects: Vec<ApiProject>,
}

/// Adapter over the Resource Manager v3 REST API.
#[derive(Debug, Clone)]
pub struct ResourceManagerAdapter {
    client: GcpClient,
}

impl ResourceManagerAdapter {
    /// Creates a new adapter.
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ProjectStore for ResourceManagerAdapter {
    async fn get_project(&self, project_id: &str) -> Result<Project> {
        let project: ApiProject = self
            .client
            .get(&format!("{BASE}/projects/{project_id}"))
            .await
            .map_err(crate::Error::into_core)?;
        Ok(project.into())
    }

    async fn list_active_projects(&self) -> Result<Vec<Project>> {
        let response: SearchResponse = self
            .client
            .get(&format!("{BASE}/projects:search?query=state:ACTIVE&pageSize=200"))
            .await
            .map_err(crate::Error::into_core)?;
        Ok(response.projects.into_iter().map(Project::from).collect())
    }

    async fn add_bindings(&self, project_id: &str, bindings: &[Binding]) -> Result<()> {
        let resource = format!("{BASE}/projects/{project_id}");
        let mut policy = self
            .client
            .post(
                &format!("{resource}:getIamPolicy"),
                &json!({ "options": { "requestedPolicyVersion": 3 } }),
            )
            .await
            .map_err(crate::Error::into_core)?;

        let appended: Vec<Value> = bindings
            .iter()
            .map(|binding| json!({ "role": binding.role, "members": binding.members }))
            .collect();
        match policy.get_mut("bindings").and_then(Value::as_array_mut) {
            Some(existing) => existing.extend(appended),
            None => {
                policy["bindings"] = Value::Array(appended);
            }
        }

        self.client
            .post(&format!("{resource}:setIamPolicy"), &json!({ "policy": policy }))
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }
}

//! Cloud Storage adapter.

use notifier_core::provider::ObjectStore;
use notifier_core::{Result, names};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{GcpClient, TRACING_TARGET};

const BASE: &str = "https://storage.googleapis.com/storage/v1";
const UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1";

/// Object names go into the URL path, so reserved characters (notably `/`)
/// must be percent-encoded.
fn encode_object(object: &str) -> String {
    utf8_percent_encode(object, NON_ALPHANUMERIC).to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectItem {
    name: String,
}

/// Adapter over the Cloud Storage JSON API.
#[derive(Debug, Clone)]
pub struct CloudStorageAdapter {
    client: GcpClient,
}

impl CloudStorageAdapter {
    /// Creates a new adapter.
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, crate::Error> {
        let mut objects = Vec::new();
        let mut page_token = String::new();

        loop {
            let url = format!("{BASE}/b/{bucket}/o?pageToken={page_token}");
            let page: ObjectList = self.client.get(&url).await?;
            objects.extend(page.items.into_iter().map(|item| item.name));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = token,
                _ => return Ok(objects),
            }
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for CloudStorageAdapter {
    async fn ensure_bucket(&self, project_id: &str, bucket: &str) -> Result<()> {
        let result = self
            .client
            .post(
                &format!("{BASE}/b?project={project_id}"),
                &json!({ "name": bucket }),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if error.is_already_exists() => {
                info!(target: TRACING_TARGET, bucket = %bucket, "Bucket already exists");
                Ok(())
            }
            Err(error) => Err(error.into_core()),
        }
    }

    async fn add_viewers(&self, bucket: &str, members: &[String]) -> Result<()> {
        let iam_url = format!("{BASE}/b/{bucket}/iam");
        let mut policy: Value = self
            .client
            .get(&iam_url)
            .await
            .map_err(crate::Error::into_core)?;

        let binding = json!({ "role": names::ROLE_OBJECT_VIEWER, "members": members });
        match policy.get_mut("bindings").and_then(Value::as_array_mut) {
            Some(bindings) => bindings.push(binding),
            None => {
                policy["bindings"] = Value::Array(vec![binding]);
            }
        }

        self.client
            .put(&iam_url, &policy)
            .await
            .map_err(crate::Error::into_core)?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<String> {
        let url = format!(
            "{UPLOAD_BASE}/b/{bucket}/o?uploadType=media&name={}",
            encode_object(object)
        );
        self.client
            .post_bytes(&url, content, content_type)
            .await
            .map_err(crate::Error::into_core)?;
        Ok(format!("gs://{bucket}/{object}"))
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let objects = match self.list_objects(bucket).await {
            Ok(objects) => objects,
            Err(error) if error.is_not_found() => {
                info!(target: TRACING_TARGET, bucket = %bucket, "Bucket already absent");
                return Ok(());
            }
            Err(error) => return Err(error.into_core()),
        };

        for object in objects {
            self.client
                .delete(&format!("{BASE}/b/{bucket}/o/{}", encode_object(&object)))
                .await
                .map_err(crate::Error::into_core)?;
        }

        match self.client.delete(&format!("{BASE}/b/{bucket}")).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_not_found() => Ok(()),
            Err(error) => Err(error.into_core()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_names_are_path_encoded() {
        assert_eq!(encode_object("nested/notifier1-config.yaml"),
            "nested%2Fnotifier1%2Dconfig%2Eyaml");
        assert_eq!(encode_object("plain"), "plain");
    }
}

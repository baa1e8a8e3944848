#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod auth;
mod client;
mod error;

mod iam;
mod pubsub;
mod resourcemanager;
mod run;
mod secretmanager;
mod serviceusage;
mod storage;

use std::path::Path;
use std::sync::Arc;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::{GcpClient, GcpConfig};
pub use error::{Error, Result};
pub use iam::IamAdapter;
pub use pubsub::PubSubAdapter;
pub use resourcemanager::ResourceManagerAdapter;
pub use run::CloudRunAdapter;
pub use secretmanager::SecretManagerAdapter;
pub use serviceusage::ServiceUsageAdapter;
pub use storage::CloudStorageAdapter;

use notifier_core::CloudServices;

/// Tracing target for GCP API calls.
pub const TRACING_TARGET: &str = "notifier_gcp::api";

/// Tracing target for authentication.
pub const TRACING_TARGET_AUTH: &str = "notifier_gcp::auth";

/// Builds a [`CloudServices`] container with one REST adapter per port,
/// authenticated from the given service account key file.
///
/// # Errors
///
/// Returns a configuration error when the key file is missing or malformed.
pub async fn cloud_services(
    key_file: &Path,
    config: GcpConfig,
) -> notifier_core::Result<CloudServices> {
    let auth = TokenProvider::from_key_file(key_file).await.map_err(Error::into_core)?;
    let client = GcpClient::new(auth, config);

    Ok(CloudServices::new(
        Arc::new(ResourceManagerAdapter::new(client.clone())),
        Arc::new(ServiceUsageAdapter::new(client.clone())),
        Arc::new(SecretManagerAdapter::new(client.clone())),
        Arc::new(CloudStorageAdapter::new(client.clone())),
        Arc::new(CloudRunAdapter::new(client.clone())),
        Arc::new(PubSubAdapter::new(client.clone())),
        Arc::new(IamAdapter::new(client)),
    ))
}

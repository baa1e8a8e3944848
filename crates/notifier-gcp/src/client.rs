//! Shared authenticated HTTP client for the REST adapters.

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result, TRACING_TARGET, TokenProvider};

/// Default timeout for API requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default interval between long-running-operation polls: 2 seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Configuration for the GCP HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct GcpConfig {
    /// API request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "api-timeout", env = "GCP_API_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub api_timeout: u64,

    /// Interval between long-running-operation polls in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "poll-interval", env = "GCP_POLL_INTERVAL", default_value = "2")
    )]
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(feature = "config", arg(long = "api-user-agent", env = "GCP_USER_AGENT"))]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            api_timeout: default_timeout_secs(),
            poll_interval: default_poll_interval_secs(),
            user_agent: None,
        }
    }
}

impl GcpConfig {
    /// Returns the request timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.api_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.api_timeout)
        }
    }

    /// Returns the poll interval, using the default if zero.
    pub fn effective_poll_interval(&self) -> Duration {
        if self.poll_interval == 0 {
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        } else {
            Duration::from_secs(self.poll_interval)
        }
    }

    /// Returns the effective user agent, using the default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("cloud-build-notifier/{}", env!("CARGO_PKG_VERSION")))
    }
}

struct GcpClientInner {
    http: reqwest::Client,
    auth: TokenProvider,
    config: GcpConfig,
}

/// Authenticated JSON client shared by all adapters.
#[derive(Clone)]
pub struct GcpClient {
    inner: Arc<GcpClientInner>,
}

impl std::fmt::Debug for GcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl GcpClient {
    /// Creates a new client with the given token provider and configuration.
    pub fn new(auth: TokenProvider, config: GcpConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.effective_user_agent())
            .build()
            .expect("failed to create HTTP client");

        Self {
            inner: Arc::new(GcpClientInner { http, auth, config }),
        }
    }

    /// Issues a GET returning the decoded response body.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self.request(Method::GET, url, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issues a GET, returning `None` on a 404.
    pub async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        match self.request(Method::GET, url, None).await {
            Ok(value) => Ok(Some(serde_json::from_value(value)?)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Issues a POST with a JSON body.
    pub async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, url, Some(body)).await
    }

    /// Issues a PUT with a JSON body.
    pub async fn put(&self, url: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, url, Some(body)).await
    }

    /// Issues a PATCH with a JSON body.
    pub async fn patch(&self, url: &str, body: &Value) -> Result<Value> {
        self.request(Method::PATCH, url, Some(body)).await
    }

    /// Issues a DELETE.
    pub async fn delete(&self, url: &str) -> Result<Value> {
        self.request(Method::DELETE, url, None).await
    }

    /// Uploads raw bytes with the given content type.
    pub async fn post_bytes(
        &self,
        url: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<Value> {
        let token = self.inner.auth.token().await?;
        let response = self
            .inner
            .http
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content.to_vec())
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Polls a long-running operation until it completes.
    ///
    /// `operation` is the response of the call that started the operation;
    /// `root` is the API base the operation name is resolved against, e.g.
    /// `https://run.googleapis.com/v2`.
    ///
    /// # Errors
    ///
    /// Returns an operation error when the operation reports a failure.
    pub async fn await_operation(&self, root: &str, operation: Value) -> Result<Value> {
        let name = operation
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Operation("operation response carries no name".to_owned()))?
            .to_owned();

        let mut current = operation;
        loop {
            if current.get("done").and_then(Value::as_bool).unwrap_or(false) {
                if let Some(error) = current.get("error") {
                    return Err(Error::Operation(error.to_string()));
                }
                return Ok(current.get("response").cloned().unwrap_or(Value::Null));
            }

            tokio::time::sleep(self.inner.config.effective_poll_interval()).await;

            tracing::debug!(target: TRACING_TARGET, operation = %name, "Polling operation");
            current = self.request(Method::GET, &format!("{root}/{name}"), None).await?;
        }
    }

    async fn request(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Value> {
        tracing::debug!(target: TRACING_TARGET, %method, url, "API request");

        let token = self.inner.auth.token().await?;
        let mut request = self.inner.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        Self::decode(request.send().await?).await
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| status.to_string());

        Err(Error::status(status.as_u16(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GcpConfig::default();
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert_eq!(config.effective_poll_interval(), Duration::from_secs(2));
        assert!(config.effective_user_agent().contains("cloud-build-notifier"));
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let config = GcpConfig {
            api_timeout: 0,
            poll_interval: 0,
            user_agent: None,
        };
        assert_eq!(config.effective_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(
            config.effective_poll_interval(),
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        );
    }
}

//! Command options and their validation.
//!
//! Options arrive partially populated (from flags or prompts). Validation is
//! exhaustive rather than fail-fast: every missing or malformed field is
//! reported, and a fully populated config is only produced when all required
//! fields are present.

use std::path::PathBuf;
use std::sync::OnceLock;

#[cfg(feature = "config")]
use clap::Args;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default notifier name.
pub const DEFAULT_NAME: &str = "cloud-build-notifier";

/// Default deployment region.
pub const DEFAULT_REGION: &str = "us-east1";

/// Default notifier container image.
pub const DEFAULT_IMAGE: &str =
    "us-east1-docker.pkg.dev/gcb-release/cloud-build-notifiers/slack:latest";

/// Options accepted by the `setup` command.
///
/// Required fields are optional here because interactive mode collects them
/// via prompts; [`SetupOptions::validate`] enforces presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SetupOptions {
    /// The id of your GCP project
    #[cfg_attr(feature = "config", arg(short = 'p', long = "project-id"))]
    pub project_id: Option<String>,

    /// The Slack Incoming Webhook url to post messages
    #[cfg_attr(feature = "config", arg(long = "slack-webhook-url"))]
    pub slack_webhook_url: Option<String>,

    /// The name of the GitHub user/organization owning the built repositories
    #[cfg_attr(feature = "config", arg(long = "github-user-name"))]
    pub github_user_name: Option<String>,

    /// The name of the notifier
    #[cfg_attr(feature = "config", arg(short = 'n', long, default_value = DEFAULT_NAME))]
    #[serde(default = "default_name")]
    pub name: String,

    /// The region to deploy the notifier to
    #[cfg_attr(feature = "config", arg(short = 'r', long, default_value = DEFAULT_REGION))]
    #[serde(default = "default_region")]
    pub region: String,

    /// The path to your GCP service account key file
    #[cfg_attr(
        feature = "config",
        arg(long = "service-account-key", env = "GOOGLE_APPLICATION_CREDENTIALS")
    )]
    pub service_account_key: Option<PathBuf>,

    /// The container image to use for the notifier
    #[cfg_attr(feature = "config", arg(long = "notifier-image", default_value = DEFAULT_IMAGE))]
    #[serde(default = "default_image")]
    pub notifier_image: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_owned()
}

fn default_region() -> String {
    DEFAULT_REGION.to_owned()
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_owned()
}

/// Fully validated input of the setup workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    /// Target project id.
    pub project_id: String,
    /// Slack Incoming Webhook URL stored in the secret.
    pub slack_webhook_url: String,
    /// GitHub user/organization embedded into commit links.
    pub github_user_name: String,
    /// Notifier name all derived resource names stem from.
    pub name: String,
    /// Deployment region.
    pub region: String,
    /// Notifier container image.
    pub notifier_image: String,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The flag the field is populated from.
    pub flag: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "option \"{}\": {}", self.flag, self.reason)
    }
}

impl SetupOptions {
    /// Validates all required fields, reporting every failure.
    ///
    /// # Errors
    ///
    /// Returns one [`ValidationError`] per missing or malformed field.
    pub fn validate(&self) -> Result<SetupConfig, Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.project_id.as_deref().is_none_or(str::is_empty) {
            errors.push(ValidationError {
                flag: "--project-id",
                reason: "required option not specified".to_owned(),
            });
        }

        match self.slack_webhook_url.as_deref() {
            None | Some("") => errors.push(ValidationError {
                flag: "--slack-webhook-url",
                reason: "required option not specified".to_owned(),
            }),
            Some(url) if !is_slack_webhook_url(url) => errors.push(ValidationError {
                flag: "--slack-webhook-url",
                reason: "Slack webhook url is invalid".to_owned(),
            }),
            Some(_) => {}
        }

        if self.github_user_name.as_deref().is_none_or(str::is_empty) {
            errors.push(ValidationError {
                flag: "--github-user-name",
                reason: "required option not specified".to_owned(),
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SetupConfig {
            project_id: self.project_id.clone().unwrap_or_default(),
            slack_webhook_url: self.slack_webhook_url.clone().unwrap_or_default(),
            github_user_name: self.github_user_name.clone().unwrap_or_default(),
            name: self.name.clone(),
            region: self.region.clone(),
            notifier_image: self.notifier_image.clone(),
        })
    }
}

/// Options accepted by the `cleanup` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct CleanupOptions {
    /// The id of your GCP project
    #[cfg_attr(feature = "config", arg(short = 'p', long = "project-id"))]
    pub project_id: String,

    /// The name of the notifier to remove
    #[cfg_attr(feature = "config", arg(short = 'n', long))]
    pub name: String,

    /// The region the notifier was deployed to
    #[cfg_attr(feature = "config", arg(short = 'r', long, default_value = DEFAULT_REGION))]
    #[serde(default = "default_region")]
    pub region: String,

    /// The path to your GCP service account key file
    #[cfg_attr(
        feature = "config",
        arg(long = "service-account-key", env = "GOOGLE_APPLICATION_CREDENTIALS")
    )]
    pub service_account_key: Option<PathBuf>,
}

/// Checks a URL against the Slack Incoming Webhook shape:
/// `https://hooks.slack.com/services/<TEAM>/<BOT>/<TOKEN>` with an
/// uppercase `T` team prefix and `B` bot prefix.
pub fn is_slack_webhook_url(url: &str) -> bool {
    static WEBHOOK_RE: OnceLock<Regex> = OnceLock::new();
    let re = WEBHOOK_RE.get_or_init(|| {
        Regex::new(r"^https://hooks\.slack\.com/services/T[A-Z0-9]+/B[A-Z0-9]+/[A-Za-z0-9]+$")
            .expect("webhook pattern is valid")
    });
    re.is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_options() -> SetupOptions {
        SetupOptions {
            project_id: Some("demo".to_owned()),
            slack_webhook_url: Some(
                "https://hooks.slack.com/services/T000/B000/abc123".to_owned(),
            ),
            github_user_name: Some("alice".to_owned()),
            name: DEFAULT_NAME.to_owned(),
            region: DEFAULT_REGION.to_owned(),
            service_account_key: None,
            notifier_image: DEFAULT_IMAGE.to_owned(),
        }
    }

    #[test]
    fn test_webhook_url_accepts_valid() {
        assert!(is_slack_webhook_url(
            "https://hooks.slack.com/services/T000/B000/abc123"
        ));
    }

    #[test]
    fn test_webhook_url_rejects_lowercase_team() {
        assert!(!is_slack_webhook_url(
            "https://hooks.slack.com/services/x000/B000/abc123"
        ));
    }

    #[test]
    fn test_webhook_url_rejects_empty() {
        assert!(!is_slack_webhook_url(""));
    }

    #[test]
    fn test_webhook_url_rejects_other_hosts() {
        assert!(!is_slack_webhook_url(
            "https://hooks.example.com/services/T000/B000/abc123"
        ));
    }

    #[test]
    fn test_validate_complete_options() {
        let config = complete_options().validate().expect("options are valid");
        assert_eq!(config.project_id, "demo");
        assert_eq!(config.github_user_name, "alice");
        assert_eq!(config.name, DEFAULT_NAME);
    }

    #[test]
    fn test_validate_is_exhaustive() {
        let errors = SetupOptions::default().validate().unwrap_err();
        let flags: Vec<_> = errors.iter().map(|e| e.flag).collect();
        assert_eq!(
            flags,
            vec!["--project-id", "--slack-webhook-url", "--github-user-name"]
        );
    }

    #[test]
    fn test_validate_reports_malformed_webhook() {
        let mut options = complete_options();
        options.slack_webhook_url = Some("https://example.com".to_owned());
        let errors = options.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].flag, "--slack-webhook-url");
        assert!(errors[0].reason.contains("invalid"));
    }
}

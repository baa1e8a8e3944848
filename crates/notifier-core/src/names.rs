//! Deterministic resource naming shared by the setup and cleanup workflows.
//!
//! Every resource this tool provisions is addressed by a name derived from
//! the project id and the notifier name. Cleanup recomputes the same names,
//! so the formulas here are the single source of truth for both workflows.

/// Identifier of this tool, used as the value of the ownership label.
pub const TOOL_NAME: &str = "cloud-build-notifier";

/// Label key attached to the deployed service to mark its creator.
pub const CREATOR_LABEL: &str = "creator";

/// Topic Cloud Build publishes build status messages to.
pub const BUILD_TOPIC: &str = "cloud-builds";

/// Account id of the dedicated Pub/Sub push invoker service account.
pub const INVOKER_SA_ID: &str = "cloud-run-pubsub-invoker";

/// APIs that must be enabled on the target project before provisioning.
pub const REQUIRED_SERVICES: [&str; 5] = [
    "cloudbuild.googleapis.com",
    "run.googleapis.com",
    "pubsub.googleapis.com",
    "secretmanager.googleapis.com",
    "cloudresourcemanager.googleapis.com",
];

/// IAM role granting read access to secret versions.
pub const ROLE_SECRET_ACCESSOR: &str = "roles/secretmanager.secretAccessor";

/// IAM role granting read access to bucket objects.
pub const ROLE_OBJECT_VIEWER: &str = "roles/storage.objectViewer";

/// IAM role allowing invocation of a Cloud Run service.
pub const ROLE_RUN_INVOKER: &str = "roles/run.invoker";

/// IAM role allowing creation of identity tokens for push deliveries.
pub const ROLE_TOKEN_CREATOR: &str = "roles/iam.serviceAccountTokenCreator";

/// Name of the bucket holding the rendered notifier config artifacts.
pub fn bucket_name(project_id: &str, notifier_name: &str) -> String {
    format!("{project_id}-{notifier_name}-config")
}

/// Id of the secret holding the Slack webhook URL.
pub fn secret_id(notifier_name: &str) -> String {
    format!("{notifier_name}-slack-webhook")
}

/// Id of the push subscription delivering build messages to the notifier.
pub fn subscription_id(notifier_name: &str) -> String {
    format!("{notifier_name}-subscription")
}

/// Object name of the rendered Slack message template.
pub fn template_object(notifier_name: &str) -> String {
    format!("{notifier_name}-template.json")
}

/// Object name of the rendered notifier config.
pub fn config_object(notifier_name: &str) -> String {
    format!("{notifier_name}-config.yaml")
}

/// Full resource path of a secret.
pub fn secret_path(project_id: &str, secret_id: &str) -> String {
    format!("projects/{project_id}/secrets/{secret_id}")
}

/// Full resource path of the latest version of the webhook secret.
pub fn secret_version_path(project_id: &str, secret_id: &str) -> String {
    format!("projects/{project_id}/secrets/{secret_id}/versions/latest")
}

/// Email of the Compute Engine default service account.
pub fn compute_default_sa(project_number: &str) -> String {
    format!("{project_number}-compute@developer.gserviceaccount.com")
}

/// Email of the Pub/Sub service agent for the project.
pub fn pubsub_service_agent(project_number: &str) -> String {
    format!("service-{project_number}@gcp-sa-pubsub.iam.gserviceaccount.com")
}

/// Email of the dedicated invoker service account.
pub fn invoker_sa_email(project_id: &str) -> String {
    format!("{INVOKER_SA_ID}@{project_id}.iam.gserviceaccount.com")
}

/// IAM member string for a service account email.
pub fn service_account_member(email: &str) -> String {
    format!("serviceAccount:{email}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names_are_deterministic() {
        assert_eq!(bucket_name("demo", "notifier1"), "demo-notifier1-config");
        assert_eq!(secret_id("notifier1"), "notifier1-slack-webhook");
        assert_eq!(subscription_id("notifier1"), "notifier1-subscription");
        assert_eq!(template_object("notifier1"), "notifier1-template.json");
        assert_eq!(config_object("notifier1"), "notifier1-config.yaml");
    }

    #[test]
    fn test_secret_version_path() {
        assert_eq!(
            secret_version_path("demo", "notifier1-slack-webhook"),
            "projects/demo/secrets/notifier1-slack-webhook/versions/latest"
        );
    }

    #[test]
    fn test_principals() {
        assert_eq!(
            compute_default_sa("12345"),
            "12345-compute@developer.gserviceaccount.com"
        );
        assert_eq!(
            pubsub_service_agent("12345"),
            "service-12345@gcp-sa-pubsub.iam.gserviceaccount.com"
        );
        assert_eq!(
            invoker_sa_email("demo"),
            "cloud-run-pubsub-invoker@demo.iam.gserviceaccount.com"
        );
        assert_eq!(
            service_account_member("a@b.iam.gserviceaccount.com"),
            "serviceAccount:a@b.iam.gserviceaccount.com"
        );
    }
}

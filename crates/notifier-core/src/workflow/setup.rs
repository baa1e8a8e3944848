//! The setup workflow: ordered, idempotent provisioning steps.

use tracing::info;

use super::{FailurePolicy, WorkflowReport};
use crate::options::SetupConfig;
use crate::provider::{Binding, CloudServices, ContainerSpec, EnvVar, PushConfig, Service};
use crate::{Result, TRACING_TARGET_SETUP, names, template};

const STEP_RESOLVE_PROJECT: &str = "resolve-project";
const STEP_ENABLE_APIS: &str = "enable-apis";
const STEP_STORE_SECRET: &str = "store-webhook-secret";
const STEP_UPLOAD_CONFIG: &str = "upload-notifier-config";
const STEP_DEPLOY: &str = "deploy-notifier";
const STEP_GRANT_IAM: &str = "grant-iam";
const STEP_CREATE_PUBSUB: &str = "create-pubsub";

/// Runs the setup workflow against the given provider ports.
///
/// Returns a report of per-step outcomes; the caller decides how to surface
/// recorded failures. Under [`FailurePolicy::Strict`] the first failure ends
/// the run.
pub async fn run_setup(
    services: &CloudServices,
    config: &SetupConfig,
    policy: FailurePolicy,
) -> WorkflowReport {
    let mut report = WorkflowReport::new("setup");

    // Step 1: resolve the project number.
    info!(target: TRACING_TARGET_SETUP, project_id = %config.project_id, "Resolving project...");
    let project_number = match resolve_project_number(services, config).await {
        Ok(number) => {
            report.completed(STEP_RESOLVE_PROJECT);
            Some(number)
        }
        Err(error) => {
            report.failed(STEP_RESOLVE_PROJECT, error);
            if policy.is_strict() {
                return report;
            }
            None
        }
    };

    // Step 2: enable required APIs.
    info!(target: TRACING_TARGET_SETUP, "Enabling required APIs...");
    match enable_required_apis(services, config).await {
        Ok(()) => report.completed(STEP_ENABLE_APIS),
        Err(error) => {
            report.failed(STEP_ENABLE_APIS, error);
            if policy.is_strict() {
                return report;
            }
        }
    }

    // Step 3: store the Slack webhook URL in a secret.
    info!(target: TRACING_TARGET_SETUP, "Storing Slack webhook in secret store...");
    match &project_number {
        Some(number) => match store_webhook_secret(services, config, number).await {
            Ok(()) => report.completed(STEP_STORE_SECRET),
            Err(error) => {
                report.failed(STEP_STORE_SECRET, error);
                if policy.is_strict() {
                    return report;
                }
            }
        },
        None => report.skipped(STEP_STORE_SECRET, "project number unavailable"),
    }

    // Step 4: render and upload the notifier config artifacts.
    info!(target: TRACING_TARGET_SETUP, "Uploading notifier config...");
    let config_uri = match &project_number {
        Some(number) => match upload_notifier_config(services, config, number).await {
            Ok(uri) => {
                report.completed(STEP_UPLOAD_CONFIG);
                Some(uri)
            }
            Err(error) => {
                report.failed(STEP_UPLOAD_CONFIG, error);
                if policy.is_strict() {
                    return report;
                }
                None
            }
        },
        None => {
            report.skipped(STEP_UPLOAD_CONFIG, "project number unavailable");
            None
        }
    };

    // Step 5: deploy the notifier service.
    info!(target: TRACING_TARGET_SETUP, "Deploying notifier service...");
    let service = match &config_uri {
        Some(uri) => match deploy_notifier(services, config, uri).await {
            Ok(service) => {
                report.completed(STEP_DEPLOY);
                Some(service)
            }
            Err(error) => {
                report.failed(STEP_DEPLOY, error);
                if policy.is_strict() {
                    return report;
                }
                None
            }
        },
        None => {
            report.skipped(STEP_DEPLOY, "config uri unavailable");
            None
        }
    };

    // Step 6: create the invoker identity and grant role bindings.
    info!(target: TRACING_TARGET_SETUP, "Setting up IAM...");
    match (&service, &project_number) {
        (Some(service), Some(number)) => {
            match grant_permissions(services, config, service, number).await {
                Ok(()) => report.completed(STEP_GRANT_IAM),
                Err(error) => {
                    report.failed(STEP_GRANT_IAM, error);
                    if policy.is_strict() {
                        return report;
                    }
                }
            }
        }
        _ => report.skipped(STEP_GRANT_IAM, "deployed service unavailable"),
    }

    // Step 7: create the topic and push subscription.
    info!(target: TRACING_TARGET_SETUP, "Creating topic and push subscription...");
    match &service {
        Some(service) => match create_pubsub(services, config, service).await {
            Ok(()) => report.completed(STEP_CREATE_PUBSUB),
            Err(error) => {
                report.failed(STEP_CREATE_PUBSUB, error);
                if policy.is_strict() {
                    return report;
                }
            }
        },
        None => report.skipped(STEP_CREATE_PUBSUB, "deployed service unavailable"),
    }

    if report.is_success() {
        info!(target: TRACING_TARGET_SETUP, "** NOTIFIER SETUP COMPLETE **");
    }
    report
}

async fn resolve_project_number(services: &CloudServices, config: &SetupConfig) -> Result<String> {
    let project = services.projects.get_project(&config.project_id).await?;
    let number = project.number()?.to_owned();
    info!(
        target: TRACING_TARGET_SETUP,
        project_id = %project.project_id,
        project_number = %number,
        "Resolved project"
    );
    Ok(number)
}

async fn enable_required_apis(services: &CloudServices, config: &SetupConfig) -> Result<()> {
    let enabled = services.service_usage.list_enabled(&config.project_id).await?;
    let missing: Vec<String> = names::REQUIRED_SERVICES
        .iter()
        .filter(|required| !enabled.iter().any(|s| s == *required))
        .map(|s| (*s).to_owned())
        .collect();

    if missing.is_empty() {
        info!(target: TRACING_TARGET_SETUP, "All required APIs are already enabled");
        return Ok(());
    }

    info!(
        target: TRACING_TARGET_SETUP,
        services = ?missing,
        "Enabling missing APIs"
    );
    services
        .service_usage
        .batch_enable(&config.project_id, &missing)
        .await
}

async fn store_webhook_secret(
    services: &CloudServices,
    config: &SetupConfig,
    project_number: &str,
) -> Result<()> {
    let secret_id = names::secret_id(&config.name);
    let secret = services
        .secrets
        .ensure_secret(&config.project_id, &secret_id)
        .await?;
    services
        .secrets
        .add_version(&secret.name, config.slack_webhook_url.as_bytes())
        .await?;

    let accessor =
        names::service_account_member(&names::compute_default_sa(project_number));
    services
        .secrets
        .set_accessors(&secret.name, &[accessor])
        .await
}

async fn upload_notifier_config(
    services: &CloudServices,
    config: &SetupConfig,
    project_number: &str,
) -> Result<String> {
    let bucket = names::bucket_name(&config.project_id, &config.name);
    services
        .objects
        .ensure_bucket(&config.project_id, &bucket)
        .await?;

    let viewer = names::service_account_member(&names::compute_default_sa(project_number));
    services.objects.add_viewers(&bucket, &[viewer]).await?;

    let message = template::render_message(&config.github_user_name)?;
    let template_uri = services
        .objects
        .upload(
            &bucket,
            &names::template_object(&config.name),
            message.as_bytes(),
            "application/json",
        )
        .await?;

    let secret_id = names::secret_id(&config.name);
    let rendered =
        template::render_config(&config.name, &secret_id, &config.project_id, &template_uri)?;
    services
        .objects
        .upload(
            &bucket,
            &names::config_object(&config.name),
            rendered.as_bytes(),
            "application/x-yaml",
        )
        .await
}

async fn deploy_notifier(
    services: &CloudServices,
    config: &SetupConfig,
    config_uri: &str,
) -> Result<Service> {
    let container = ContainerSpec {
        image: config.notifier_image.clone(),
        env: vec![
            EnvVar::new("CONFIG_PATH", config_uri),
            EnvVar::new("PROJECT_ID", &config.project_id),
        ],
    };
    services
        .compute
        .deploy(&config.project_id, &config.region, &config.name, &container)
        .await
}

async fn grant_permissions(
    services: &CloudServices,
    config: &SetupConfig,
    service: &Service,
    project_number: &str,
) -> Result<()> {
    // Allow the provider's messaging agent to mint identity tokens.
    let agent = names::service_account_member(&names::pubsub_service_agent(project_number));
    services
        .projects
        .add_bindings(
            &config.project_id,
            &[Binding::new(names::ROLE_TOKEN_CREATOR, vec![agent])],
        )
        .await?;

    services
        .identity
        .ensure_service_account(
            &config.project_id,
            names::INVOKER_SA_ID,
            "Cloud Run Pub/Sub Invoker",
        )
        .await?;

    let invoker =
        names::service_account_member(&names::invoker_sa_email(&config.project_id));
    services.compute.add_invoker(&service.name, &[invoker]).await
}

async fn create_pubsub(
    services: &CloudServices,
    config: &SetupConfig,
    service: &Service,
) -> Result<()> {
    services
        .messaging
        .ensure_topic(&config.project_id, names::BUILD_TOPIC)
        .await?;

    let push = PushConfig {
        push_endpoint: service.uri.clone(),
        oidc_service_account: names::invoker_sa_email(&config.project_id),
    };
    services
        .messaging
        .ensure_push_subscription(
            &config.project_id,
            &names::subscription_id(&config.name),
            names::BUILD_TOPIC,
            &push,
        )
        .await
}

//! The cleanup workflow: deletion mirrors of the setup steps.
//!
//! Deletions are independent of creation order. The notifier service is only
//! deleted after its ownership label is verified; messaging deletes surface
//! absence as hard errors while every other adapter swallows it.

use tracing::{info, warn};

use super::{FailurePolicy, WorkflowReport};
use crate::options::CleanupOptions;
use crate::provider::CloudServices;
use crate::{Error, Result, TRACING_TARGET_CLEANUP, names};

const STEP_REMOVE_SERVICE: &str = "remove-notifier";
const STEP_REMOVE_SUBSCRIPTION: &str = "remove-subscription";
const STEP_REMOVE_TOPIC: &str = "remove-topic";
const STEP_REMOVE_INVOKER: &str = "remove-invoker-account";
const STEP_REMOVE_BUCKET: &str = "remove-bucket";
const STEP_REMOVE_SECRET: &str = "remove-secret";

/// Runs the cleanup workflow against the given provider ports.
///
/// Resource names are recomputed from `(project id, notifier name)` with the
/// same formulas setup used.
pub async fn run_cleanup(
    services: &CloudServices,
    options: &CleanupOptions,
    policy: FailurePolicy,
) -> WorkflowReport {
    let mut report = WorkflowReport::new("cleanup");

    info!(target: TRACING_TARGET_CLEANUP, name = %options.name, "Removing notifier service...");
    match remove_notifier(services, options).await {
        Ok(()) => report.completed(STEP_REMOVE_SERVICE),
        Err(error) => {
            report.failed(STEP_REMOVE_SERVICE, error);
            if policy.is_strict() {
                return report;
            }
        }
    }

    info!(target: TRACING_TARGET_CLEANUP, "Removing subscription...");
    match services
        .messaging
        .delete_subscription(&options.project_id, &names::subscription_id(&options.name))
        .await
    {
        Ok(()) => report.completed(STEP_REMOVE_SUBSCRIPTION),
        Err(error) => {
            report.failed(STEP_REMOVE_SUBSCRIPTION, error);
            if policy.is_strict() {
                return report;
            }
        }
    }

    info!(target: TRACING_TARGET_CLEANUP, "Removing topic...");
    match services
        .messaging
        .delete_topic(&options.project_id, names::BUILD_TOPIC)
        .await
    {
        Ok(()) => report.completed(STEP_REMOVE_TOPIC),
        Err(error) => {
            report.failed(STEP_REMOVE_TOPIC, error);
            if policy.is_strict() {
                return report;
            }
        }
    }

    info!(target: TRACING_TARGET_CLEANUP, "Removing invoker service account...");
    match services
        .identity
        .delete_service_account(&options.project_id, names::INVOKER_SA_ID)
        .await
    {
        Ok(()) => report.completed(STEP_REMOVE_INVOKER),
        Err(error) => {
            report.failed(STEP_REMOVE_INVOKER, error);
            if policy.is_strict() {
                return report;
            }
        }
    }

    info!(target: TRACING_TARGET_CLEANUP, "Removing bucket...");
    match services
        .objects
        .delete_bucket(&names::bucket_name(&options.project_id, &options.name))
        .await
    {
        Ok(()) => report.completed(STEP_REMOVE_BUCKET),
        Err(error) => {
            report.failed(STEP_REMOVE_BUCKET, error);
            if policy.is_strict() {
                return report;
            }
        }
    }

    info!(target: TRACING_TARGET_CLEANUP, "Removing slack webhook secret...");
    let secret_name = names::secret_path(&options.project_id, &names::secret_id(&options.name));
    match services.secrets.delete_secret(&secret_name).await {
        Ok(()) => report.completed(STEP_REMOVE_SECRET),
        Err(error) => {
            report.failed(STEP_REMOVE_SECRET, error);
            if policy.is_strict() {
                return report;
            }
        }
    }

    info!(
        target: TRACING_TARGET_CLEANUP,
        "**NOTE**: Only resources created by this CLI were removed. You may still \
         want to disable unused service APIs and revoke unused service accounts \
         and roles in your project."
    );
    if report.is_success() {
        info!(target: TRACING_TARGET_CLEANUP, "** NOTIFIER CLEANUP COMPLETE **");
    }
    report
}

/// Deletes the notifier service, guarded by the ownership label.
///
/// The delete call is only issued when the service carries
/// `creator: cloud-build-notifier`; anything else is refused.
async fn remove_notifier(services: &CloudServices, options: &CleanupOptions) -> Result<()> {
    let service = services
        .compute
        .get_service(&options.project_id, &options.region, &options.name)
        .await?;

    let Some(service) = service else {
        warn!(
            target: TRACING_TARGET_CLEANUP,
            name = %options.name,
            "Service not found, nothing to remove"
        );
        return Ok(());
    };

    if service.label(names::CREATOR_LABEL) != Some(names::TOOL_NAME) {
        return Err(Error::refused().with_message(format!(
            "service {} was not created by this CLI",
            options.name
        )));
    }

    services
        .compute
        .delete_service(&options.project_id, &options.region, &options.name)
        .await
}

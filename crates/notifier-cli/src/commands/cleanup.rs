//! The `cleanup` command.

use anyhow::Context;
use notifier_core::workflow::run_cleanup;

use super::{finish, require_key_file};
use crate::config::CleanupArgs;

/// Removes the notifier pipeline.
pub async fn cleanup(args: CleanupArgs) -> anyhow::Result<()> {
    let key_file = require_key_file(args.options.service_account_key.as_ref())?;
    let services = notifier_gcp::cloud_services(key_file, args.api.clone())
        .await
        .context("failed to initialize provider clients")?;

    let report = run_cleanup(&services, &args.options, args.failure_policy()).await;
    finish(&report)
}

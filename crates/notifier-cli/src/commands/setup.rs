//! The `setup` command.

use anyhow::Context;
use notifier_core::workflow::run_setup;

use super::{finish, require_key_file};
use crate::config::SetupArgs;
use crate::{TRACING_TARGET_COMMAND, prompt};

/// Provisions the notifier pipeline.
pub async fn setup(args: SetupArgs) -> anyhow::Result<()> {
    // Non-interactive validation comes first: every missing or malformed
    // option is reported in one pass, before credentials are even looked at.
    let validated = if args.non_interactive {
        match args.options.validate() {
            Ok(config) => Some(config),
            Err(errors) => {
                for error in &errors {
                    tracing::error!(target: TRACING_TARGET_COMMAND, %error, "invalid option");
                }
                anyhow::bail!("{} invalid or missing option(s)", errors.len());
            }
        }
    } else {
        None
    };

    let key_file = require_key_file(args.options.service_account_key.as_ref())?;
    let services = notifier_gcp::cloud_services(key_file, args.api.clone())
        .await
        .context("failed to initialize provider clients")?;

    let config = match validated {
        Some(config) => config,
        None => match prompt::complete_setup(&services, args.options.clone()).await? {
            Some(config) => config,
            None => {
                tracing::info!(target: TRACING_TARGET_COMMAND, "setup aborted");
                return Ok(());
            }
        },
    };

    let report = run_setup(&services, &config, args.failure_policy()).await;
    finish(&report)
}

#[cfg(test)]
mod tests {
    use notifier_core::options::SetupOptions;
    use notifier_gcp::GcpConfig;

    use super::*;
    use crate::config::SetupArgs;

    #[tokio::test]
    async fn non_interactive_validation_runs_before_credentials() {
        // No options and no key file: the error must list the missing
        // options, not complain about credentials.
        let args = SetupArgs {
            options: SetupOptions::default(),
            api: GcpConfig::default(),
            non_interactive: true,
            best_effort: false,
        };

        let error = setup(args).await.unwrap_err();
        let message = error.to_string();
        assert!(message.contains("3 invalid or missing option(s)"), "{message}");
        assert!(!message.contains("service account key"), "{message}");
    }
}

//! Command implementations.

mod cleanup;
mod setup;

use std::path::{Path, PathBuf};

pub use cleanup::cleanup;
use notifier_core::workflow::{StepOutcome, WorkflowReport};
pub use setup::setup;

use crate::TRACING_TARGET_COMMAND;

/// Resolves the service account key file, which every command needs before
/// it can talk to the provider APIs.
fn require_key_file(key_file: Option<&PathBuf>) -> anyhow::Result<&Path> {
    key_file.map(PathBuf::as_path).ok_or_else(|| {
        anyhow::anyhow!(
            "no service account key file; pass --service-account-key or set \
             GOOGLE_APPLICATION_CREDENTIALS"
        )
    })
}

/// Logs the per-step outcomes and turns recorded failures into a
/// command-level error.
fn finish(report: &WorkflowReport) -> anyhow::Result<()> {
    for entry in report.steps() {
        match &entry.outcome {
            StepOutcome::Completed => {}
            StepOutcome::Skipped(reason) => tracing::warn!(
                target: TRACING_TARGET_COMMAND,
                step = entry.step,
                reason = %reason,
                "step skipped"
            ),
            StepOutcome::Failed(error) => tracing::error!(
                target: TRACING_TARGET_COMMAND,
                step = entry.step,
                error = %error,
                "step failed"
            ),
        }
    }

    let failed = report.failures().count();
    anyhow::ensure!(
        failed == 0,
        "{} failed with {failed} failed step(s)",
        report.workflow()
    );
    Ok(())
}

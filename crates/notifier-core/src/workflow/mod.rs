//! Ordered provisioning workflows.
//!
//! Each workflow is an explicit pipeline of fallible steps producing a
//! [`WorkflowReport`]. Under [`FailurePolicy::Strict`] a failed step
//! short-circuits the remainder; under [`FailurePolicy::BestEffort`] the
//! failure is recorded and later steps run unless their inputs are missing,
//! in which case they are recorded as skipped.

mod cleanup;
mod setup;

pub use cleanup::run_cleanup;
pub use setup::run_setup;

use crate::Error;

/// How a workflow reacts to a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// A failed step aborts the remaining sequence.
    #[default]
    Strict,
    /// A failed step is recorded and the sequence continues.
    BestEffort,
}

impl FailurePolicy {
    /// Whether a failure aborts the remaining steps.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Outcome of a single workflow step.
#[derive(Debug)]
pub enum StepOutcome {
    /// The step ran to completion.
    Completed,
    /// The step did not run; the reason names the missing input.
    Skipped(String),
    /// The step failed.
    Failed(Error),
}

/// One entry of a workflow report.
#[derive(Debug)]
pub struct StepReport {
    /// Step identifier.
    pub step: &'static str,
    /// What happened.
    pub outcome: StepOutcome,
}

/// Structured record of which steps succeeded, failed or were skipped.
#[derive(Debug)]
pub struct WorkflowReport {
    workflow: &'static str,
    steps: Vec<StepReport>,
}

impl WorkflowReport {
    /// Creates an empty report for the named workflow.
    pub fn new(workflow: &'static str) -> Self {
        Self {
            workflow,
            steps: Vec::new(),
        }
    }

    /// Name of the workflow this report belongs to.
    pub fn workflow(&self) -> &'static str {
        self.workflow
    }

    /// All recorded steps, in execution order.
    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    /// Records a completed step.
    pub fn completed(&mut self, step: &'static str) {
        self.steps.push(StepReport {
            step,
            outcome: StepOutcome::Completed,
        });
    }

    /// Records a skipped step.
    pub fn skipped(&mut self, step: &'static str, reason: impl Into<String>) {
        self.steps.push(StepReport {
            step,
            outcome: StepOutcome::Skipped(reason.into()),
        });
    }

    /// Records a failed step.
    pub fn failed(&mut self, step: &'static str, error: Error) {
        self.steps.push(StepReport {
            step,
            outcome: StepOutcome::Failed(error),
        });
    }

    /// Whether no step failed.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Iterates over failed steps and their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &Error)> {
        self.steps.iter().filter_map(|entry| match &entry.outcome {
            StepOutcome::Failed(error) => Some((entry.step, error)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_success() {
        let mut report = WorkflowReport::new("setup");
        report.completed("a");
        report.skipped("b", "input missing");
        assert!(report.is_success());
        assert_eq!(report.steps().len(), 2);
    }

    #[test]
    fn test_report_failure() {
        let mut report = WorkflowReport::new("cleanup");
        report.completed("a");
        report.failed("b", Error::not_found().with_message("missing"));
        assert!(!report.is_success());

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "b");
    }

    #[test]
    fn test_policy_default_is_strict() {
        assert!(FailurePolicy::default().is_strict());
        assert!(!FailurePolicy::BestEffort.is_strict());
    }
}

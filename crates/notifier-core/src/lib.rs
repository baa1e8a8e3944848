#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for setup workflow steps.
pub const TRACING_TARGET_SETUP: &str = "notifier_core::workflow::setup";

/// Tracing target for cleanup workflow steps.
pub const TRACING_TARGET_CLEANUP: &str = "notifier_core::workflow::cleanup";

mod error;

pub mod names;
pub mod options;
pub mod provider;
pub mod template;
pub mod workflow;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use options::{CleanupOptions, SetupOptions};
pub use provider::CloudServices;
pub use workflow::{FailurePolicy, StepOutcome, WorkflowReport};

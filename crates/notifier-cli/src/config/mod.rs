//! CLI configuration.
//!
//! The command surface:
//!
//! ```text
//! cloud-build-notifier
//! ├── setup    # provision the notifier pipeline
//! └── cleanup  # remove everything setup created
//! ```
//!
//! All options can be provided as flags; `setup` collects missing required
//! options interactively unless `--non-interactive` is set.

use clap::{Args, Parser, Subcommand};
use notifier_core::options::{CleanupOptions, SetupOptions};
use notifier_core::workflow::FailurePolicy;
use notifier_gcp::GcpConfig;

/// Complete CLI configuration.
#[derive(Debug, Parser)]
#[command(name = "cloud-build-notifier")]
#[command(about = "Sets up a Slack notification pipeline for Cloud Build")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provisions the notifier pipeline in a GCP project.
    Setup(SetupArgs),
    /// Removes the notifier pipeline from a GCP project.
    Cleanup(CleanupArgs),
}

/// Arguments of the `setup` command.
#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Notifier options.
    #[clap(flatten)]
    pub options: SetupOptions,

    /// API client options.
    #[clap(flatten)]
    pub api: GcpConfig,

    /// Fail instead of prompting for missing options
    #[arg(long = "non-interactive")]
    pub non_interactive: bool,

    /// Record step failures and continue instead of aborting
    #[arg(long = "best-effort")]
    pub best_effort: bool,
}

impl SetupArgs {
    /// Failure policy selected by the flags. Setup aborts on the first
    /// failure unless `--best-effort` is given.
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.best_effort {
            FailurePolicy::BestEffort
        } else {
            FailurePolicy::Strict
        }
    }
}

/// Arguments of the `cleanup` command.
#[derive(Debug, Args)]
pub struct CleanupArgs {
    /// Notifier options.
    #[clap(flatten)]
    pub options: CleanupOptions,

    /// API client options.
    #[clap(flatten)]
    pub api: GcpConfig,

    /// Abort on the first failed removal instead of continuing
    #[arg(long)]
    pub strict: bool,
}

impl CleanupArgs {
    /// Failure policy selected by the flags. Cleanup keeps removing the
    /// remaining resources unless `--strict` is given.
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.strict {
            FailurePolicy::Strict
        } else {
            FailurePolicy::BestEffort
        }
    }
}

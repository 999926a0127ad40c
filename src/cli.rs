//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `deploy-checklist`.
#[derive(Debug, Parser)]
#[command(
    name = "deploy-checklist",
    version,
    about = "Keep the staging deploy checklist issue up to date"
)]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or update the checklist issue for a staging release.
    Publish {
        /// Version being deployed to staging.
        #[arg(long, env = "NEW_VERSION")]
        tag: String,

        /// Start of the merge range (defaults to the last closed checklist's tag).
        #[arg(long)]
        from_tag: Option<String>,

        /// Print the issue payload as JSON instead of writing it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Reconcile and render a checklist body offline.
    Render {
        /// File holding the previous checklist body.
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Release tag to write into the body.
        #[arg(long)]
        tag: Option<String>,

        /// Merged pull request reference, in order (repeatable).
        #[arg(long = "change", value_name = "REF")]
        changes: Vec<String>,

        /// Open deploy blocker reference, in order (repeatable).
        #[arg(long = "blocker", value_name = "REF")]
        blockers: Vec<String>,

        /// Compare link to render; without it `GITHUB_REPOSITORY` must be set.
        #[arg(long)]
        compare_url: Option<String>,

        /// Team mentioned in the footer.
        #[arg(long, env = "CHECKLIST_REVIEWERS")]
        reviewers: Option<String>,
    },
}

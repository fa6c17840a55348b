//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Phase deployer - phase-aware reconciliation of desired resources.
#[derive(Parser, Debug)]
#[command(name = "phase-deployer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "PHASE_DEPLOYER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one reconciliation pass against the configured store.
    Reconcile {
        /// Entity name.
        #[arg(short, long)]
        entity: String,

        /// Entity namespace.
        #[arg(short, long)]
        namespace: Option<String>,

        /// Current entity phase (e.g. Deploying, Running).
        #[arg(short, long)]
        phase: String,

        /// Manifest file holding the desired resources.
        #[arg(short, long)]
        manifests: PathBuf,
    },

    /// Print the patch that would bring a live resource to a desired one.
    Diff {
        /// Live resource manifest.
        #[arg(long)]
        live: PathBuf,

        /// Desired resource manifest.
        #[arg(long)]
        desired: PathBuf,

        /// Print the plain merge patch, deletions included.
        #[arg(long)]
        naive: bool,
    },

    /// Validate the configuration and a manifest set.
    Validate {
        /// Manifest file to validate.
        #[arg(short, long)]
        manifests: PathBuf,

        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Print a resource from the configured store.
    Get {
        /// Resource kind.
        #[arg(short, long)]
        kind: String,

        /// Resource name.
        #[arg(long)]
        name: String,

        /// Resource namespace.
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

//! CLI module for the phase deployer.
//!
//! This module provides the command-line interface for running
//! reconciliation passes and inspecting the live store.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;

//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{ResourceHasher, ValidationResult};
use crate::deployer::Strategy;
use crate::patch::Patch;
use crate::reconciler::PassReport;
use crate::resource::Resource;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Post-action row for table display.
#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Applied")]
    applied: usize,
    #[tabled(rename = "Unchanged")]
    unchanged: usize,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a pass report for display.
    #[must_use]
    pub fn format_report(&self, report: &PassReport) -> String {
        match self.format {
            OutputFormat::Json => Self::to_json(report),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &PassReport) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "\nPass {} for {} ({})",
            report.pass_id.to_string().dimmed(),
            report.entity.bold(),
            report.phase
        );
        let _ = writeln!(
            output,
            "   Desired set: {} resources, hash {}",
            report.resources,
            ResourceHasher::short_hash(&report.desired_hash)
        );

        let Some(strategy) = report.strategy else {
            let _ = writeln!(
                output,
                "\n{} Deployer not applicable, nothing was written.",
                "-".dimmed()
            );
            return output;
        };

        let _ = writeln!(output, "   Strategy: {}\n", Self::format_strategy(strategy));

        let rows: Vec<ActionRow> = report
            .actions
            .iter()
            .enumerate()
            .map(|(i, a)| ActionRow {
                index: i + 1,
                action: a.action.to_string(),
                applied: a.applied,
                unchanged: a.unchanged,
            })
            .collect();

        if !rows.is_empty() {
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        let _ = writeln!(
            output,
            "\n{} {} applied, {} unchanged ({} ms)",
            "✓".green(),
            report.applied().to_string().green(),
            report.unchanged().to_string().dimmed(),
            (report.finished_at - report.started_at).num_milliseconds()
        );

        output
    }

    /// Formats a patch for display.
    #[must_use]
    pub fn format_patch(&self, patch: &Patch) -> String {
        match self.format {
            OutputFormat::Json => Self::to_json(patch.data()),
            OutputFormat::Text => {
                if patch.is_empty() {
                    return format!("{} No changes - live resource is up to date.\n", "✓".green());
                }
                let mut output = format!(
                    "{} patch ({}):\n",
                    patch.patch_type(),
                    patch.patch_type().content_type().dimmed()
                );
                output.push_str(&Self::to_json(patch.data()));
                output.push('\n');
                output
            }
        }
    }

    /// Formats validation results for the settings and the manifest set.
    #[must_use]
    pub fn format_validation(
        &self,
        settings: &ValidationResult,
        resources: &ValidationResult,
        resource_count: usize,
        show_warnings: bool,
    ) -> String {
        let warnings: Vec<&String> = settings.warnings.iter().chain(&resources.warnings).collect();

        match self.format {
            OutputFormat::Json => Self::to_json(&ValidationJson {
                valid: settings.is_valid() && resources.is_valid(),
                resources: resource_count,
                warnings,
            }),
            OutputFormat::Text => {
                let mut output = format!(
                    "{} Configuration and {resource_count} resources are valid.\n",
                    "✓".green()
                );
                if !warnings.is_empty() {
                    if show_warnings {
                        let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                        for warning in &warnings {
                            let _ = writeln!(output, "   - {warning}");
                        }
                    } else {
                        let _ = writeln!(
                            output,
                            "   {} warnings (use --warnings to show)",
                            warnings.len()
                        );
                    }
                }
                output
            }
        }
    }

    /// Formats a stored resource.
    #[must_use]
    pub fn format_resource(&self, resource: Option<&Resource>) -> String {
        match (self.format, resource) {
            (OutputFormat::Json, Some(resource)) => Self::to_json(resource),
            (OutputFormat::Json, None) => String::from("null"),
            (OutputFormat::Text, Some(resource)) => {
                let mut output = format!(
                    "{} {}\n",
                    resource.kind.bold(),
                    resource.metadata.name.cyan()
                );
                output.push_str(&Self::to_json(resource));
                output.push('\n');
                output
            }
            (OutputFormat::Text, None) => format!("{} Resource not found.\n", "✗".red()),
        }
    }

    /// Formats a strategy with color.
    fn format_strategy(strategy: Strategy) -> String {
        match strategy {
            Strategy::Replace => "replace".yellow().to_string(),
            Strategy::Patch => "patch".green().to_string(),
        }
    }

    fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_default()
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct ValidationJson<'a> {
    valid: bool,
    resources: usize,
    warnings: Vec<&'a String>,
}

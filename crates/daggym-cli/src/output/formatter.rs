//! Output formatter trait for CLI results.

use anyhow::Result;
use daggym_core::HashSetupReport;
use daggym_core::LaunchCommand;
use daggym_core::VerificationReport;
use daggym_core::emulator::RelaySummary;
use serde::Serialize;
use std::path::Path;

use crate::commands::play::EpisodeSummary;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Announce which archive and manifest are being compared
    fn format_verification_start(&self, archive: &Path, manifest: &Path);

    /// Format a verification report
    fn format_verification_report(&self, report: &VerificationReport) -> Result<()>;

    /// Format the result of hash-directory setup
    fn format_hash_setup(&self, report: &HashSetupReport) -> Result<()>;

    /// Format the emulator command line
    fn format_launch_command(&self, command: &LaunchCommand, dry_run: bool) -> Result<()>;

    /// Format the end of an emulator run
    fn format_relay_summary(&self, summary: &RelaySummary, exit_code: Option<i32>) -> Result<()>;

    /// Format a finished episode
    fn format_episode(&self, summary: &EpisodeSummary) -> Result<()>;

    /// Format an echo probe result
    fn format_echo(&self, role: &str, value: &serde_json::Value) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format success message
    fn format_success(&self, message: &str);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

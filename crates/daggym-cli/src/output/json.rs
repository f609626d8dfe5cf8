//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use crate::commands::play::EpisodeSummary;
use anyhow::Result;
use daggym_core::HashSetupReport;
use daggym_core::LaunchCommand;
use daggym_core::VerificationReport;
use daggym_core::emulator::RelaySummary;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ComparisonOutput {
    entry: String,
    expected_crc32: String,
    expected_sha1: String,
    crc_match: bool,
    sha1_match: bool,
    full_match: bool,
}

#[derive(Serialize)]
struct FileOutput {
    path: String,
    size: u64,
    crc32: Option<String>,
    sha1: Option<String>,
    comparisons: Vec<ComparisonOutput>,
}

#[derive(Serialize)]
struct VerificationOutput {
    matched: bool,
    status: String,
    manifest_entries: usize,
    archive_members: Vec<String>,
    files: Vec<FileOutput>,
}

impl From<&VerificationReport> for VerificationOutput {
    fn from(report: &VerificationReport) -> Self {
        Self {
            matched: report.is_match(),
            status: report.status.to_string(),
            manifest_entries: report.manifest_entries,
            archive_members: report.archive_members.clone(),
            files: report
                .files
                .iter()
                .map(|file| FileOutput {
                    path: file.path.display().to_string(),
                    size: file.size,
                    crc32: file.checksums.as_ref().map(|c| c.crc32.clone()),
                    sha1: file.checksums.as_ref().map(|c| c.sha1.clone()),
                    comparisons: file
                        .comparisons
                        .iter()
                        .map(|c| ComparisonOutput {
                            entry: c.entry_name.clone(),
                            expected_crc32: c.expected_crc32.clone(),
                            expected_sha1: c.expected_sha1.clone(),
                            crc_match: c.crc_match,
                            sha1_match: c.sha1_match,
                            full_match: c.is_full_match(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_verification_start(&self, _archive: &Path, _manifest: &Path) {}

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        let output = JsonOutput::success("verify", VerificationOutput::from(report));
        Self::output(&output)
    }

    fn format_hash_setup(&self, report: &HashSetupReport) -> Result<()> {
        #[derive(Serialize)]
        struct HashSetupOutput {
            copied: Vec<String>,
            backed_up: Vec<String>,
            missing: Vec<String>,
        }

        let data = HashSetupOutput {
            copied: report
                .copied
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            backed_up: report
                .backed_up
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            missing: report.missing.clone(),
        };

        let output = JsonOutput::success("setup-hash", data);
        Self::output(&output)
    }

    fn format_launch_command(&self, command: &LaunchCommand, dry_run: bool) -> Result<()> {
        #[derive(Serialize)]
        struct LaunchOutput<'a> {
            program: &'a str,
            args: &'a [String],
            dry_run: bool,
        }

        let output = JsonOutput::success(
            "launch",
            LaunchOutput {
                program: &command.program,
                args: &command.args,
                dry_run,
            },
        );
        Self::output(&output)
    }

    fn format_relay_summary(&self, summary: &RelaySummary, exit_code: Option<i32>) -> Result<()> {
        #[derive(Serialize)]
        struct RelayOutput {
            stdout_lines: usize,
            stderr_lines: usize,
            stopped_by_sentinel: bool,
            exit_code: Option<i32>,
        }

        let output = JsonOutput::success(
            "relay",
            RelayOutput {
                stdout_lines: summary.stdout_lines,
                stderr_lines: summary.stderr_lines,
                stopped_by_sentinel: summary.stopped_by_sentinel,
                exit_code,
            },
        );
        Self::output(&output)
    }

    fn format_episode(&self, summary: &EpisodeSummary) -> Result<()> {
        let output = JsonOutput::success("play", summary);
        Self::output(&output)
    }

    fn format_echo(&self, role: &str, value: &serde_json::Value) -> Result<()> {
        let output = JsonOutput::success(format!("ipc-{role}"), value);
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("error", format!("{error}"));
        let _ = Self::output(&output);
    }

    fn format_success(&self, message: &str) {
        #[derive(Serialize)]
        struct SuccessData {
            message: String,
        }

        let output = JsonOutput::success(
            "success",
            SuccessData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::commands::play::EpisodeSummary;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use daggym_core::HashSetupReport;
use daggym_core::LaunchCommand;
use daggym_core::VerificationReport;
use daggym_core::VerificationStatus;
use daggym_core::emulator::RelaySummary;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn verdict(&self, matched: bool) -> String {
        match (matched, self.use_colors) {
            (true, true) => style("match").green().to_string(),
            (false, true) => style("mismatch").red().to_string(),
            (true, false) => "match".to_string(),
            (false, false) => "mismatch".to_string(),
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_verification_start(&self, archive: &Path, manifest: &Path) {
        if self.quiet {
            return;
        }
        self.line(&format!("Verifying ROM: {}", archive.display()));
        self.line(&format!("Using XML file: {}", manifest.display()));
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if report.status == VerificationStatus::NoManifestEntries {
            self.format_warning("No ROM information found in the XML file");
            return Ok(());
        }

        if self.verbose {
            self.line(&format!("Manifest entries: {}", report.manifest_entries));
        }
        self.line(&format!(
            "Files in the archive: {}",
            report.archive_members.join(", ")
        ));

        for file in &report.files {
            self.line(&format!(
                "Found file: {} ({})",
                file.path.display(),
                humanize_bytes(file.size)
            ));

            if file.comparisons.is_empty() {
                self.format_warning(&format!(
                    "No ROM in the manifest has the size of {} ({} bytes)",
                    file.path.display(),
                    file.size
                ));
            }

            let actual = file.checksums.as_ref();
            for comparison in &file.comparisons {
                self.line(&format!("  Checking against {}:", comparison.entry_name));
                self.line(&format!(
                    "    Expected CRC:  {}  Actual: {}  ({})",
                    comparison.expected_crc32,
                    actual.map_or("-", |c| c.crc32.as_str()),
                    self.verdict(comparison.crc_match)
                ));
                self.line(&format!(
                    "    Expected SHA1: {}  Actual: {}  ({})",
                    comparison.expected_sha1,
                    actual.map_or("-", |c| c.sha1.as_str()),
                    self.verdict(comparison.sha1_match)
                ));
                let outcome = if comparison.is_full_match() {
                    if self.use_colors {
                        style("SUCCESS").green().bold().to_string()
                    } else {
                        "SUCCESS".to_string()
                    }
                } else if self.use_colors {
                    style("MISMATCH").red().bold().to_string()
                } else {
                    "MISMATCH".to_string()
                };
                self.line(&format!("    {outcome}"));
            }

            if file.comparisons.is_empty()
                && let Some(sums) = actual
            {
                self.line(&format!("  CRC32: {}  SHA1: {}", sums.crc32, sums.sha1));
            }
        }

        Ok(())
    }

    fn format_hash_setup(&self, report: &HashSetupReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for path in &report.backed_up {
            self.line(&format!("Backed up existing file to {}", path.display()));
        }
        for path in &report.copied {
            self.format_success(&format!("Copied {}", path.display()));
        }
        for name in &report.missing {
            self.format_warning(&format!("{name} not found in the system hash directory"));
        }

        Ok(())
    }

    fn format_launch_command(&self, command: &LaunchCommand, dry_run: bool) -> Result<()> {
        if self.quiet && !dry_run {
            return Ok(());
        }
        // A dry run prints the bare command line so it can be pasted into a shell.
        if dry_run {
            self.line(&command.to_string());
        } else {
            self.line(&format!("Starting: {command}"));
        }
        Ok(())
    }

    fn format_relay_summary(&self, summary: &RelaySummary, exit_code: Option<i32>) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if summary.stopped_by_sentinel {
            self.format_success("Sentinel line received, emulator stopped");
        } else {
            self.line(&format!(
                "Emulator exited with code {}",
                exit_code.map_or_else(|| "none (killed)".to_string(), |c| c.to_string())
            ));
        }
        if self.verbose {
            self.line(&format!(
                "  stdout lines: {}  stderr lines: {}",
                summary.stdout_lines, summary.stderr_lines
            ));
        }
        Ok(())
    }

    fn format_episode(&self, summary: &EpisodeSummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line(&format!(
            "Episode finished after {} steps (seed {})",
            summary.steps, summary.seed
        ));
        self.line(&format!("  Total reward:      {}", summary.total_reward));
        self.line(&format!("  Final observation: {:?}", summary.final_observation));
        self.line(&format!("  Done:              {}", summary.done));
        Ok(())
    }

    fn format_echo(&self, role: &str, value: &serde_json::Value) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.line(&format!("{role}: {value}"));
        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error}"));
        }
    }

    fn format_success(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            self.line(message);
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            self.line(&format!("WARNING: {message}"));
        }
    }
}

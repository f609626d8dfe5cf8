//! Verify command implementation.

use crate::cli::VerifyArgs;
use crate::error::convert_verify_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use anyhow::bail;
use daggym_core::NoopProgress;
use daggym_core::VerifyConfig;
use daggym_core::verify_rom_with_progress;

pub fn execute(
    args: &VerifyArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let config = VerifyConfig::new()
        .with_scratch_dir(&args.scratch_dir)
        .with_hash_all_files(args.hash_all);

    formatter.format_verification_start(&args.archive, &args.manifest);

    // Use progress bar if TTY is detected (not quiet, not JSON, is terminal)
    let result = if show_progress && CliProgress::should_show() {
        let mut progress = CliProgress::new("Hashing");
        verify_rom_with_progress(&args.archive, &args.manifest, &config, &mut progress)
    } else {
        let mut noop = NoopProgress;
        verify_rom_with_progress(&args.archive, &args.manifest, &config, &mut noop)
    };
    let report = result.map_err(convert_verify_error)?;

    formatter.format_verification_report(&report)?;

    if report.is_match() {
        formatter.format_success("Verification PASSED: The ROM matches the expected values.");
        Ok(())
    } else {
        bail!("Verification FAILED: The ROM does not match the expected values.")
    }
}

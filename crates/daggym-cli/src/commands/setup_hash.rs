//! Setup-hash command implementation.

use crate::cli::SetupHashArgs;
use crate::error::convert_verify_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use daggym_core::HashSetupConfig;
use daggym_core::setup_hash_dir;

pub fn execute(args: &SetupHashArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut config = HashSetupConfig::default()
        .with_system_dir(&args.system_dir)
        .with_local_dir(&args.local_dir);
    if !args.files.is_empty() {
        config = config.with_required_files(&args.files);
    }

    let report = setup_hash_dir(&config).map_err(convert_verify_error)?;
    formatter.format_hash_setup(&report)?;

    if !report.is_complete() {
        formatter.format_warning("Some hash files were not found; MAME may not recognise the cartridge.");
    }
    Ok(())
}

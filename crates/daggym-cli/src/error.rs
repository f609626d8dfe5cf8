//! Error conversion utilities for CLI.
//!
//! Converts daggym-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance. The typed error stays
//! reachable through `downcast_ref` so the exit code can be derived from it.

use daggym_core::EmulatorError;
use daggym_core::InputKind;
use daggym_core::VerifyError;

/// Converts `VerifyError` to a user-friendly anyhow error with context.
pub fn convert_verify_error(err: VerifyError) -> anyhow::Error {
    let message = match &err {
        VerifyError::InputNotFound { kind, path } => {
            let hint = match kind {
                InputKind::Archive => "Pass the archive path as the first argument.",
                InputKind::Manifest => {
                    "Pass the manifest path as the second argument, or run `daggym setup-hash`."
                }
                InputKind::HashDirectory => "Install MAME or pass --system-dir.",
            };
            format!("{kind} not found: {}\nHINT: {hint}", path.display())
        }
        VerifyError::Archive(reason) => format!(
            "Invalid archive: {reason}\n\
             HINT: The archive may be corrupted, truncated, or not a zip/tar file."
        ),
        VerifyError::Parse(reason) => format!(
            "Malformed manifest: {reason}\n\
             HINT: Check that the file is a MAME software list (e.g. coco_cart.xml)."
        ),
        VerifyError::MissingAttribute { name, attribute } => format!(
            "Manifest entry '{name}' has no '{attribute}' attribute\n\
             HINT: Every <rom> needs name, size, crc and sha1."
        ),
        VerifyError::Format { attribute, value } => format!(
            "Manifest attribute '{attribute}' has invalid value {value:?}\n\
             HINT: size must be a decimal byte count."
        ),
        VerifyError::Io(io_err) => format!("I/O error: {io_err}"),
    };
    anyhow::Error::new(err).context(message)
}

/// Converts `EmulatorError` to a user-friendly anyhow error with context.
pub fn convert_emulator_error(err: EmulatorError) -> anyhow::Error {
    let message = match &err {
        EmulatorError::Spawn { program, .. } => format!(
            "Could not start '{program}'\n\
             HINT: Install MAME or pass --program with the emulator's path."
        ),
        EmulatorError::NotRunning => "The emulator is not running".to_string(),
        other => other.to_string(),
    };
    anyhow::Error::new(err).context(message)
}

/// Exit code for an error returned by a command.
///
/// Typed verification errors carry their own code; everything else is `1`.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<VerifyError>()
        .map_or(1, VerifyError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_convert_not_found() {
        let err = VerifyError::InputNotFound {
            kind: InputKind::Archive,
            path: PathBuf::from("emu/roms/daggorath.zip"),
        };
        let converted = convert_verify_error(err);
        let msg = format!("{converted}");
        assert!(msg.contains("ROM file not found: emu/roms/daggorath.zip"));
        assert!(msg.contains("HINT"));
        assert_eq!(exit_code(&converted), 1);
    }

    #[test]
    fn test_archive_error_keeps_exit_code() {
        let converted = convert_verify_error(VerifyError::Archive("bad header".into()));
        assert!(format!("{converted:?}").contains("bad header"));
        assert_eq!(exit_code(&converted), 2);
    }

    #[test]
    fn test_manifest_error_exit_code() {
        let converted = convert_verify_error(VerifyError::Format {
            attribute: "size",
            value: "eight".into(),
        });
        assert_eq!(exit_code(&converted), 3);
    }

    #[test]
    fn test_untyped_error_is_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("verification failed")), 1);
    }

    #[test]
    fn test_convert_spawn_error() {
        let err = EmulatorError::Spawn {
            program: "mame".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = format!("{}", convert_emulator_error(err));
        assert!(msg.contains("Could not start 'mame'"));
    }
}

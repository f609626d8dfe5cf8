//! Error types for ROM verification and emulator supervision.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `VerifyError`.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Which input of a verification run could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// The ROM archive.
    Archive,
    /// The XML manifest.
    Manifest,
    /// The system MAME hash directory.
    HashDirectory,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive => write!(f, "ROM file"),
            Self::Manifest => write!(f, "XML file"),
            Self::HashDirectory => write!(f, "hash directory"),
        }
    }
}

/// Errors that can occur while verifying a ROM archive.
///
/// A checksum mismatch or an empty manifest is not an error: both are
/// reported through [`VerificationStatus`](crate::VerificationStatus).
#[derive(Error, Debug)]
pub enum VerifyError {
    /// I/O operation failed outside of archive extraction.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input path does not exist or is not a regular file.
    #[error("{kind} not found: {path}")]
    InputNotFound {
        /// Which input was missing.
        kind: InputKind,
        /// The path that was checked.
        path: PathBuf,
    },

    /// The manifest is not well-formed XML.
    #[error("manifest parse error: {0}")]
    Parse(String),

    /// A selected `<rom>` element lacks a required attribute.
    #[error("rom '{name}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Value of the `name` attribute, or `<unnamed>`.
        name: String,
        /// The attribute that was absent.
        attribute: &'static str,
    },

    /// An attribute value could not be interpreted.
    #[error("invalid value for attribute '{attribute}': {value:?}")]
    Format {
        /// The attribute name.
        attribute: &'static str,
        /// The raw value found in the document.
        value: String,
    },

    /// The archive is corrupt, unrecognized, or a member could not be written.
    #[error("archive error: {0}")]
    Archive(String),
}

impl VerifyError {
    /// Returns `true` if this error means an input path was missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use daggym_core::InputKind;
    /// use daggym_core::VerifyError;
    /// use std::path::PathBuf;
    ///
    /// let err = VerifyError::InputNotFound {
    ///     kind: InputKind::Archive,
    ///     path: PathBuf::from("emu/roms/daggorath.zip"),
    /// };
    /// assert!(err.is_input_error());
    ///
    /// let err = VerifyError::Parse("unexpected end".into());
    /// assert!(!err.is_input_error());
    /// ```
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InputNotFound { .. })
    }

    /// Returns `true` if the manifest could not be interpreted.
    #[must_use]
    pub const fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::MissingAttribute { .. } | Self::Format { .. }
        )
    }

    /// Process exit code the CLI uses for this error.
    ///
    /// Missing inputs and plain I/O failures keep the historical code `1`;
    /// archive errors map to `2` and manifest errors to `3`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) | Self::InputNotFound { .. } => 1,
            Self::Archive(_) => 2,
            Self::Parse(_) | Self::MissingAttribute { .. } | Self::Format { .. } => 3,
        }
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use daggym_core::VerifyError;
    ///
    /// let err = VerifyError::Archive("bad central directory".to_string());
    /// assert_eq!(err.context(), Some("bad central directory"));
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Parse(msg) | Self::Archive(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Errors raised by the emulator supervisor, side channel, and environment.
#[derive(Error, Debug)]
pub enum EmulatorError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The emulator binary could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// The program that was executed.
        program: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// An operation needed a running process but none was started.
    #[error("emulator process is not running")]
    NotRunning,

    /// The action is outside the environment's action space.
    #[error("action {action} is outside the action space (n = {n})")]
    InvalidAction {
        /// The rejected action.
        action: u32,
        /// Size of the discrete action space.
        n: u32,
    },

    /// A side-channel payload could not be encoded or decoded.
    #[error("invalid side-channel payload: {0}")]
    Payload(#[from] serde_json::Error),
}

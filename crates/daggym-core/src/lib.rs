//! ROM archive verification and emulator glue for a Dungeons of Daggorath
//! reinforcement-learning environment.
//!
//! `daggym-core` checks that a ROM archive matches the CRC-32 and SHA-1
//! values a MAME software-list manifest declares, prepares a local MAME hash
//! directory, launches and supervises the emulator, and exposes the running
//! game as a gym-style environment.
//!
//! # Examples
//!
//! ```no_run
//! use daggym_core::VerifyConfig;
//! use daggym_core::verify_rom;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = verify_rom(
//!     "emu/roms/daggorath.zip",
//!     "/usr/share/games/mame/hash/coco_cart.xml",
//!     &VerifyConfig::default(),
//! )?;
//! for (file, comparison) in report.full_matches() {
//!     println!("{} matches {}", file.path.display(), comparison.entry_name);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod checksum;
pub mod config;
pub mod copy;
pub mod emulator;
pub mod env;
pub mod error;
pub mod hashdir;
pub mod ipc;
pub mod manifest;
pub mod report;
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;
pub mod verify;

// Re-export main API types
pub use api::verify_rom;
pub use api::verify_rom_with_progress;
pub use archive::ArchiveFormat;
pub use archive::ExtractionSummary;
pub use checksum::Checksums;
pub use config::VerifyConfig;
pub use emulator::EmulatorConfig;
pub use emulator::LaunchCommand;
pub use emulator::ProcessSupervisor;
pub use emulator::SystemSupervisor;
pub use error::EmulatorError;
pub use error::InputKind;
pub use error::Result;
pub use error::VerifyError;
pub use hashdir::HashSetupConfig;
pub use hashdir::HashSetupReport;
pub use hashdir::setup_hash_dir;
pub use manifest::Manifest;
pub use manifest::ManifestEntry;
pub use report::Comparison;
pub use report::FileReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use report::VerificationReport;
pub use report::VerificationStatus;

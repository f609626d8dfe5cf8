//! Fixture builders for ROM archives, software-list manifests, and scripted
//! emulator processes.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::io::Cursor;
use std::io::Write;

use crate::EmulatorError;
use crate::checksum::checksum_reader;
use crate::emulator::LaunchCommand;
use crate::emulator::OutputLine;
use crate::emulator::ProcessSupervisor;

/// Creates an in-memory ZIP archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are stored uncompressed
/// with mode 0o644.
///
/// # Examples
///
/// ```
/// use daggym_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(vec![("f.bin", &[0, 1, 2, 3]), ("dir/readme.txt", b"hi")]);
/// assert!(zip_data.starts_with(b"PK"));
/// ```
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    use zip::write::SimpleFileOptions;
    use zip::write::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);

    for (path, data) in entries {
        zip.start_file(path, options).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// Builder for software-list manifests.
///
/// # Examples
///
/// ```
/// use daggym_core::manifest::parse_manifest_str;
/// use daggym_core::test_utils::ManifestBuilder;
///
/// let xml = ManifestBuilder::new("daggorath")
///     .rom_for("f", &[0, 1, 2, 3])
///     .build();
/// let manifest = parse_manifest_str(&xml).unwrap();
/// assert_eq!(manifest.get("f").unwrap().expected_crc32, "8bb98613");
/// ```
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    software: String,
    roms: Vec<(String, u64, String, String)>,
}

impl ManifestBuilder {
    /// Starts a manifest with one `<software>` element named `software`.
    #[must_use]
    pub fn new(software: &str) -> Self {
        Self {
            software: software.to_string(),
            roms: Vec::new(),
        }
    }

    /// Adds a `<rom>` whose size and digests describe `data` exactly.
    #[must_use]
    pub fn rom_for(self, name: &str, data: &[u8]) -> Self {
        let sums = checksum_reader(&mut Cursor::new(data), 0).unwrap();
        self.rom(name, data.len() as u64, &sums.crc32, &sums.sha1)
    }

    /// Adds a `<rom>` with explicit attribute values.
    #[must_use]
    pub fn rom(mut self, name: &str, size: u64, crc: &str, sha1: &str) -> Self {
        self.roms
            .push((name.to_string(), size, crc.to_string(), sha1.to_string()));
        self
    }

    /// Renders the document.
    #[must_use]
    pub fn build(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<softwarelist name=\"coco_cart\">\n");
        let _ = writeln!(xml, "  <software name=\"{}\">", self.software);
        xml.push_str("    <part name=\"cart\" interface=\"coco_cart\">\n");
        xml.push_str("      <dataarea name=\"rom\">\n");
        for (name, size, crc, sha1) in &self.roms {
            let _ = writeln!(
                xml,
                "        <rom name=\"{name}\" size=\"{size}\" crc=\"{crc}\" sha1=\"{sha1}\"/>"
            );
        }
        xml.push_str("      </dataarea>\n    </part>\n  </software>\n</softwarelist>\n");
        xml
    }
}

/// [`ProcessSupervisor`] that replays a fixed script instead of running MAME.
///
/// Every spawn gets a fresh copy of the script.
///
/// # Examples
///
/// ```
/// use daggym_core::emulator::{LaunchCommand, OutputLine, ProcessSupervisor};
/// use daggym_core::test_utils::ScriptedSupervisor;
///
/// let mut supervisor = ScriptedSupervisor::new(vec![OutputLine::Stdout("heartrate:80".into())]);
/// let mut handle = supervisor.spawn(&LaunchCommand::new("mame")).unwrap();
/// assert!(supervisor.read_line(&mut handle).is_some());
/// assert!(supervisor.read_line(&mut handle).is_none());
/// ```
#[derive(Debug, Default)]
pub struct ScriptedSupervisor {
    script: Vec<OutputLine>,
    /// Commands passed to `spawn`, in order.
    pub spawned: Vec<LaunchCommand>,
    /// Number of `terminate` calls.
    pub terminated: usize,
}

/// Remaining lines of one scripted process.
#[derive(Debug)]
pub struct ScriptedProcess {
    lines: VecDeque<OutputLine>,
}

impl ScriptedSupervisor {
    /// Creates a supervisor whose processes print `script` and exit.
    #[must_use]
    pub fn new(script: Vec<OutputLine>) -> Self {
        Self {
            script,
            spawned: Vec::new(),
            terminated: 0,
        }
    }

    /// Script of stdout lines.
    #[must_use]
    pub fn stdout<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|l| OutputLine::Stdout(l.into())).collect())
    }
}

impl ProcessSupervisor for ScriptedSupervisor {
    type Handle = ScriptedProcess;

    fn spawn(&mut self, command: &LaunchCommand) -> Result<ScriptedProcess, EmulatorError> {
        self.spawned.push(command.clone());
        Ok(ScriptedProcess {
            lines: self.script.iter().cloned().collect(),
        })
    }

    fn read_line(&mut self, handle: &mut ScriptedProcess) -> Option<OutputLine> {
        handle.lines.pop_front()
    }

    fn terminate(&mut self, _handle: ScriptedProcess) -> Result<Option<i32>, EmulatorError> {
        self.terminated += 1;
        Ok(Some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifest_str;

    #[test]
    fn test_builder_round_trips_through_parser() {
        let xml = ManifestBuilder::new("daggorath")
            .rom_for("f", &[0, 1, 2, 3])
            .rom("g", 8192, "8d5f2bab", &"a".repeat(40))
            .build();
        let manifest = parse_manifest_str(&xml).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("g").unwrap().expected_size, 8192);
    }

    #[test]
    fn test_create_test_zip_readable() {
        let data = create_test_zip(vec![("f.bin", &[0, 1, 2, 3])]);
        let archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 1);
    }
}

//! Integration tests for daggym-core.
//!
//! These tests run whole verifications against archives and manifests
//! written to temporary directories.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use daggym_core::InputKind;
use daggym_core::VerificationStatus;
use daggym_core::VerifyConfig;
use daggym_core::VerifyError;
use daggym_core::test_utils::ManifestBuilder;
use daggym_core::test_utils::create_test_zip;
use daggym_core::verify_rom;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const F_BIN: [u8; 4] = [0x00, 0x01, 0x02, 0x03];
const F_CRC: &str = "8bb98613";
const F_SHA1: &str = "a02a05b025b928c039cf1ae7e8ee04e7c190c0db";

struct Fixture {
    temp: TempDir,
    archive: PathBuf,
    manifest: PathBuf,
}

impl Fixture {
    fn new(members: Vec<(&str, &[u8])>, manifest_xml: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("daggorath.zip");
        let manifest = temp.path().join("coco_cart.xml");
        fs::write(&archive, create_test_zip(members)).unwrap();
        fs::write(&manifest, manifest_xml).unwrap();
        Self {
            temp,
            archive,
            manifest,
        }
    }

    fn config(&self) -> VerifyConfig {
        VerifyConfig::default().with_scratch_dir(self.temp.path().join("temp"))
    }
}

#[test]
fn test_single_member_matching_entry_verifies() {
    let xml = ManifestBuilder::new("daggorath")
        .rom("f", 4, F_CRC, F_SHA1)
        .build();
    let fx = Fixture::new(vec![("f.bin", &F_BIN)], &xml);

    let report = verify_rom(&fx.archive, &fx.manifest, &fx.config()).unwrap();

    assert!(report.is_match());
    assert_eq!(report.status, VerificationStatus::Verified);
    assert_eq!(report.archive_members, vec!["f.bin"]);
    let matches: Vec<_> = report.full_matches().collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].1.entry_name, "f");
    assert_eq!(
        fs::read(fx.temp.path().join("temp").join("f.bin")).unwrap(),
        F_BIN
    );
}

#[test]
fn test_uppercase_manifest_digests_still_match() {
    let xml = ManifestBuilder::new("daggorath")
        .rom("f", 4, &F_CRC.to_uppercase(), &F_SHA1.to_uppercase())
        .build();
    let fx = Fixture::new(vec![("f.bin", &F_BIN)], &xml);

    let report = verify_rom(&fx.archive, &fx.manifest, &fx.config()).unwrap();
    assert!(report.is_match());
}

#[test]
fn test_member_differing_from_every_same_size_entry_fails() {
    let xml = ManifestBuilder::new("daggorath")
        .rom("f", 4, F_CRC, F_SHA1)
        .rom("g", 4, "deadbeef", &"0".repeat(40))
        .build();
    let fx = Fixture::new(vec![("f.bin", &[9, 9, 9, 9])], &xml);

    let report = verify_rom(&fx.archive, &fx.manifest, &fx.config()).unwrap();

    assert_eq!(report.status, VerificationStatus::ChecksumMismatch);
    assert_eq!(report.files[0].comparisons.len(), 2);
    assert_eq!(report.full_matches().count(), 0);
}

#[test]
fn test_one_matching_member_among_many_is_enough() {
    let xml = ManifestBuilder::new("daggorath")
        .rom_for("daggorath.rom", &F_BIN)
        .build();
    let fx = Fixture::new(
        vec![("readme.txt", b"not a rom"), ("roms/daggorath.rom", &F_BIN)],
        &xml,
    );

    let report = verify_rom(&fx.archive, &fx.manifest, &fx.config()).unwrap();

    assert!(report.is_match());
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.unmatched_files().count(), 1);
}

#[test]
fn test_empty_manifest_fails_without_extracting() {
    let fx = Fixture::new(
        vec![("f.bin", &F_BIN)],
        "<softwarelist><software name=\"x\"/></softwarelist>",
    );

    let report = verify_rom(&fx.archive, &fx.manifest, &fx.config()).unwrap();

    assert_eq!(report.status, VerificationStatus::NoManifestEntries);
    assert!(!fx.temp.path().join("temp").exists());
}

#[test]
fn test_corrupt_archive_is_archive_error() {
    let xml = ManifestBuilder::new("daggorath")
        .rom("f", 4, F_CRC, F_SHA1)
        .build();
    let fx = Fixture::new(vec![], &xml);
    fs::write(&fx.archive, b"PK\x03\x04 truncated garbage").unwrap();

    let err = verify_rom(&fx.archive, &fx.manifest, &fx.config()).unwrap_err();
    assert!(matches!(err, VerifyError::Archive(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_malformed_manifest_is_parse_error() {
    let fx = Fixture::new(
        vec![("f.bin", &F_BIN)],
        "<softwarelist><software><rom name=\"f\"",
    );

    let err = verify_rom(&fx.archive, &fx.manifest, &fx.config()).unwrap_err();
    assert!(err.is_manifest_error());
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_missing_archive_reported_first() {
    let temp = TempDir::new().unwrap();
    let err = verify_rom(
        temp.path().join("missing.zip"),
        temp.path().join("missing.xml"),
        &VerifyConfig::default(),
    )
    .unwrap_err();

    match err {
        VerifyError::InputNotFound { kind, path } => {
            assert_eq!(kind, InputKind::Archive);
            assert!(path.ends_with("missing.zip"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_stale_scratch_files_are_considered() {
    let xml = ManifestBuilder::new("daggorath")
        .rom("f", 4, F_CRC, F_SHA1)
        .build();
    let fx = Fixture::new(vec![("other.bin", b"xyz")], &xml);
    let scratch = fx.temp.path().join("temp");
    fs::create_dir_all(&scratch).unwrap();
    fs::write(scratch.join("left-over.bin"), F_BIN).unwrap();

    let report = verify_rom(&fx.archive, &fx.manifest, &fx.config()).unwrap();

    assert!(report.is_match());
    assert_eq!(report.archive_members, vec!["other.bin"]);
}

#[test]
fn test_hash_all_files_reports_every_digest() {
    let xml = ManifestBuilder::new("daggorath")
        .rom("f", 4, F_CRC, F_SHA1)
        .build();
    let fx = Fixture::new(vec![("a.txt", b"hello world"), ("f.bin", &F_BIN)], &xml);

    let config = fx.config().with_hash_all_files(true);
    let report = verify_rom(&fx.archive, &fx.manifest, &config).unwrap();

    assert!(report.files.iter().all(|f| f.checksums.is_some()));
    assert_eq!(
        report.files[0].checksums.as_ref().unwrap().sha1,
        "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
    );
}

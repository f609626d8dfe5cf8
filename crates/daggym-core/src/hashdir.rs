//! Local MAME hash directory setup.
//!
//! MAME looks up software lists in its `-hashpath`. The emulator is pointed
//! at a project-local copy so the files can be inspected and patched without
//! touching the system installation.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::InputKind;
use crate::Result;
use crate::VerifyError;

/// System-wide MAME hash directory.
pub const DEFAULT_SYSTEM_HASH_DIR: &str = "/usr/share/games/mame/hash";

/// Project-local hash directory.
pub const DEFAULT_LOCAL_HASH_DIR: &str = "emu/hash";

/// Software list needed by the Dungeons of Daggorath cartridge.
pub const DEFAULT_REQUIRED_FILES: &[&str] = &["coco_cart.xml"];

/// Where hash files come from, where they go, and which ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashSetupConfig {
    /// Source directory.
    pub system_dir: PathBuf,

    /// Destination directory, created if absent.
    pub local_dir: PathBuf,

    /// File names to copy.
    pub required_files: Vec<String>,
}

impl Default for HashSetupConfig {
    /// Default values:
    /// - `system_dir`: `/usr/share/games/mame/hash`
    /// - `local_dir`: `emu/hash`
    /// - `required_files`: `["coco_cart.xml"]`
    fn default() -> Self {
        Self {
            system_dir: PathBuf::from(DEFAULT_SYSTEM_HASH_DIR),
            local_dir: PathBuf::from(DEFAULT_LOCAL_HASH_DIR),
            required_files: DEFAULT_REQUIRED_FILES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl HashSetupConfig {
    /// Sets the source directory.
    #[must_use]
    pub fn with_system_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.system_dir = dir.into();
        self
    }

    /// Sets the destination directory.
    #[must_use]
    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = dir.into();
        self
    }

    /// Replaces the list of files to copy.
    #[must_use]
    pub fn with_required_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_files = files.into_iter().map(Into::into).collect();
        self
    }
}

/// What [`setup_hash_dir`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashSetupReport {
    /// Files copied into the local directory.
    pub copied: Vec<PathBuf>,

    /// Backups written before overwriting (`<name>.bak`).
    pub backed_up: Vec<PathBuf>,

    /// Required files absent from the system directory.
    pub missing: Vec<String>,
}

impl HashSetupReport {
    /// Returns `true` if every required file was copied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Copies the required hash files into the local hash directory.
///
/// A destination file that already exists is first copied to
/// `<name>.bak`, replacing any older backup, so it survives a failed copy.
///
/// # Errors
///
/// Returns [`VerifyError::InputNotFound`] with [`InputKind::HashDirectory`]
/// if the system directory does not exist, and [`VerifyError::Io`] if the
/// local directory cannot be created or a copy fails.
pub fn setup_hash_dir(config: &HashSetupConfig) -> Result<HashSetupReport> {
    if !config.system_dir.is_dir() {
        return Err(VerifyError::InputNotFound {
            kind: InputKind::HashDirectory,
            path: config.system_dir.clone(),
        });
    }

    fs::create_dir_all(&config.local_dir)?;
    let mut report = HashSetupReport::default();

    for name in &config.required_files {
        let source = config.system_dir.join(name);
        if !source.is_file() {
            tracing::warn!(file = %source.display(), "hash file not found, skipping");
            report.missing.push(name.clone());
            continue;
        }

        let destination = config.local_dir.join(name);
        if destination.exists() {
            let backup = backup_path(&destination);
            fs::copy(&destination, &backup)?;
            tracing::info!(backup = %backup.display(), "backed up existing hash file");
            report.backed_up.push(backup);
        }

        fs::copy(&source, &destination)?;
        tracing::info!(
            from = %source.display(),
            to = %destination.display(),
            "copied hash file"
        );
        report.copied.push(destination);
    }

    Ok(report)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dirs() -> (TempDir, HashSetupConfig) {
        let temp = TempDir::new().unwrap();
        let system = temp.path().join("system");
        fs::create_dir(&system).unwrap();
        let config = HashSetupConfig::default()
            .with_system_dir(&system)
            .with_local_dir(temp.path().join("emu").join("hash"));
        (temp, config)
    }

    #[test]
    fn test_default_config() {
        let config = HashSetupConfig::default();
        assert_eq!(config.system_dir, PathBuf::from("/usr/share/games/mame/hash"));
        assert_eq!(config.local_dir, PathBuf::from("emu/hash"));
        assert_eq!(config.required_files, vec!["coco_cart.xml"]);
    }

    #[test]
    fn test_copies_and_creates_local_dir() {
        let (_temp, config) = dirs();
        fs::write(config.system_dir.join("coco_cart.xml"), "<softwarelist/>").unwrap();

        let report = setup_hash_dir(&config).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.copied, vec![config.local_dir.join("coco_cart.xml")]);
        assert!(report.backed_up.is_empty());
        assert_eq!(
            fs::read_to_string(config.local_dir.join("coco_cart.xml")).unwrap(),
            "<softwarelist/>"
        );
    }

    #[test]
    fn test_existing_file_is_backed_up() {
        let (_temp, config) = dirs();
        fs::write(config.system_dir.join("coco_cart.xml"), "new").unwrap();
        fs::create_dir_all(&config.local_dir).unwrap();
        fs::write(config.local_dir.join("coco_cart.xml"), "old").unwrap();

        let report = setup_hash_dir(&config).unwrap();

        let backup = config.local_dir.join("coco_cart.xml.bak");
        assert_eq!(report.backed_up, vec![backup.clone()]);
        assert_eq!(fs::read_to_string(backup).unwrap(), "old");
        assert_eq!(
            fs::read_to_string(config.local_dir.join("coco_cart.xml")).unwrap(),
            "new"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_keeps_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, config) = dirs();
        fs::write(config.system_dir.join("coco_cart.xml"), "new").unwrap();
        fs::create_dir_all(&config.local_dir).unwrap();
        let destination = config.local_dir.join("coco_cart.xml");
        fs::write(&destination, "old").unwrap();
        fs::set_permissions(&destination, fs::Permissions::from_mode(0o444)).unwrap();

        // Root ignores file permissions; only assert when the write is refused.
        if fs::OpenOptions::new().write(true).open(&destination).is_err() {
            assert!(setup_hash_dir(&config).is_err());
            assert_eq!(fs::read_to_string(&destination).unwrap(), "old");
            assert_eq!(
                fs::read_to_string(config.local_dir.join("coco_cart.xml.bak")).unwrap(),
                "old"
            );
        }

        fs::set_permissions(&destination, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_missing_required_file_is_reported() {
        let (_temp, config) = dirs();
        let config = config.with_required_files(["coco_cart.xml", "coco_flop.xml"]);
        fs::write(config.system_dir.join("coco_cart.xml"), "x").unwrap();

        let report = setup_hash_dir(&config).unwrap();
        assert_eq!(report.missing, vec!["coco_flop.xml"]);
        assert_eq!(report.copied.len(), 1);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_missing_system_dir_is_error() {
        let temp = TempDir::new().unwrap();
        let config = HashSetupConfig::default()
            .with_system_dir(temp.path().join("nope"))
            .with_local_dir(temp.path().join("hash"));

        let err = setup_hash_dir(&config).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::InputNotFound {
                kind: InputKind::HashDirectory,
                ..
            }
        ));
        assert!(!temp.path().join("hash").exists());
    }
}

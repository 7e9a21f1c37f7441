//! Rolling backups of files we are about to rewrite
// (c) 2024 Ross Younger

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Result, StoreError};
use crate::{
    os::{AbstractPlatform as _, Platform},
    util::fs::{create_private_dir, write_atomic},
};

/// Where pre-edit copies of config files are kept.
///
/// There is exactly one backup per file name, `<dir>/<basename>.backup`, overwritten by
/// every edit. It is not a history; it holds the file as it was before the most recent
/// change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    dir: PathBuf,
}

impl Backup {
    /// Suffix of backup files (the include classifier never reads these)
    pub const SUFFIX: &'static str = ".backup";

    /// Keeps backups in the given directory
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// The platform default: `backups` in the application configuration directory
    pub fn default_location() -> Result<Self> {
        let dir = Platform::app_config_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(Self::new(dir.join("backups")))
    }

    /// The backup directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The backup file for a given config file
    #[must_use]
    pub fn path_for(&self, file: &Path) -> PathBuf {
        let base = file
            .file_name()
            .map_or_else(|| "config".into(), |n| n.to_string_lossy());
        self.dir.join(format!("{base}{}", Self::SUFFIX))
    }

    /// Stores `contents` as the backup of `file`, replacing any earlier backup
    pub(super) fn save(&self, file: &Path, contents: &[u8]) -> Result<PathBuf> {
        create_private_dir(&self.dir).map_err(|source| StoreError::DirectoryCreation {
            path: self.dir.clone(),
            source,
        })?;
        let dest = self.path_for(file);
        write_atomic(&dest, contents).map_err(StoreError::io(&dest))?;
        debug!("backed up {file:?} to {dest:?}");
        Ok(dest)
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::Backup;
    use crate::store::StoreError;

    #[test]
    fn naming() {
        let b = Backup::new("/var/backups");
        assert_eq!(
            b.path_for(Path::new("/home/me/.ssh/config")),
            Path::new("/var/backups/config.backup")
        );
        assert_eq!(
            b.path_for(Path::new("/home/me/.ssh/config.d/work")),
            Path::new("/var/backups/work.backup")
        );
    }

    #[test]
    fn overwrites() {
        let tempdir = tempfile::tempdir().unwrap();
        let b = Backup::new(tempdir.path().join("nested/backups"));
        let file = Path::new("/somewhere/config");
        let dest = b.save(file, b"first").unwrap();
        let _ = b.save(file, b"second").unwrap();
        assert_eq!(std::fs::read(dest).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(b.dir()).unwrap().count(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn uncreatable_directory() {
        let tempdir = tempfile::tempdir().unwrap();
        let blocker = tempdir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let b = Backup::new(blocker.join("backups"));
        let err = b.save(Path::new("config"), b"x").unwrap_err();
        assert!(matches!(err, StoreError::DirectoryCreation { .. }));
    }
}

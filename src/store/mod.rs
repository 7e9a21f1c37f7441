//! The ssh client configuration store
// (c) 2024 Ross Younger
//!
//! This module reads OpenSSH client configuration (following `Include` directives) into
//! [`HostRecord`]s, and edits host blocks in place.
//!
//! Nothing is cached: every call reads the files afresh.
//! Edits work on the text of the file which declares the host, and leave every line they
//! do not need to touch exactly as it was.
//!
//! # Tags
//! A comment of the form `# Tags: a, b, c` on the line immediately above a `Host` line
//! gives that host's tags.
//!
//! # Concurrency
//! Reads may happen from any thread at any time; they take no locks. Every edit takes
//! the store's [`WriteLock`] for its whole read-modify-write cycle, so edits through the
//! same store (or any store sharing its lock) never interleave. Other processes editing
//! the same files are not guarded against.

mod backup;
mod classify;
mod document;
mod errors;
mod includes;
mod lines;
mod loader;
mod lock;
mod matching;
mod multihost;
mod mutate;
pub mod options;
mod probe;
mod record;

pub use backup::Backup;
pub use errors::{Result, StoreError};
pub use lock::{WriteGuard, WriteLock};
pub use record::{HostRecord, DEFAULT_PORT};

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info};

use crate::{
    config::Configuration,
    os::{AbstractPlatform as _, Platform},
    util::fs::create_private_file,
};
use loader::Loader;

/// Access to the hosts declared by one ssh client configuration file and the files it
/// includes.
///
/// Cloning a `Store` is cheap; clones share the same [`WriteLock`].
#[derive(Debug, Clone)]
pub struct Store {
    entry: PathBuf,
    backup: Backup,
    lock: Arc<WriteLock>,
}

impl Store {
    /// A store reading from `entry`, which keeps backups in `backup`.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(entry: P, backup: Backup) -> Self {
        Self::with_lock(entry, backup, Arc::default())
    }

    /// As [`new`](Self::new), sharing a write lock with other stores
    #[must_use]
    pub fn with_lock<P: Into<PathBuf>>(entry: P, backup: Backup, lock: Arc<WriteLock>) -> Self {
        Self {
            entry: entry.into(),
            backup,
            lock,
        }
    }

    /// A store set up according to the application configuration.
    ///
    /// Unset items take platform defaults: the user's ssh config file, and the
    /// `backups` directory in the application configuration directory.
    pub fn from_config(config: &Configuration) -> Result<Self> {
        let entry = match &config.ssh_config {
            Some(p) => p.clone(),
            None => Platform::user_ssh_config().map_err(|_| StoreError::NoHomeDir)?,
        };
        let backup = match &config.backup_dir {
            Some(dir) => Backup::new(dir),
            None => Backup::default_location()?,
        };
        Ok(Self::new(entry, backup))
    }

    /// The configured entry file
    #[must_use]
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// Where backups go
    #[must_use]
    pub fn backup(&self) -> &Backup {
        &self.backup
    }

    /// The lock serialising this store's edits
    #[must_use]
    pub fn lock(&self) -> &Arc<WriteLock> {
        &self.lock
    }

    /// Creates the configured entry file if it is missing.
    fn ensure_entry(&self) -> Result<()> {
        if create_private_file(&self.entry).map_err(StoreError::creating(&self.entry))? {
            info!("created empty {:?}", self.entry);
        }
        Ok(())
    }

    /// The file to read from. Only the configured entry file is ever created.
    fn read_target(&self, path: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = path {
            return Ok(p.to_path_buf());
        }
        self.ensure_entry()?;
        Ok(self.entry.clone())
    }

    /// Every host declared by the entry file (or `path`) and everything it includes,
    /// in file order, includes expanded where they occur.
    ///
    /// # Errors
    /// Only if the file itself cannot be read. Included files which cannot be read are skipped.
    pub fn load(&self, path: Option<&Path>) -> Result<Vec<HostRecord>> {
        let path = self.read_target(path)?;
        let hosts = Loader::run(&path)?.into_hosts();
        debug!("loaded {} hosts from {path:?}", hosts.len());
        Ok(hosts)
    }

    /// The first host called `name`, in load order
    pub fn find(&self, name: &str, path: Option<&Path>) -> Result<Option<HostRecord>> {
        Ok(self.load(path)?.into_iter().find(|h| h.name == name))
    }

    /// Does `name` exist as a host?
    ///
    /// Always gives the same answer as looking for `name` in [`load`](Self::load), but
    /// stops reading as soon as it knows. Suitable for latency-sensitive callers.
    pub fn quick_exists(&self, name: &str, path: Option<&Path>) -> Result<bool> {
        if path.is_none() && !self.entry.exists() {
            return Ok(false);
        }
        probe::quick_exists(path.unwrap_or(&self.entry), name)
    }

    /// Every file reached from the entry file (or `base`) through `Include` directives,
    /// starting with the entry file itself.
    pub fn list_config_files(&self, base: Option<&Path>) -> Result<Vec<PathBuf>> {
        let path = self.read_target(base)?;
        Ok(Loader::run(&path)?.into_files())
    }

    /// Does `name` share its `Host` line in `path` with other names?
    ///
    /// Returns the answer and every name on that line; `(false, [])` if there is no such line.
    /// Includes are not followed.
    pub fn is_multi_host(&self, name: &str, path: &Path) -> Result<(bool, Vec<String>)> {
        multihost::is_multi_host(path, name)
    }

    /// The file an edit applies to, if not given explicitly
    fn edit_target(&self, record: &HostRecord, path: Option<&Path>) -> PathBuf {
        match path {
            Some(p) => p.to_path_buf(),
            None if !record.source_file.as_os_str().is_empty() => record.source_file.clone(),
            None => self.entry.clone(),
        }
    }

    /// The file declaring `name`, found by loading
    fn source_of(&self, name: &str) -> Result<PathBuf> {
        self.find(name, None)?
            .map(|h| h.source_file)
            .ok_or_else(|| StoreError::not_found(name, &self.entry))
    }

    /// Adds a new host.
    ///
    /// It goes at the end of `path`, else of the record's `source_file`, else of the
    /// entry file. The file is created if need be.
    ///
    /// # Errors
    /// [`StoreError::AlreadyExists`] if that file already declares the name.
    pub fn add(&self, record: &HostRecord, path: Option<&Path>) -> Result<()> {
        let target = self.edit_target(record, path);
        let guard = self.lock.acquire();
        mutate::add(&guard, &self.backup, &target, record)
    }

    /// Replaces the host `name` with `record`, possibly renaming it.
    ///
    /// The file edited is `path`, else the record's `source_file`, else the file that
    /// declares `name`.
    pub fn update(&self, name: &str, record: &HostRecord, path: Option<&Path>) -> Result<()> {
        let target = match (path, record.source_file.as_os_str().is_empty()) {
            (None, true) => self.source_of(name)?,
            _ => self.edit_target(record, path),
        };
        let guard = self.lock.acquire();
        mutate::update(&guard, &self.backup, &target, name, record)
    }

    /// Removes the host `name` from `path`, or from whichever file declares it.
    pub fn delete(&self, name: &str, path: Option<&Path>) -> Result<()> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => self.source_of(name)?,
        };
        let guard = self.lock.acquire();
        mutate::delete(&guard, &self.backup, &target, name)
    }

    /// Moves the host `name` from the file declaring it to `target`.
    ///
    /// # Errors
    /// [`StoreError::MoveIncomplete`] if the host was added to `target` but could be
    /// removed from neither file.
    pub fn move_host(&self, name: &str, target: &Path) -> Result<()> {
        let record = self
            .find(name, None)?
            .ok_or_else(|| StoreError::not_found(name, &self.entry))?;
        let from = record.source_file.clone();
        let guard = self.lock.acquire();
        mutate::move_host(&guard, &self.backup, &record, &from, target)
    }

    /// Replaces the block declaring any of `originals` with `record`, declared as
    /// `Host <new_names...>`.
    pub fn update_multi_host_block(
        &self,
        originals: &[String],
        record: &HostRecord,
        new_names: &[String],
        path: Option<&Path>,
    ) -> Result<()> {
        let target = self.edit_target(record, path);
        let guard = self.lock.acquire();
        mutate::update_multi_host_block(
            &guard,
            &self.backup,
            &target,
            originals,
            record,
            new_names,
        )
    }
}

///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use std::{
        path::Path,
        sync::Arc,
        thread,
    };

    use tempfile::TempDir;

    use super::{Backup, HostRecord, Store, StoreError};
    use crate::config::Configuration;

    fn store_in(dir: &TempDir) -> Store {
        Store::new(
            dir.path().join("ssh/config"),
            Backup::new(dir.path().join("backups")),
        )
    }

    fn write(path: &Path, text: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn entry_is_created_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.quick_exists("a", None).unwrap());
        assert!(store.load(None).unwrap().is_empty());
        assert!(store.entry().is_file());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode(store.entry()), 0o600);
            assert_eq!(mode(store.entry().parent().unwrap()), 0o700);
        }
    }

    #[test]
    fn explicit_paths_are_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let other = dir.path().join("other");
        let err = store.load(Some(&other)).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!other.exists());
        let _ = store.quick_exists("x", Some(&other)).unwrap_err();
    }

    #[test]
    fn edits_follow_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let work = dir.path().join("ssh/config.d/work");
        write(store.entry(), "Include config.d/*\n\nHost home\n");
        write(&work, "Host office\n    User me\n");

        assert_eq!(
            store.list_config_files(None).unwrap(),
            vec![store.entry().to_path_buf(), work.clone()]
        );

        let mut office = store.find("office", None).unwrap().unwrap();
        assert_eq!(office.source_file, work);
        office.user = "someone".into();
        store.update("office", &office, None).unwrap();
        assert_eq!(
            std::fs::read_to_string(&work).unwrap(),
            "Host office\n    User someone\n"
        );

        store.delete("office", None).unwrap();
        assert_eq!(std::fs::read_to_string(&work).unwrap(), "");
        assert!(!store.quick_exists("office", None).unwrap());
        let err = store.delete("office", None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn add_defaults_to_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.add(&HostRecord::new("fresh"), None).unwrap();
        assert!(store.quick_exists("fresh", None).unwrap());
        let err = store.add(&HostRecord::new("fresh"), None).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[test]
    fn move_and_multi_host() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let extra = dir.path().join("ssh/extra");
        write(store.entry(), "Include extra\nHost a b\n    User shared\n");
        write(&extra, "");

        assert_eq!(
            store.is_multi_host("a", store.entry()).unwrap(),
            (true, vec!["a".into(), "b".into()])
        );
        store.move_host("b", &extra).unwrap();
        assert_eq!(
            store.is_multi_host("a", store.entry()).unwrap(),
            (false, vec!["a".into()])
        );
        let b = store.find("b", None).unwrap().unwrap();
        assert_eq!(b.source_file, extra);
        assert_eq!(b.user, "shared");

        let err = store.move_host("zzz", &extra).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn multi_host_rewrite_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        write(store.entry(), "Host a b\n    User shared\n");
        let record = HostRecord {
            user: "pool".into(),
            ..Default::default()
        };
        store
            .update_multi_host_block(&["b".into()], &record, &["b".into(), "c".into()], None)
            .unwrap();
        let names: Vec<_> = store
            .load(None)
            .unwrap()
            .into_iter()
            .map(|h| (h.name, h.user))
            .collect();
        assert_eq!(
            names,
            vec![("b".into(), "pool".into()), ("c".into(), "pool".into())]
        );
    }

    #[test]
    fn concurrent_adds_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let _ = store.load(None).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || store.add(&HostRecord::new(&format!("h{i}")), None))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert_eq!(store.load(None).unwrap().len(), 8);
        assert!(Arc::ptr_eq(store.lock(), store.clone().lock()));
    }

    #[test]
    fn from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Configuration {
            ssh_config: Some(dir.path().join("cfg")),
            backup_dir: Some(dir.path().join("bk")),
        };
        let store = Store::from_config(&config).unwrap();
        assert_eq!(store.entry(), dir.path().join("cfg"));
        assert_eq!(store.backup().dir(), dir.path().join("bk"));
    }
}

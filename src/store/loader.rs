//! Reading an ssh config file and everything it includes into host records
// (c) 2024 Ross Younger

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tracing::{trace, warn};

use super::{
    includes::{find_include_files, Visited},
    lines::Line,
    matching::concrete_names,
    HostRecord, Result, StoreError,
};

/// Reads a config file for a traversal.
///
/// Shared by every traversal so that they all agree on which files are readable.
pub(super) fn read_config(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

/// The absolute form of a path, for reporting where a host lives
pub(super) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// A host block being read, not yet expanded into one record per name
struct OpenBlock {
    names: Vec<String>,
    record: HostRecord,
    /// Keywords already applied to the record
    seen: HashSet<String>,
}

/// The business end of reading a config file and its includes.
#[derive(Debug, Default)]
pub(super) struct Loader {
    visited: Visited,
    /// Files successfully read, in traversal order
    files: Vec<PathBuf>,
    hosts: Vec<HostRecord>,
}

impl Loader {
    /// Reads `entry` and everything it includes.
    ///
    /// Only a failure to read `entry` itself is an error; included files which cannot
    /// be read contribute no hosts.
    pub(super) fn run(entry: &Path) -> Result<Self> {
        let entry = absolute(entry);
        let text = read_config(&entry).map_err(StoreError::io(&entry))?;
        let mut loader = Self::default();
        let _ = loader.visited.claim(&entry);
        loader.parse(&entry, &text);
        Ok(loader)
    }

    pub(super) fn into_hosts(self) -> Vec<HostRecord> {
        self.hosts
    }

    pub(super) fn into_files(self) -> Vec<PathBuf> {
        self.files
    }

    fn parse(&mut self, path: &Path, text: &str) {
        self.files.push(path.to_path_buf());
        let mut current: Option<OpenBlock> = None;
        let mut pending_tags: Option<Vec<String>> = None;

        for raw in text.lines() {
            // a tag comment only counts if it is the line immediately above the Host
            let tags = pending_tags.take();
            match Line::parse(raw) {
                Line::Blank | Line::Comment => (),
                Line::Tags(t) => pending_tags = Some(t),
                Line::Host(args) => {
                    self.flush(current.take());
                    let names: Vec<String> = concrete_names(&args).map(str::to_owned).collect();
                    if names.is_empty() {
                        trace!("skipping pattern-only Host {args:?} in {path:?}");
                        continue;
                    }
                    let record = HostRecord {
                        tags: tags.unwrap_or_default(),
                        source_file: path.to_path_buf(),
                        ..Default::default()
                    };
                    current = Some(OpenBlock {
                        names,
                        record,
                        seen: HashSet::new(),
                    });
                }
                Line::Match => self.flush(current.take()),
                Line::Include(args) => {
                    for arg in &args {
                        self.include(arg, path);
                    }
                }
                Line::Generic { keyword, value } => {
                    if let Some(block) = current.as_mut() {
                        let repeated = !block.seen.insert(keyword.clone());
                        block.record.apply(&keyword, &value, raw.trim(), repeated);
                    }
                }
            }
        }
        self.flush(current);
    }

    fn include(&mut self, arg: &str, from: &Path) {
        for file in find_include_files(arg, from) {
            if !self.visited.claim(&file) {
                trace!("already read {file:?}, not including it again");
                continue;
            }
            match read_config(&file) {
                Ok(text) => self.parse(&file, &text),
                Err(e) => warn!("skipping included file {file:?}: {e}"),
            }
        }
    }

    /// Expands a finished block into one record per name
    fn flush(&mut self, block: Option<OpenBlock>) {
        let Some(OpenBlock { names, record, .. }) = block else {
            return;
        };
        for name in names {
            self.hosts.push(HostRecord {
                name,
                ..record.clone()
            });
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////

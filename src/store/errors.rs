//! Error types for store operations
// (c) 2024 Ross Younger

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::matching::is_pattern;

/// Error type for configuration store operations.
///
/// Failures inside included files are never reported here: a broken include
/// simply contributes no hosts.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The host to update, delete or move is not declared in the file.
    #[error("host `{name}` not found in {}", .path.display())]
    NotFound {
        /// The host name we looked for
        name: String,
        /// The physical file we searched
        path: PathBuf,
    },

    /// The host name is already declared in the destination file.
    #[error("host `{name}` already exists in {}", .path.display())]
    AlreadyExists {
        /// The conflicting host name
        name: String,
        /// The physical file which already declares it
        path: PathBuf,
    },

    /// Reading or writing a configuration or backup file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// The file concerned
        path: PathBuf,
        /// Underlying cause
        source: io::Error,
    },

    /// The host name is empty or a pattern, so could never be looked up again.
    #[error("`{name}` is not a valid host name")]
    InvalidName {
        /// The rejected name
        name: String,
    },

    /// The application or backup directory could not be created.
    #[error("could not create directory {}: {source}", .path.display())]
    DirectoryCreation {
        /// The directory concerned
        path: PathBuf,
        /// Underlying cause
        source: io::Error,
    },

    /// Home directory not found.
    #[error("could not determine home directory")]
    NoHomeDir,

    /// A move added the host to its destination, then failed to remove it from the
    /// source and could not undo the addition. The host is now declared in both files.
    #[error("moving host `{name}` left it in both {} and {}", .from.display(), .to.display())]
    MoveIncomplete {
        /// The host being moved
        name: String,
        /// The file it was being moved from
        from: PathBuf,
        /// The file it was being moved to
        to: PathBuf,
    },
}

impl StoreError {
    /// Helper for `map_err` on file operations
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Helper for `map_err` when creating a file: blames its directory if that is missing
    pub(crate) fn creating(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| match path.parent().filter(|d| !d.as_os_str().is_empty() && !d.exists()) {
            Some(dir) => Self::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            },
            None => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub(crate) fn not_found(name: &str, path: &Path) -> Self {
        Self::NotFound {
            name: name.to_owned(),
            path: path.to_path_buf(),
        }
    }

    /// Rejects names which a `Host` line would treat as a pattern
    pub(crate) fn check_name(name: &str) -> Result<()> {
        if is_pattern(name) {
            return Err(Self::InvalidName {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    pub(crate) fn already_exists(name: &str, path: &Path) -> Self {
        Self::AlreadyExists {
            name: name.to_owned(),
            path: path.to_path_buf(),
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

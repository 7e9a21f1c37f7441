//! OS abstraction layer
// (c) 2024 Ross Younger

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::Result;

/// General platform abstraction trait.
/// The active implementation should be pulled into this crate
/// Implementations should be called `Platform`, e.g. [unix::Platform].
///
/// Usage:
/// ```
///    use sshdir::os::Platform;
///    use sshdir::os::AbstractPlatform as _;
///    println!("{:?}", Platform::user_ssh_config());
/// ```
pub trait AbstractPlatform {
    /// Path to the user ssh config file.
    /// On most platforms this will be `${HOME}/.ssh/config`
    /// # Note
    /// This is a _theoretical_ path construction; it does not guarantee that the path actually exists.
    /// That is up to the caller to determine and reason about.
    /// # Errors
    /// If the current user's home directory could not be determined
    fn user_ssh_config() -> Result<PathBuf>;

    /// The directory to store our own files in (application configuration, backups).
    ///
    /// If somehow we could not determine the directory to use, returns None (and may emit a warning).
    fn app_config_dir() -> Option<PathBuf>;

    /// The absolute path to the application configuration file.
    ///
    /// If somehow we could not determine the path to use, returns None (and may emit a warning).
    fn config_path() -> Option<PathBuf>;

    /// Restricts a file or directory we created to the current user
    /// (0600 for files, 0700 for directories, on Unix).
    /// # Errors
    /// If the permissions could not be changed
    fn make_private(path: &Path) -> io::Result<()>;
}

#[cfg(any(unix, doc))]
mod unix;

#[cfg(any(unix, doc))]
pub use unix::*;

static_assertions::assert_cfg!(unix, "This OS is not yet supported");

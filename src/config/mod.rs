// (c) 2024 Ross Younger
//! # Configuration management
//!
//! sshdir obtains its own run-time configuration from the following sources, in order:
//! 1. Environment variables prefixed `SSHDIR_` (e.g. `SSHDIR_SSH_CONFIG`)
//! 2. The user's configuration file (typically `~/.config/sshdir/config.json`)
//! 3. Hard-wired defaults
//!
//! Each option may appear in multiple places, but only the first match is used.
//!
//! **Note** Configuration file locations are platform-dependent.
//! To see what applies on the current platform, run `sshdir show-config`.
//!
//! ## File format
//!
//! The configuration file is a JSON object.
//!
//! ### Example
//!
//! ```text
//! {
//!     "ssh_config": "/home/me/dotfiles/ssh/config",
//!     "backup_dir": "/home/me/.local/state/sshdir"
//! }
//! ```
//!
//! ## Configurable options
//!
//! The full list of supported fields is defined by [Configuration].
//! The ssh configuration files themselves are not configuration in this sense; they
//! are the data managed by the [store](crate::store).

mod structure;
pub use structure::Configuration;

mod manager;
pub use manager::Manager;

/// Name of our directory within the platform's configuration directory
pub(crate) const APP_DIR_NAME: &str = "sshdir";

/// Name of the configuration file within our directory
pub(crate) const BASE_CONFIG_FILENAME: &str = "config.json";

/// Prefix of the environment variables we read
pub(crate) const ENV_PREFIX: &str = "SSHDIR_";

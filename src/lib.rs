//! sshdir: a directory engine for OpenSSH client configuration
// (c) 2024 Ross Younger
//!
//! The heart of this crate is the [store], which reads host entries out of an ssh client
//! config file and everything it includes, and edits them in place without disturbing
//! anything else in the files.
//!
//! ```no_run
//! use sshdir::{Backup, HostRecord, Store};
//!
//! # fn main() -> sshdir::Result<()> {
//! let store = Store::new("/home/me/.ssh/config", Backup::new("/home/me/.config/sshdir/backups"));
//! for host in store.load(None)? {
//!     println!("{} -> {}", host.name, host.hostname);
//! }
//! let mut web = HostRecord::new("web");
//! web.hostname = "web.example.com".into();
//! store.add(&web, None)?;
//! # Ok(())
//! # }
//! ```

mod cli;
pub use cli::cli;
pub mod config;
/// OS abstraction layer
pub mod os;
pub mod store;
/// Utilities
pub mod util;

pub use store::{Backup, HostRecord, Result, Store, StoreError, WriteLock};

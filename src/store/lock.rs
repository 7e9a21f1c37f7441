//! Serialisation of writers
// (c) 2024 Ross Younger

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Serialises every change to the config files.
///
/// All mutating operations of a [`Store`](super::Store) take this lock for their whole
/// read-modify-write sequence. Stores that share a lock (see
/// [`Store::with_lock`](super::Store::with_lock)) never interleave their edits.
/// Readers do not take it.
#[derive(Debug, Default)]
pub struct WriteLock {
    inner: Mutex<()>,
}

/// Proof that the [`WriteLock`] is held. Released on drop.
#[derive(Debug)]
pub struct WriteGuard<'a> {
    _inner: MutexGuard<'a, ()>,
}

impl WriteLock {
    /// Standard constructor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the lock is ours.
    ///
    /// A writer that panicked part way through leaves nothing half-done in memory
    /// (every edit starts from a fresh read of the file), so a poisoned lock is simply
    /// taken over.
    pub fn acquire(&self) -> WriteGuard<'_> {
        WriteGuard {
            _inner: self.inner.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

//! File writing helpers
// (c) 2024 Ross Younger

use std::{
    fs,
    io::{self, Write as _},
    path::Path,
};

use crate::os::{AbstractPlatform as _, Platform};

/// Replaces the contents of `path` without ever leaving it half-written.
///
/// The data goes to a temporary file in the same directory, which is flushed to disk
/// and then renamed over the target. If `path` is a symlink, the file it points to is
/// replaced and the link is left alone. An existing file's permissions carry over; a
/// new file is created readable by the owner only.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(&target).map(|m| m.permissions()).ok();

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        fs::set_permissions(temp.path(), permissions)?;
    }
    let _ = temp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

/// Creates a directory (and its parents) if it does not exist.
/// Directories we create are private to the current user.
pub fn create_private_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    Platform::make_private(dir)
}

/// Creates an empty file, private to the current user, if it does not exist.
/// Its directory is created too if need be.
///
/// Returns whether the file was created.
pub fn create_private_file(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_private_dir(parent)?;
    }
    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => (),
        // somebody beat us to it
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    }
    Platform::make_private(path)?;
    Ok(true)
}

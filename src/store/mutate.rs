//! In-place edits of host blocks
// (c) 2024 Ross Younger
//!
//! Every operation here starts from a fresh read of the file, works on its lines, and
//! writes the whole file back atomically. Nothing is written unless the edit can be made
//! in full; the original bytes are saved as the rolling backup just before the write.

use std::path::Path;

use tracing::{debug, info, warn};

use super::{
    backup::Backup,
    document::Document,
    loader::{absolute, read_config},
    lock::WriteGuard,
    HostRecord, Result, StoreError,
};
use crate::util::fs::{create_private_file, write_atomic};

/// Read, edit, back up, write.
fn edit<F>(backup: &Backup, path: &Path, change: F) -> Result<()>
where
    F: FnOnce(&mut Document) -> Result<()>,
{
    let original = read_config(path).map_err(StoreError::io(path))?;
    let mut doc = Document::parse(&original);
    change(&mut doc)?;
    let _ = backup.save(path, original.as_bytes())?;
    write_atomic(path, doc.render().as_bytes()).map_err(StoreError::io(path))
}

/// The names of a block other than `name`
fn siblings(names: &[String], name: &str) -> Vec<String> {
    names.iter().filter(|n| *n != name).cloned().collect()
}

/// Appends a new host block to `path`, creating the file if need be.
pub(super) fn add(
    _lock: &WriteGuard<'_>,
    backup: &Backup,
    path: &Path,
    record: &HostRecord,
) -> Result<()> {
    StoreError::check_name(&record.name)?;
    if create_private_file(path).map_err(StoreError::creating(path))? {
        debug!("created {path:?}");
    }
    edit(backup, path, |doc| {
        if doc.declares_elsewhere(&record.name, None) {
            return Err(StoreError::already_exists(&record.name, path));
        }
        doc.append(record.render());
        Ok(())
    })?;
    info!("added host {} to {path:?}", record.name);
    Ok(())
}

/// Replaces the host `name` in `path` with `record`, which may rename it.
///
/// If `name` shares its `Host` line with others, it is taken out of that line and
/// `record` becomes a block of its own directly after the shared one.
pub(super) fn update(
    _lock: &WriteGuard<'_>,
    backup: &Backup,
    path: &Path,
    name: &str,
    record: &HostRecord,
) -> Result<()> {
    StoreError::check_name(&record.name)?;
    edit(backup, path, |doc| {
        let block = doc
            .find(name)
            .ok_or_else(|| StoreError::not_found(name, path))?;
        if record.name != name && doc.declares_elsewhere(&record.name, None) {
            return Err(StoreError::already_exists(&record.name, path));
        }
        let others = siblings(&block.names, name);
        if others.is_empty() {
            doc.replace(&block, record.render());
        } else {
            doc.set_names(&block, &others);
            doc.insert_after(&block, record.render());
        }
        Ok(())
    })?;
    info!("updated host {name} in {path:?}");
    Ok(())
}

/// Removes the host `name` from `path`.
///
/// A block shared with other names keeps its body; only `name` leaves its `Host` line.
pub(super) fn delete(
    _lock: &WriteGuard<'_>,
    backup: &Backup,
    path: &Path,
    name: &str,
) -> Result<()> {
    edit(backup, path, |doc| {
        let block = doc
            .find(name)
            .ok_or_else(|| StoreError::not_found(name, path))?;
        let others = siblings(&block.names, name);
        if others.is_empty() {
            doc.remove(&block);
        } else {
            doc.set_names(&block, &others);
        }
        Ok(())
    })?;
    info!("deleted host {name} from {path:?}");
    Ok(())
}

/// Moves `record` from `from` to `to`: adds it to `to`, then deletes it from `from`.
///
/// If the delete fails, the addition is undone and the delete's error returned.
/// If that fails too the host is left in both files, which is reported as
/// [`StoreError::MoveIncomplete`].
pub(super) fn move_host(
    lock: &WriteGuard<'_>,
    backup: &Backup,
    record: &HostRecord,
    from: &Path,
    to: &Path,
) -> Result<()> {
    let name = &record.name;
    if same_file(from, to) {
        debug!("{name} is already in {to:?}");
        return Ok(());
    }
    add(lock, backup, to, record)?;
    if let Err(e) = delete(lock, backup, from, name) {
        warn!("could not remove {name} from {from:?} ({e}); undoing the move");
        let undo = delete(lock, backup, to, name);
        return Err(failed_move(e, undo, name, from, to));
    }
    info!("moved host {name} from {from:?} to {to:?}");
    Ok(())
}

/// The error to report for a move whose source delete failed with `cause`,
/// given the outcome of removing the host from its destination again
fn failed_move(
    cause: StoreError,
    undo: Result<()>,
    name: &str,
    from: &Path,
    to: &Path,
) -> StoreError {
    match undo {
        Ok(()) => cause,
        Err(undo) => {
            warn!("could not remove {name} from {to:?}: {undo}");
            StoreError::MoveIncomplete {
                name: name.to_owned(),
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            }
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => absolute(a) == absolute(b),
    }
}

/// Replaces the whole block declaring any of `originals` with `record`, declared under
/// `new_names`. An empty `new_names` removes the block.
pub(super) fn update_multi_host_block(
    _lock: &WriteGuard<'_>,
    backup: &Backup,
    path: &Path,
    originals: &[String],
    record: &HostRecord,
    new_names: &[String],
) -> Result<()> {
    for name in new_names {
        StoreError::check_name(name)?;
    }
    edit(backup, path, |doc| {
        let block = doc
            .find_any(originals)
            .ok_or_else(|| StoreError::not_found(&originals.join(" "), path))?;
        if let Some(taken) = new_names
            .iter()
            .find(|n| doc.declares_elsewhere(n, Some(&block)))
        {
            return Err(StoreError::already_exists(taken, path));
        }
        if new_names.is_empty() {
            doc.remove(&block);
        } else {
            doc.replace(&block, record.render_as(new_names));
        }
        Ok(())
    })?;
    info!(
        "rewrote host block {} as {} in {path:?}",
        originals.join(" "),
        new_names.join(" ")
    );
    Ok(())
}

///////////////////////////////////////////////////////////////////////////////////////

//! Include directive logic
// (c) 2024 Ross Younger

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use glob::{glob_with, MatchOptions};
use tracing::{debug, trace};

use super::classify::is_config_fragment;

/// The set of files already read during one traversal.
///
/// Paths are canonicalised before comparison, so a file reached through a symlink or
/// `..` is still recognised. Every file is read at most once per traversal, which is
/// what stops include cycles.
#[derive(Debug, Default)]
pub(super) struct Visited {
    seen: HashSet<PathBuf>,
}

impl Visited {
    /// Records that we are about to read `path`.
    /// Returns false if it has already been read in this traversal.
    pub(super) fn claim(&mut self, path: &Path) -> bool {
        let key = std::fs::canonicalize(path)
            .or_else(|_| std::path::absolute(path))
            .unwrap_or_else(|_| path.to_path_buf());
        self.seen.insert(key)
    }
}

/// Wildcard matching and ~ expansion for Include directives.
///
/// Relative paths are taken relative to the directory of the including file.
/// Matches are returned in lexical order, already filtered to plausible config fragments.
/// An expression which cannot be expanded contributes nothing.
pub(super) fn find_include_files(arg: &str, including_file: &Path) -> Vec<PathBuf> {
    let mut path = if arg.starts_with('~') {
        match expanduser::expanduser(arg) {
            Ok(p) => p,
            Err(e) => {
                debug!("could not expand include expression {arg}: {e}");
                return Vec::new();
            }
        }
    } else {
        PathBuf::from(arg)
    };
    if !path.is_absolute() {
        let base = including_file.parent().unwrap_or_else(|| Path::new("."));
        path = base.join(path);
    }

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_leading_dot: true,
        require_literal_separator: true,
    };
    let entries = match glob_with(path.to_string_lossy().as_ref(), options) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("bad include pattern {path:?} in {including_file:?}: {e}");
            return Vec::new();
        }
    };
    let mut result: Vec<PathBuf> = entries.flatten().collect();
    result.sort();
    result.retain(|p| is_config_fragment(p));
    trace!("include {arg} from {including_file:?} -> {result:?}");
    result
}

///////////////////////////////////////////////////////////////////////////////////////

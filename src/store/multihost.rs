//! Detection of host blocks that declare several names
// (c) 2024 Ross Younger

use std::path::Path;

use super::{document::Document, loader::read_config, Result, StoreError};

/// Does `name` share its `Host` line with other names in `path`?
///
/// Only `path` itself is examined; includes are not followed.
/// Returns every argument of the first `Host` line declaring `name` (in file order,
/// patterns included) alongside the answer, or `(false, [])` if no such line exists.
pub(super) fn is_multi_host(path: &Path, name: &str) -> Result<(bool, Vec<String>)> {
    let text = read_config(path).map_err(StoreError::io(path))?;
    Ok(match Document::parse(&text).find(name) {
        Some(block) => (block.names.len() > 1, block.names),
        None => (false, Vec::new()),
    })
}

#[cfg(test)]
mod test {
    use super::is_multi_host;
    use crate::util::make_test_tempfile;

    #[test]
    fn detection() {
        let (path, _dir) = make_test_tempfile(
            "Host solo\n    User a\n\nHost web1 web2 *.web\n    User b\n\nHost solo\n",
            "config",
        );
        assert_eq!(is_multi_host(&path, "solo").unwrap(), (false, vec!["solo".into()]));
        let (multi, names) = is_multi_host(&path, "web2").unwrap();
        assert!(multi);
        assert_eq!(names, vec!["web1", "web2", "*.web"]);
        assert_eq!(is_multi_host(&path, "absent").unwrap(), (false, Vec::new()));
        assert_eq!(is_multi_host(&path, "*.web").unwrap(), (false, Vec::new()));
    }

    #[test]
    fn does_not_follow_includes() {
        let tempdir = tempfile::tempdir().unwrap();
        std::fs::write(tempdir.path().join("other"), "Host a b\n").unwrap();
        let main = tempdir.path().join("config");
        std::fs::write(&main, "Include other\n").unwrap();
        assert_eq!(is_multi_host(&main, "a").unwrap(), (false, Vec::new()));
    }
}

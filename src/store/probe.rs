//! Fast host existence check
// (c) 2024 Ross Younger

use std::path::Path;

use super::{
    includes::{find_include_files, Visited},
    lines::{arguments, split_keyword},
    loader::{absolute, read_config},
    matching::declares,
    Result, StoreError,
};

/// Does `name` appear as a host anywhere in `entry` or the files it includes?
///
/// This follows exactly the same traversal rules as the loader (include resolution,
/// classification, cycle detection, pattern filtering) but stops at the first match and
/// builds no records. Only the lines' keywords are examined until a `Host` or `Include`
/// turns up.
pub(super) fn quick_exists(entry: &Path, name: &str) -> Result<bool> {
    let entry = absolute(entry);
    let text = read_config(&entry).map_err(StoreError::io(&entry))?;
    let mut visited = Visited::default();
    let _ = visited.claim(&entry);
    Ok(probe(&entry, &text, name, &mut visited))
}

fn probe(path: &Path, text: &str, name: &str, visited: &mut Visited) -> bool {
    for line in text.lines() {
        let Some((keyword, rest)) = split_keyword(line) else {
            continue;
        };
        if keyword.eq_ignore_ascii_case("host") {
            if declares(&arguments(rest), name) {
                return true;
            }
        } else if keyword.eq_ignore_ascii_case("include") {
            for arg in arguments(rest) {
                for file in find_include_files(&arg, path) {
                    if !visited.claim(&file) {
                        continue;
                    }
                    if let Ok(included) = read_config(&file) {
                        if probe(&file, &included, name, visited) {
                            return true;
                        }
                    }
                }
            }
        }
    }
    false
}

///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use std::{collections::HashSet, path::Path};

    use super::quick_exists;
    use crate::{store::loader::Loader, util::make_test_tempfile};

    #[test]
    fn finds_hosts() {
        let (path, _dir) = make_test_tempfile(
            "Host a b\n    HostName x\nHost *.wild\nhost=c\n# Host commented\n",
            "config",
        );
        for (name, expected) in [
            ("a", true),
            ("b", true),
            ("c", true),
            ("*.wild", false),
            ("x.wild", false),
            ("commented", false),
            ("nope", false),
        ] {
            assert_eq!(quick_exists(&path, name).unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn missing_entry_is_an_error() {
        let tempdir = tempfile::tempdir().unwrap();
        let _ = quick_exists(&tempdir.path().join("nope"), "a").unwrap_err();
    }

    /// Every host the loader finds must be found by the probe, and nothing else.
    fn assert_parity(entry: &Path, candidates: &[String]) {
        let loaded: HashSet<String> = Loader::run(entry)
            .unwrap()
            .into_hosts()
            .into_iter()
            .map(|h| h.name)
            .collect();
        for name in candidates {
            assert_eq!(
                quick_exists(entry, name).unwrap(),
                loaded.contains(name),
                "parity failure for {name} from {entry:?}"
            );
        }
    }

    #[test]
    fn parity_with_cycles_and_globs() {
        let tempdir = tempfile::tempdir().unwrap();
        let d = tempdir.path();
        std::fs::create_dir(d.join("conf.d")).unwrap();
        std::fs::write(d.join("config"), "Include conf.d/*\nHost top\n").unwrap();
        std::fs::write(d.join("conf.d/one"), "Include ../config\nHost one uno\n").unwrap();
        std::fs::write(d.join("conf.d/two"), "Host *.two\nInclude one\n").unwrap();
        std::fs::write(d.join("conf.d/notes.md"), "Host hidden-in-markdown\n").unwrap();
        let candidates: Vec<String> = ["top", "one", "uno", "*.two", "hidden-in-markdown", "zzz"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_parity(&d.join("config"), &candidates);
    }

    #[test]
    fn parity_on_random_include_graphs() {
        const FILES: usize = 6;
        let mut rng = fastrand::Rng::with_seed(0x55_4844_4952);
        for _round in 0..25 {
            let tempdir = tempfile::tempdir().unwrap();
            let mut candidates = Vec::new();
            for i in 0..FILES {
                let mut text = String::new();
                for j in 0..rng.usize(0..4) {
                    let name = format!("h{i}-{j}");
                    match rng.u8(0..4) {
                        0 => text.push_str(&format!("Host {name} {name}-alias\n")),
                        1 => text.push_str(&format!("Host *.{name}\n")),
                        _ => text.push_str(&format!("Host {name}\n    User u{j}\n")),
                    }
                    candidates.push(format!("{name}-alias"));
                    candidates.push(name);
                    if rng.bool() {
                        text.push_str(&format!("Include f{}\n", rng.usize(0..FILES)));
                    }
                }
                if rng.u8(0..5) == 0 {
                    text.push_str("Include f*\n");
                }
                std::fs::write(tempdir.path().join(format!("f{i}")), text).unwrap();
            }
            assert_parity(&tempdir.path().join("f0"), &candidates);
        }
    }
}

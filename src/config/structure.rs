//! Configuration structure
// (c) 2024 Ross Younger

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The set of configurable options supported by sshdir.
///
/// **Note:** The implementation of `default()` for this struct returns the hard-wired
/// defaults, which leave every item to be worked out from the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Configuration {
    /// The ssh client configuration file to read and edit.
    /// [default: `~/.ssh/config`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_config: Option<PathBuf>,

    /// Where to keep the rolling backups of files we edit.
    /// [default: `backups` in the application configuration directory]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

/// Field names, for pretty-printing
pub(crate) const FIELD_NAMES: &[&str] = &["ssh_config", "backup_dir"];

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::Configuration;

    #[test]
    fn json_shape() {
        let c = Configuration {
            ssh_config: Some(PathBuf::from("/x/config")),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&c).unwrap(),
            r#"{"ssh_config":"/x/config"}"#
        );
        let back: Configuration = serde_json::from_str(r#"{"backup_dir":"/b"}"#).unwrap();
        assert_eq!(back.backup_dir, Some(PathBuf::from("/b")));
        assert!(back.ssh_config.is_none());
    }
}

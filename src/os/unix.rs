// OS abstraction layer for sshdir - Unix implementation
// (c) 2024 Ross Younger

use std::{
    fs::Permissions,
    io,
    os::unix::fs::PermissionsExt as _,
    path::{Path, PathBuf},
};

use tracing::warn;

use super::AbstractPlatform;
use crate::config::{APP_DIR_NAME, BASE_CONFIG_FILENAME};

const PRIVATE_FILE_MODE: u32 = 0o600;
const PRIVATE_DIR_MODE: u32 = 0o700;

#[derive(Debug, Clone, Copy)]
/// Concretions for Unix platforms
pub struct Platform {}

impl AbstractPlatform for Platform {
    fn user_ssh_config() -> anyhow::Result<PathBuf> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("could not determine home directory");
        };
        Ok(home.join(".ssh").join("config"))
    }

    fn app_config_dir() -> Option<PathBuf> {
        // dirs::config_dir() is ~/.config on Linux and ~/Library/Application Support on macOS
        let Some(dir) = dirs::config_dir() else {
            warn!("could not determine user configuration directory");
            return None;
        };
        Some(dir.join(APP_DIR_NAME))
    }

    fn config_path() -> Option<PathBuf> {
        Some(Self::app_config_dir()?.join(BASE_CONFIG_FILENAME))
    }

    fn make_private(path: &Path) -> io::Result<()> {
        let mode = if path.is_dir() {
            PRIVATE_DIR_MODE
        } else {
            PRIVATE_FILE_MODE
        };
        std::fs::set_permissions(path, Permissions::from_mode(mode))
    }
}

#[cfg(test)]
mod test {
    use std::os::unix::fs::PermissionsExt as _;

    use super::Platform;
    use crate::os::AbstractPlatform as _;

    #[test]
    fn config_paths() {
        if let Some(p) = Platform::config_path() {
            assert!(p.ends_with("sshdir/config.json"));
        }
        if let Ok(p) = Platform::user_ssh_config() {
            assert!(p.ends_with(".ssh/config"));
        }
    }

    #[test]
    fn private_modes() {
        let tempdir = tempfile::tempdir().unwrap();
        let dir = tempdir.path().join("d");
        let file = tempdir.path().join("f");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(&file, "").unwrap();
        Platform::make_private(&dir).unwrap();
        Platform::make_private(&file).unwrap();
        let mode = |p: &std::path::Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&dir), 0o700);
        assert_eq!(mode(&file), 0o600);
    }
}

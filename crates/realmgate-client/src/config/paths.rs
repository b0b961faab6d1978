use std::path::{Path, PathBuf};

use directories::ProjectDirs;

pub const APP_NAME: &str = "realmgate";
pub const SERVERS_FILE: &str = "servers_config.json";
pub const APP_CONFIG_FILE: &str = "config.toml";

/// Platform-specific directories for the application.
///
/// On Linux this follows the XDG Base Directory spec (`~/.config/realmgate`,
/// `~/.local/share/realmgate`), on macOS `~/Library/Application Support`, and
/// on Windows `%APPDATA%`.
pub struct ProjectPaths {
    dirs: ProjectDirs,
}

impl ProjectPaths {
    /// Returns `None` when no home directory can be determined.
    pub fn new(name: &str) -> Option<Self> {
        ProjectDirs::from("", "", name).map(|dirs| ProjectPaths { dirs })
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dirs.config_dir().to_path_buf()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dirs.data_dir().to_path_buf()
    }
}

/// Where every persisted file of one realmgate installation lives.
///
/// With an explicit data directory everything, including `config.toml`, is
/// kept inside it. Otherwise the platform config and data directories are used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
}

impl DataLayout {
    pub fn resolve(data_dir: Option<PathBuf>) -> Option<Self> {
        match data_dir {
            Some(dir) => Some(Self::in_dir(dir)),
            None => {
                let paths = ProjectPaths::new(APP_NAME)?;
                Some(DataLayout {
                    data_dir: paths.data_dir(),
                    config_file: paths.config_dir().join(APP_CONFIG_FILE),
                })
            }
        }
    }

    /// Keep all files in a single directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let data_dir = dir.into();
        DataLayout {
            config_file: data_dir.join(APP_CONFIG_FILE),
            data_dir,
        }
    }

    pub fn servers_file(&self) -> PathBuf {
        self.data_dir.join(SERVERS_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Resolve a file name from the server catalog. Absolute paths are kept.
    pub fn resolve_file(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.data_dir.join(name)
        }
    }
}

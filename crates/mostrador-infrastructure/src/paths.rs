//! Path management for mostrador configuration files.
//!
//! ```text
//! ~/.config/mostrador/         # Config directory (platform config dir)
//! └── config.toml              # Application configuration
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_NAME: &str = "mostrador";

pub struct MostradorPaths;

impl MostradorPaths {
    /// Returns the mostrador configuration directory (e.g. `~/.config/mostrador/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_lives_in_app_dir() {
        // Some CI sandboxes have no config dir at all
        if let Ok(path) = MostradorPaths::config_file() {
            assert!(path.ends_with("mostrador/config.toml"));
        }
    }
}

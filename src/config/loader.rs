//! Configuration file discovery and loading.

use crate::config::schema::SetupConfig;
use crate::error::{Result, SetupError};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project config file.
pub const CONFIG_FILE_NAME: &str = ".venvstrap.yml";

/// Path of the implicit project config for `project_root`.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE_NAME)
}

/// Load the configuration for a project.
///
/// With an explicit path the file must exist. Without one, the project's
/// `.venvstrap.yml` is used when present and defaults apply otherwise.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<SetupConfig> {
    match explicit {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                project_root.join(path)
            };
            load_config_file(&path)
        }
        None => {
            let path = project_config_path(project_root);
            if path.is_file() {
                load_config_file(&path)
            } else {
                tracing::debug!(
                    "No {} in {}, using defaults",
                    CONFIG_FILE_NAME,
                    project_root.display()
                );
                Ok(SetupConfig::default())
            }
        }
    }
}

/// Load a single config file and parse it into [`SetupConfig`].
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<SetupConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SetupError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SetupError::Io(e)
        }
    })?;

    tracing::debug!("Loading config from {}", path.display());
    parse_config(&content, path)
}

/// Parse YAML content into [`SetupConfig`].
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<SetupConfig> {
    if content.trim().is_empty() {
        return Ok(SetupConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| SetupError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

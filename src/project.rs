//! Project root discovery.
//!
//! The classic setup scripts `cd` into their own directory before doing
//! anything. venvstrap has no script location, so it finds the project
//! root the way most project tools do: walk upward from the current
//! directory looking for a marker file.

use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE_NAME;
use crate::error::{Result, SetupError};

/// Resolve the project root.
///
/// An explicit directory wins and must exist. Otherwise walk upward from
/// `cwd` looking for `.venvstrap.yml`, then for `manifest`, and finally fall
/// back to `cwd` itself. The result is canonicalized.
pub fn resolve_project_root(
    explicit: Option<&Path>,
    cwd: &Path,
    manifest: &Path,
) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            cwd.join(dir)
        };
        if !dir.is_dir() {
            return Err(SetupError::ProjectNotFound { path: dir });
        }
        return Ok(dir.canonicalize()?);
    }

    let root = find_upward(cwd, Path::new(CONFIG_FILE_NAME))
        .or_else(|| find_upward(cwd, manifest))
        .unwrap_or_else(|| cwd.to_path_buf());

    tracing::debug!("Project root resolved to {}", root.display());
    Ok(root.canonicalize()?)
}

/// Find the nearest ancestor of `start` (inclusive) containing `marker`.
pub fn find_upward(start: &Path, marker: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(marker).is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

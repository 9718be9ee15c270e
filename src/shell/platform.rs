//! Platform-specific environment helpers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Check if running in a CI environment.
///
/// Used to force non-interactive mode in `main()`.
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Build a PATH value with `dir` in front of `existing`.
pub fn prepend_path(dir: &Path, existing: &[PathBuf]) -> OsString {
    let entries = std::iter::once(dir.to_path_buf()).chain(existing.iter().cloned());
    std::env::join_paths(entries).unwrap_or_else(|_| dir.as_os_str().to_os_string())
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Extensions tried after the bare name when resolving a program.
///
/// Empty on Unix. On Windows this is `PATHEXT`, defaulting to `.exe`.
pub fn executable_extensions() -> Vec<String> {
    if cfg!(windows) {
        std::env::var("PATHEXT")
            .map(|v| {
                v.split(';')
                    .filter(|e| !e.is_empty())
                    .map(|e| e.to_lowercase())
                    .collect()
            })
            .unwrap_or_else(|_| vec![".exe".to_string()])
    } else {
        Vec::new()
    }
}

/// Shell syntax for setting an environment variable, for user hints.
pub fn export_hint(var: &str) -> String {
    if cfg!(windows) {
        format!("set {}=<your key>", var)
    } else {
        format!("export {}=<your key>", var)
    }
}

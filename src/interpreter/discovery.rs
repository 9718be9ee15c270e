//! Locating a Python interpreter.
//!
//! Lookup walks PATH directly instead of shelling out to `which` or
//! `where`, whose behaviour varies across systems.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::InterpreterConfig;
use crate::error::{Result, SetupError};
use crate::shell::{captured, executable_extensions, is_executable, ProcessRunner};

use super::version::PythonVersion;

/// An interpreter found on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpreter {
    /// Absolute path to the executable.
    pub path: PathBuf,
    /// Version, when `--version` output could be parsed.
    pub version: Option<PythonVersion>,
}

/// Resolve one program name against PATH entries.
///
/// A name containing a path separator is checked as-is. On Windows each
/// `PATHEXT` extension is tried after the bare name.
pub fn resolve_program(name: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let extensions = executable_extensions();
    let candidates_in = |dir: &Path| -> Option<PathBuf> {
        let bare = dir.join(name);
        if is_executable(&bare) {
            return Some(bare);
        }
        extensions
            .iter()
            .map(|ext| dir.join(format!("{}{}", name, ext)))
            .find(|p| is_executable(p))
    };

    if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(name);
        return if is_executable(&path) {
            Some(path)
        } else {
            None
        };
    }

    path_entries.iter().find_map(|dir| candidates_in(dir))
}

/// First candidate that resolves, trying candidates in order.
pub fn discover(candidates: &[String], path_entries: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find_map(|name| resolve_program(name, path_entries))
}

/// Run `<interpreter> --version` and parse the result.
pub fn query_version(
    runner: &mut dyn ProcessRunner,
    interpreter: &Path,
    cwd: &Path,
) -> Result<Option<PythonVersion>> {
    let spec = captured(interpreter, cwd).arg("--version");
    let result = runner.run(&spec)?;
    let output = result.combined_output();
    tracing::debug!("{} --version: {}", interpreter.display(), output.trim());
    if !result.success {
        return Ok(None);
    }
    Ok(PythonVersion::from_output(&output))
}

/// Find the interpreter and enforce the configured minimum version.
///
/// # Errors
///
/// - `InterpreterMissing` if no candidate is on PATH
/// - `InterpreterVersionUnknown` if a minimum is set and the version can't be read
/// - `InterpreterTooOld` if the version is below the minimum
pub fn locate(
    config: &InterpreterConfig,
    path_entries: &[PathBuf],
    runner: &mut dyn ProcessRunner,
    cwd: &Path,
) -> Result<Interpreter> {
    let path = discover(&config.candidates, path_entries).ok_or_else(|| {
        SetupError::InterpreterMissing {
            candidates: config.candidates.clone(),
        }
    })?;

    let version = query_version(runner, &path, cwd)?;

    if let Some(required) = &config.min_version {
        let minimum: PythonVersion = required
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        match version {
            None => {
                return Err(SetupError::InterpreterVersionUnknown {
                    path,
                    output: "no 'Python X.Y' in --version output".to_string(),
                })
            }
            Some(found) if found < minimum => {
                return Err(SetupError::InterpreterTooOld {
                    path,
                    found: found.to_string(),
                    required: required.clone(),
                })
            }
            Some(_) => {}
        }
    }

    Ok(Interpreter { path, version })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(not(unix))]
    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(format!("{}.exe", name));
        std::fs::write(&path, "").unwrap();
        path
    }

    fn config(candidates: &[&str], min: Option<&str>) -> InterpreterConfig {
        InterpreterConfig {
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            min_version: min.map(String::from),
        }
    }

    #[test]
    fn empty_path_finds_nothing() {
        assert_eq!(discover(&["python3".to_string()], &[]), None);
    }

    #[test]
    fn candidate_order_wins_over_path_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        make_executable(first.path(), "python");
        let expected = make_executable(second.path(), "python3");

        let found = discover(
            &["python3".to_string(), "python".to_string()],
            &[first.path().to_path_buf(), second.path().to_path_buf()],
        );
        assert_eq!(found, Some(expected));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("python3"), "").unwrap();
        assert_eq!(
            resolve_program("python3", &[dir.path().to_path_buf()]),
            None
        );
    }

    #[test]
    fn missing_interpreter_lists_candidates() {
        let mut runner = MockRunner::new();
        let err = locate(
            &config(&["python3", "python"], None),
            &[],
            &mut runner,
            Path::new("."),
        )
        .unwrap_err();
        match err {
            SetupError::InterpreterMissing { candidates } => {
                assert_eq!(candidates, vec!["python3", "python"])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn version_is_parsed() {
        let dir = TempDir::new().unwrap();
        make_executable(dir.path(), "python3");
        let mut runner = MockRunner::new();
        runner.respond("--version", 0, "Python 3.11.4\n");

        let interp = locate(
            &config(&["python3"], Some("3.9")),
            &[dir.path().to_path_buf()],
            &mut runner,
            dir.path(),
        )
        .unwrap();
        assert_eq!(interp.version, Some(PythonVersion::new(3, 11, 4)));
    }

    #[test]
    fn old_interpreter_is_rejected() {
        let dir = TempDir::new().unwrap();
        make_executable(dir.path(), "python3");
        let mut runner = MockRunner::new();
        runner.respond("--version", 0, "Python 3.7.2\n");

        let err = locate(
            &config(&["python3"], Some("3.9")),
            &[dir.path().to_path_buf()],
            &mut runner,
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::InterpreterTooOld { .. }));
    }

    #[test]
    fn unknown_version_only_fatal_with_minimum() {
        let dir = TempDir::new().unwrap();
        make_executable(dir.path(), "python3");

        let mut runner = MockRunner::new();
        runner.respond("--version", 0, "garbage");
        let interp = locate(
            &config(&["python3"], None),
            &[dir.path().to_path_buf()],
            &mut runner,
            dir.path(),
        )
        .unwrap();
        assert_eq!(interp.version, None);

        let mut runner = MockRunner::new();
        runner.respond("--version", 0, "garbage");
        let err = locate(
            &config(&["python3"], Some("3.8")),
            &[dir.path().to_path_buf()],
            &mut runner,
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::InterpreterVersionUnknown { .. }));
    }
}

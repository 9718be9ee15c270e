//! Creating and removing virtual environments.

use std::path::Path;

use crate::error::{Result, SetupError};
use crate::shell::{CommandSpec, ProcessRunner};

use super::layout::{VenvLayout, VenvStatus};

/// Delete the venv directory and everything in it.
///
/// Removing an absent directory is a no-op.
pub fn remove(layout: &VenvLayout) -> Result<()> {
    match std::fs::remove_dir_all(layout.root()) {
        Ok(()) => {
            tracing::info!("Removed virtual environment at {}", layout.root().display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SetupError::Io(e)),
    }
}

/// The `python -m venv <dir>` invocation for a layout.
///
/// `venv_dir` is passed as configured (usually relative) and the command
/// runs from the project root, matching what users would type by hand.
pub fn create_command(interpreter: &Path, venv_dir: &Path, project_root: &Path) -> CommandSpec {
    CommandSpec::new(interpreter)
        .args(["-m", "venv"])
        .arg(venv_dir.as_os_str())
        .current_dir(project_root)
}

/// Create the venv with the base interpreter.
///
/// # Errors
///
/// - `CommandFailed` if `-m venv` exits non-zero
/// - `VenvIncomplete` if it succeeded but left no interpreter behind
pub fn create(
    runner: &mut dyn ProcessRunner,
    interpreter: &Path,
    venv_dir: &Path,
    project_root: &Path,
    layout: &VenvLayout,
) -> Result<()> {
    let spec = create_command(interpreter, venv_dir, project_root).capture();
    let result = runner.run(&spec)?;

    if !result.success {
        let tail = result.tail(5);
        if !tail.is_empty() {
            tracing::error!("venv creation output:\n{}", tail);
        }
        return Err(SetupError::CommandFailed {
            command: spec.display(),
            code: result.exit_code,
        });
    }

    if layout.status() != VenvStatus::Ready {
        return Err(SetupError::VenvIncomplete {
            path: layout.root().to_path_buf(),
        });
    }

    tracing::info!("Created virtual environment at {}", layout.root().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn create_command_runs_venv_module_from_root() {
        let spec = create_command(Path::new("/usr/bin/python3"), Path::new("venv"), Path::new("/p"));
        assert_eq!(spec.display(), "/usr/bin/python3 -m venv venv");
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/p")));
    }

    #[test]
    fn remove_deletes_tree() {
        let temp = TempDir::new().unwrap();
        let layout = VenvLayout::new(temp.path(), Path::new("venv"));
        fs::create_dir_all(layout.bin_dir()).unwrap();
        fs::write(layout.python(), "").unwrap();

        remove(&layout).unwrap();
        assert_eq!(layout.status(), VenvStatus::Absent);
    }

    #[test]
    fn remove_absent_is_ok() {
        let temp = TempDir::new().unwrap();
        let layout = VenvLayout::new(temp.path(), Path::new("venv"));
        assert!(remove(&layout).is_ok());
    }

    #[test]
    fn create_succeeds_when_interpreter_appears() {
        let temp = TempDir::new().unwrap();
        let layout = VenvLayout::new(temp.path(), Path::new("venv"));
        let mut runner = MockRunner::new();

        create(
            &mut runner,
            Path::new("python3"),
            Path::new("venv"),
            temp.path(),
            &layout,
        )
        .unwrap();
        assert_eq!(layout.status(), VenvStatus::Ready);
    }

    #[test]
    fn create_fails_on_non_zero_exit() {
        let temp = TempDir::new().unwrap();
        let layout = VenvLayout::new(temp.path(), Path::new("venv"));
        let mut runner = MockRunner::new();
        runner.respond("-m venv", 1, "ensurepip is not available");

        let err = create(
            &mut runner,
            Path::new("python3"),
            Path::new("venv"),
            temp.path(),
            &layout,
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::CommandFailed { code: Some(1), .. }));
    }

    #[test]
    fn create_detects_missing_interpreter() {
        let temp = TempDir::new().unwrap();
        let layout = VenvLayout::new(temp.path(), Path::new("venv"));
        let mut runner = MockRunner::new().without_venv_files();

        let err = create(
            &mut runner,
            Path::new("python3"),
            Path::new("venv"),
            temp.path(),
            &layout,
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::VenvIncomplete { .. }));
    }
}

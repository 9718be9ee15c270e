//! Virtual environment directory layout.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::shell::{prepend_path, CommandSpec};

/// State of the virtual environment directory on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VenvStatus {
    /// Directory does not exist.
    Absent,
    /// Directory and interpreter exist.
    Ready,
    /// Directory exists but has no interpreter (interrupted creation).
    Incomplete,
}

/// Paths inside a virtual environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvLayout {
    root: PathBuf,
}

impl VenvLayout {
    /// Layout for `venv_dir` resolved against `project_root`.
    pub fn new(project_root: &Path, venv_dir: &Path) -> Self {
        Self {
            root: project_root.join(venv_dir),
        }
    }

    /// The venv directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the venv's executables.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(bin_dir_name())
    }

    /// The venv's interpreter.
    pub fn python(&self) -> PathBuf {
        self.bin_dir().join(python_file_name())
    }

    /// Inspect the directory.
    pub fn status(&self) -> VenvStatus {
        if !self.root.exists() {
            VenvStatus::Absent
        } else if self.python().is_file() {
            VenvStatus::Ready
        } else {
            VenvStatus::Incomplete
        }
    }

    /// Environment overlay equivalent to sourcing the venv's activate script.
    pub fn activation(&self, base_path: &[PathBuf]) -> Activation {
        Activation {
            virtual_env: self.root.as_os_str().to_os_string(),
            path: prepend_path(&self.bin_dir(), base_path),
        }
    }
}

/// `bin` on Unix, `Scripts` on Windows.
pub fn bin_dir_name() -> &'static str {
    if cfg!(windows) {
        "Scripts"
    } else {
        "bin"
    }
}

/// `python` on Unix, `python.exe` on Windows.
pub fn python_file_name() -> &'static str {
    if cfg!(windows) {
        "python.exe"
    } else {
        "python"
    }
}

/// Environment changes applied to every child process after activation.
///
/// The tool's own environment is never modified; each command spec carries
/// the overlay instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    virtual_env: OsString,
    path: OsString,
}

impl Activation {
    /// Apply the overlay to a command.
    pub fn apply(&self, spec: CommandSpec) -> CommandSpec {
        spec.env("VIRTUAL_ENV", self.virtual_env.clone())
            .env("PATH", self.path.clone())
            .env_remove("PYTHONHOME")
    }
}

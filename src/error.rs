//! Error types for venvstrap operations.
//!
//! This module defines [`SetupError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - A missing interpreter is fatal and reported before anything is created
//! - A failed test run is *not* an error; the workflow records a warning
//! - Every other subprocess failure propagates as [`SetupError::CommandFailed`]
//! - Use `anyhow::Error` (via `SetupError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for venvstrap operations.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No Python interpreter could be found on PATH.
    #[error(
        "Python interpreter not found (looked for: {}). Install Python from https://www.python.org/downloads/ and make sure it is on your PATH.",
        candidates.join(", ")
    )]
    InterpreterMissing { candidates: Vec<String> },

    /// The interpreter found is older than the configured minimum.
    #[error("Python {found} at {path} is older than the required {required}")]
    InterpreterTooOld {
        path: PathBuf,
        found: String,
        required: String,
    },

    /// The interpreter's version output could not be understood.
    #[error("Could not determine the version of {path}: {output}")]
    InterpreterVersionUnknown { path: PathBuf, output: String },

    /// The virtual environment directory exists but has no interpreter.
    #[error("Virtual environment at {path} is incomplete (no interpreter). Re-run and choose to recreate it.")]
    VenvIncomplete { path: PathBuf },

    /// The dependency manifest does not exist.
    #[error("Dependency manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// The requested project directory is not usable.
    #[error("Project directory not found: {path}")]
    ProjectNotFound { path: PathBuf },

    /// A child process could not be started at all.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A child process ran and exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A prompt could not be answered (e.g. non-interactive with no default).
    #[error("Cannot answer prompt '{key}': {message}")]
    PromptUnavailable { key: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for venvstrap operations.
pub type Result<T> = std::result::Result<T, SetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpreter_missing_lists_candidates_and_hint() {
        let err = SetupError::InterpreterMissing {
            candidates: vec!["python3".into(), "python".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("python3, python"));
        assert!(msg.contains("python.org"));
    }

    #[test]
    fn interpreter_too_old_displays_versions() {
        let err = SetupError::InterpreterTooOld {
            path: PathBuf::from("/usr/bin/python3"),
            found: "3.6.9".into(),
            required: "3.9".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3.6.9"));
        assert!(msg.contains("3.9"));
        assert!(msg.contains("/usr/bin/python3"));
    }

    #[test]
    fn venv_incomplete_displays_path() {
        let err = SetupError::VenvIncomplete {
            path: PathBuf::from("/proj/venv"),
        };
        assert!(err.to_string().contains("/proj/venv"));
    }

    #[test]
    fn manifest_not_found_displays_path() {
        let err = SetupError::ManifestNotFound {
            path: PathBuf::from("requirements.txt"),
        };
        assert!(err.to_string().contains("requirements.txt"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = SetupError::ConfigParseError {
            path: PathBuf::from("/proj/.venvstrap.yml"),
            message: "unknown field".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(".venvstrap.yml"));
        assert!(msg.contains("unknown field"));
    }

    #[test]
    fn spawn_error_keeps_source() {
        let err = SetupError::Spawn {
            program: "python3".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("python3"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = SetupError::CommandFailed {
            command: "pip install -r requirements.txt".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("pip install"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SetupError = io_err.into();
        assert!(matches!(err, SetupError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts() {
        let err: SetupError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}

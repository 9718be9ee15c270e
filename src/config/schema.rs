//! Configuration schema definitions for venvstrap.
//!
//! This module contains the struct definitions that map to the optional
//! `.venvstrap.yml` file. Every field has a default, so a project without a
//! config file behaves exactly like the classic setup scripts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder token the classic setup scripts look for in `config.py`.
pub const DEFAULT_PLACEHOLDER: &str = "<YOUR_GEMINI_API_KEY>";

/// Environment variable suggested to users as an alternative to patching.
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Root configuration structure for `.venvstrap.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    /// Application name (for display purposes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Interpreter discovery settings
    pub interpreter: InterpreterConfig,

    /// Virtual environment directory, relative to the project root
    pub venv_dir: PathBuf,

    /// Dependency manifest, relative to the project root
    pub requirements: PathBuf,

    /// Upgrade pip inside the venv before installing dependencies
    pub upgrade_pip: bool,

    /// API key injection settings
    pub credentials: CredentialsConfig,

    /// Test suite invocation
    pub tests: TestsConfig,

    /// Application launch settings
    pub app: AppConfig,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            app_name: None,
            interpreter: InterpreterConfig::default(),
            venv_dir: PathBuf::from("venv"),
            requirements: PathBuf::from("requirements.txt"),
            upgrade_pip: true,
            credentials: CredentialsConfig::default(),
            tests: TestsConfig::default(),
            app: AppConfig::default(),
        }
    }
}

/// Where to look for Python and which versions to accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    /// Executable names searched on PATH, in order
    pub candidates: Vec<String>,

    /// Minimum accepted version, e.g. "3.9"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            min_version: None,
        }
    }
}

fn default_candidates() -> Vec<String> {
    let names: &[&str] = if cfg!(windows) {
        &["python", "py"]
    } else {
        &["python3", "python"]
    };
    names.iter().map(|s| s.to_string()).collect()
}

/// Which file receives the API key and how it is marked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    /// File containing the placeholder, relative to the project root
    pub config_file: PathBuf,

    /// Literal token to replace
    pub placeholder: String,

    /// Environment variable suggested as an alternative
    pub env_var: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("config.py"),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            env_var: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

/// How the test suite is run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestsConfig {
    /// Arguments passed to the venv interpreter
    pub args: Vec<String>,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            args: vec!["-m".to_string(), "pytest".to_string()],
        }
    }
}

/// How the application is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Script run with the venv interpreter
    pub entry: PathBuf,

    /// Extra arguments after the script
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("app.py"),
            args: Vec::new(),
        }
    }
}

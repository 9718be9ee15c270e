//! venvstrap - Interactive Python virtual environment bootstrapper.
//!
//! venvstrap replaces the usual pair of `setup.sh` / `setup.bat` scripts in a
//! Python project with one cross-platform binary. It checks for an
//! interpreter, creates (or recreates) a virtual environment, upgrades pip,
//! installs the dependency manifest, optionally patches an API key into a
//! config file, and optionally runs the tests and launches the application.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Optional `.venvstrap.yml` loading and defaults
//! - [`error`] - Error types and result aliases
//! - [`interpreter`] - Interpreter discovery and version checks
//! - [`project`] - Project root discovery
//! - [`runner`] - The setup workflow
//! - [`secrets`] - Placeholder substitution and output masking
//! - [`shell`] - Child process execution
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`venv`] - Virtual environment layout and lifecycle
//!
//! # Example
//!
//! ```
//! use venvstrap::secrets::substitute;
//!
//! let config = "API_KEY = \"<YOUR_GEMINI_API_KEY>\"\n";
//! let patched = substitute(config, "<YOUR_GEMINI_API_KEY>", "abc123");
//! assert_eq!(patched, b"API_KEY = \"abc123\"\n");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod project;
pub mod runner;
pub mod secrets;
pub mod shell;
pub mod ui;
pub mod venv;

pub use error::{Result, SetupError};

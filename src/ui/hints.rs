//! Contextual hint generation.
//!
//! Provides hint text that suggests the logical next action after a
//! setup run, based on where the virtual environment lives and which
//! optional steps were skipped.

use std::path::Path;

use crate::shell::export_hint;

/// Command that activates the venv in the user's own shell.
pub fn activate_command(venv_dir: &Path) -> String {
    if cfg!(windows) {
        format!("{}\\Scripts\\activate", venv_dir.display())
    } else {
        format!("source {}/bin/activate", venv_dir.display())
    }
}

/// Hint shown after a successful setup.
pub fn after_setup(venv_dir: &Path) -> String {
    format!(
        "Activate the environment with `{}`.",
        activate_command(venv_dir)
    )
}

/// Hint shown when no API key was written to the config file.
pub fn api_key_env(var: &str) -> String {
    format!(
        "You can also provide the key through the environment: `{}`",
        export_hint(var)
    )
}

/// Hint shown when the app was not launched.
pub fn launch_later(entry: &str) -> String {
    format!("Start the app later with `python {}`.", entry)
}

/// Hint shown when no interpreter could be found.
pub fn install_python(min_version: Option<&str>) -> String {
    match min_version {
        Some(v) => format!("Install Python {} or newer and make sure it is on PATH.", v),
        None => "Install Python 3 and make sure it is on PATH.".to_string(),
    }
}

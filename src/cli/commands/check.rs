//! Check command implementation.
//!
//! The `venvstrap check` command reports what setup would find, without
//! creating or modifying anything.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::CheckArgs;
use crate::config::{load_config, SetupConfig};
use crate::error::Result;
use crate::interpreter::{discover, query_version, Interpreter, PythonVersion};
use crate::secrets::{placeholder_state, PlaceholderState};
use crate::shell::{parse_system_path, ProcessRunner, SystemRunner};
use crate::ui::{hints, UserInterface};
use crate::venv::{VenvLayout, VenvStatus};

use super::dispatcher::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: CheckArgs,
}

/// Everything `check` inspects.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub project_root: PathBuf,
    pub interpreter: Option<Interpreter>,
    /// `None` when no minimum is configured or the version is unknown.
    pub meets_min_version: Option<bool>,
    pub venv: VenvReport,
    pub requirements: FileReport,
    pub credentials: CredentialsReport,
    pub app: FileReport,
}

#[derive(Debug, Serialize)]
pub struct VenvReport {
    pub path: PathBuf,
    pub status: VenvStatus,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct CredentialsReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub state: PlaceholderState,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(project_root: &Path, config_path: Option<PathBuf>, args: CheckArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path,
            args,
        }
    }

    fn show(&self, ui: &mut dyn UserInterface, config: &SetupConfig, report: &CheckReport) {
        let name = config.app_name.clone().unwrap_or_else(|| {
            report
                .project_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string())
        });
        ui.show_header(&format!("{} - Check", name));
        ui.message(&format!("Project: {}", report.project_root.display()));

        match &report.interpreter {
            Some(found) => {
                let version = found
                    .version
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "unknown version".to_string());
                let line = format!("Python {} at {}", version, found.path.display());
                match report.meets_min_version {
                    Some(false) => ui.warning(&format!(
                        "{} (below required {})",
                        line,
                        config.interpreter.min_version.as_deref().unwrap_or("")
                    )),
                    _ => ui.success(&line),
                }
            }
            None => {
                ui.error(&format!(
                    "No Python interpreter found (looked for: {})",
                    config.interpreter.candidates.join(", ")
                ));
                ui.show_hint(&hints::install_python(
                    config.interpreter.min_version.as_deref(),
                ));
            }
        }

        let venv = config.venv_dir.display();
        match report.venv.status {
            VenvStatus::Ready => ui.success(&format!("Virtual environment '{}' ready", venv)),
            VenvStatus::Incomplete => ui.warning(&format!(
                "Virtual environment '{}' has no interpreter",
                venv
            )),
            VenvStatus::Absent => ui.message(&format!("Virtual environment '{}' not created", venv)),
        }

        let manifest = config.requirements.display();
        if report.requirements.exists {
            ui.success(&format!("{} found", manifest));
        } else {
            ui.warning(&format!("{} missing", manifest));
        }

        let credentials = config.credentials.config_file.display();
        match report.credentials.state {
            PlaceholderState::MissingFile => ui.message(&format!("No {}", credentials)),
            PlaceholderState::Absent => ui.success(&format!("{} has no placeholder", credentials)),
            PlaceholderState::Present { .. } => {
                ui.warning(&format!("{} still contains the API key placeholder", credentials))
            }
        }

        let entry = config.app.entry.display();
        if report.app.exists {
            ui.success(&format!("{} found", entry));
        } else {
            ui.message(&format!("{} not found", entry));
        }
    }
}

/// Inspect the project without changing it.
pub fn build_report(
    project_root: &Path,
    config: &SetupConfig,
    runner: &mut dyn ProcessRunner,
    path_entries: &[PathBuf],
) -> Result<CheckReport> {
    let interpreter = match discover(&config.interpreter.candidates, path_entries) {
        Some(path) => {
            let version = query_version(runner, &path, project_root)?;
            Some(Interpreter { path, version })
        }
        None => None,
    };

    let minimum = match &config.interpreter.min_version {
        Some(v) => Some(
            v.parse::<PythonVersion>()
                .map_err(|e: String| anyhow::anyhow!(e))?,
        ),
        None => None,
    };
    let meets_min_version = match (&interpreter, minimum) {
        (Some(Interpreter { version: Some(found), .. }), Some(min)) => Some(*found >= min),
        _ => None,
    };

    let layout = VenvLayout::new(project_root, &config.venv_dir);
    let credentials_path = project_root.join(&config.credentials.config_file);
    let requirements = project_root.join(&config.requirements);
    let app = project_root.join(&config.app.entry);

    Ok(CheckReport {
        project_root: project_root.to_path_buf(),
        interpreter,
        meets_min_version,
        venv: VenvReport {
            status: layout.status(),
            path: layout.root().to_path_buf(),
        },
        requirements: FileReport {
            exists: requirements.is_file(),
            path: requirements,
        },
        credentials: CredentialsReport {
            state: placeholder_state(&credentials_path, &config.credentials.placeholder)?,
            path: credentials_path,
        },
        app: FileReport {
            exists: app.is_file(),
            path: app,
        },
    })
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        let mut runner = SystemRunner::new();
        let report = build_report(
            &self.project_root,
            &config,
            &mut runner,
            &parse_system_path(),
        )?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| anyhow::anyhow!("Failed to serialize report: {}", e))?;
            println!("{}", json);
        } else {
            self.show(ui, &config, &report);
        }

        if report.interpreter.is_some() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

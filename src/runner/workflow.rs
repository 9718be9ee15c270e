//! Setup workflow orchestration.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::SetupConfig;
use crate::error::{Result, SetupError};
use crate::interpreter::{self, Interpreter};
use crate::secrets::{self, InvalidKey, OutputMasker, PatchOutcome, PlaceholderState};
use crate::shell::{parse_system_path, CommandResult, CommandSpec, ProcessRunner};
use crate::ui::{
    format_duration, hints, live_output_callback, Prompt, SetupTheme, UserInterface,
};
use crate::venv::{self, Activation, VenvLayout, VenvStatus};

use super::step::{SetupStep, StepOutcome, StepRecord};

/// Lines of failed command output shown in the error block.
const ERROR_TAIL_LINES: usize = 15;

/// Answers supplied up front instead of prompting.
///
/// `None` means "ask". Every field left at its default reproduces the
/// fully interactive flow.
#[derive(Clone, Default)]
pub struct SetupOptions {
    /// Answer to "recreate the existing virtual environment?".
    pub recreate_venv: Option<bool>,
    /// Key to write into the config file. Answers both key prompts.
    pub api_key: Option<String>,
    /// Leave the config file alone without asking.
    pub skip_api_key: bool,
    /// Answer to "run the test suite?".
    pub run_tests: Option<bool>,
    /// Answer to "launch the application?".
    pub launch_app: Option<bool>,
}

impl std::fmt::Debug for SetupOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupOptions")
            .field("recreate_venv", &self.recreate_venv)
            .field("api_key", &self.api_key.as_ref().map(|_| secrets::REDACTED))
            .field("skip_api_key", &self.skip_api_key)
            .field("run_tests", &self.run_tests)
            .field("launch_app", &self.launch_app)
            .finish()
    }
}

/// Result of a setup run that reached the end.
#[derive(Debug, Default)]
pub struct SetupReport {
    /// Outcome of each step, in execution order.
    pub steps: Vec<StepRecord>,
    /// The interpreter used to create the venv.
    pub interpreter: Option<Interpreter>,
    /// Exit code of the launched application, if it was launched.
    pub app_exit: Option<i32>,
    /// Total duration.
    pub duration: Duration,
}

impl SetupReport {
    /// Outcome recorded for `step`.
    pub fn outcome(&self, step: SetupStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .map(|r| &r.outcome)
    }

    /// Steps that ended with a tolerated failure.
    pub fn warnings(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|r| r.outcome.is_warned())
    }

    /// Process exit code for this run.
    ///
    /// Zero unless the application was launched and exited non-zero, in
    /// which case its code is passed through (kept within 1..=255).
    pub fn exit_code(&self) -> i32 {
        match self.app_exit {
            Some(code) if code != 0 => code.clamp(1, 255),
            _ => 0,
        }
    }
}

/// Runs the nine setup steps against one project.
pub struct SetupWorkflow<'a> {
    config: &'a SetupConfig,
    project_root: PathBuf,
    options: SetupOptions,
    runner: &'a mut dyn ProcessRunner,
    path_entries: Vec<PathBuf>,
    masker: OutputMasker,
    theme: SetupTheme,
}

impl<'a> SetupWorkflow<'a> {
    /// Create a workflow that searches the system PATH for Python.
    pub fn new(
        config: &'a SetupConfig,
        project_root: impl Into<PathBuf>,
        options: SetupOptions,
        runner: &'a mut dyn ProcessRunner,
    ) -> Self {
        let mut masker = OutputMasker::new();
        if let Some(key) = &options.api_key {
            masker.add_secret(key.trim());
        }

        Self {
            config,
            project_root: project_root.into(),
            options,
            runner,
            path_entries: parse_system_path(),
            masker,
            theme: SetupTheme::detect(),
        }
    }

    /// Search these directories for Python instead of the system PATH.
    ///
    /// The same entries form the base of the activated PATH.
    pub fn with_path_entries(mut self, entries: Vec<PathBuf>) -> Self {
        self.path_entries = entries;
        self
    }

    /// Display name of the project.
    pub fn app_name(&self) -> String {
        self.config
            .app_name
            .clone()
            .or_else(|| {
                self.project_root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "project".to_string())
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// A missing interpreter fails before anything touches the filesystem.
    /// Failures of venv creation, pip and the dependency install abort the
    /// run. A failed test run does not: it is recorded as
    /// [`StepOutcome::Warned`] and the run continues.
    pub fn run(&mut self, ui: &mut dyn UserInterface) -> Result<SetupReport> {
        let start = Instant::now();
        let mut report = SetupReport::default();
        ui.show_header(&format!("Setting up {}", self.app_name()));

        // 1. Interpreter
        self.begin(ui, SetupStep::Interpreter);
        let interpreter = self.check_interpreter(ui)?;
        let detail = match &interpreter.version {
            Some(v) => format!("Python {} at {}", v, interpreter.path.display()),
            None => format!("{} (version unknown)", interpreter.path.display()),
        };
        self.record(ui, &mut report, SetupStep::Interpreter, StepOutcome::Completed(detail));

        // 2. Project root
        self.begin(ui, SetupStep::ProjectRoot);
        if !self.project_root.is_dir() {
            return Err(SetupError::ProjectNotFound {
                path: self.project_root.clone(),
            });
        }
        ui.message(&format!("  Working in {}", self.project_root.display()));
        let root = self.project_root.display().to_string();
        self.record(ui, &mut report, SetupStep::ProjectRoot, StepOutcome::Completed(root));

        // 3. Existing venv
        let layout = VenvLayout::new(&self.project_root, &self.config.venv_dir);
        self.begin(ui, SetupStep::VenvCheck);
        let outcome = self.check_existing_venv(ui, &layout)?;
        self.record(ui, &mut report, SetupStep::VenvCheck, outcome);

        // 4. Create and activate
        self.begin(ui, SetupStep::VenvCreate);
        let outcome = self.prepare_venv(ui, &interpreter, &layout)?;
        self.record(ui, &mut report, SetupStep::VenvCreate, outcome);
        let activation = layout.activation(&self.path_entries);
        let python = layout.python();
        debug!("Activated {}", layout.root().display());
        report.interpreter = Some(interpreter);

        // 5. pip
        self.begin(ui, SetupStep::PipUpgrade);
        let outcome = self.upgrade_pip(ui, &activation, &python)?;
        self.record(ui, &mut report, SetupStep::PipUpgrade, outcome);

        // 6. Dependencies
        self.begin(ui, SetupStep::Dependencies);
        let outcome = self.install_dependencies(ui, &activation, &python)?;
        self.record(ui, &mut report, SetupStep::Dependencies, outcome);

        // 7. API key
        self.begin(ui, SetupStep::ApiKey);
        let outcome = self.configure_api_key(ui)?;
        self.record(ui, &mut report, SetupStep::ApiKey, outcome);

        // 8. Tests
        self.begin(ui, SetupStep::Tests);
        let outcome = self.run_tests(ui, &activation, &python)?;
        self.record(ui, &mut report, SetupStep::Tests, outcome);

        ui.success("Setup complete!");
        ui.show_hint(&hints::after_setup(&self.config.venv_dir));

        // 9. Launch
        self.begin(ui, SetupStep::Launch);
        let outcome = self.launch_app(ui, &activation, &python, &mut report)?;
        self.record(ui, &mut report, SetupStep::Launch, outcome);

        report.duration = start.elapsed();
        info!(
            "Setup finished in {} with {} warning(s)",
            format_duration(report.duration),
            report.warnings().count()
        );
        Ok(report)
    }

    fn begin(&self, ui: &mut dyn UserInterface, step: SetupStep) {
        debug!("Starting step {}", step.id());
        ui.show_progress(step.number(), SetupStep::COUNT, step.label());
    }

    fn record(
        &self,
        ui: &mut dyn UserInterface,
        report: &mut SetupReport,
        step: SetupStep,
        outcome: StepOutcome,
    ) {
        let detail = self.masker.mask(outcome.detail());
        match &outcome {
            StepOutcome::Completed(_) => info!("{}: {}", step.id(), detail),
            StepOutcome::Skipped(_) => {
                info!("{} skipped: {}", step.id(), detail);
                ui.message(&format!("  {}", self.theme.format_skipped(&detail)));
            }
            StepOutcome::Warned(_) => {
                warn!("{}: {}", step.id(), detail);
                ui.warning(&detail);
            }
        }
        report.steps.push(StepRecord { step, outcome });
    }

    fn check_interpreter(&mut self, ui: &mut dyn UserInterface) -> Result<Interpreter> {
        let found = interpreter::locate(
            &self.config.interpreter,
            &self.path_entries,
            &mut *self.runner,
            &self.project_root,
        );

        let interpreter = match found {
            Ok(interpreter) => interpreter,
            Err(e) => {
                if matches!(
                    e,
                    SetupError::InterpreterMissing { .. } | SetupError::InterpreterTooOld { .. }
                ) {
                    ui.show_hint(&hints::install_python(
                        self.config.interpreter.min_version.as_deref(),
                    ));
                }
                return Err(e);
            }
        };

        match &interpreter.version {
            Some(version) => ui.success(&format!(
                "Found Python {} at {}",
                version,
                interpreter.path.display()
            )),
            None => ui.warning(&format!(
                "Found {} but could not read its version",
                interpreter.path.display()
            )),
        }
        Ok(interpreter)
    }

    fn check_existing_venv(
        &mut self,
        ui: &mut dyn UserInterface,
        layout: &VenvLayout,
    ) -> Result<StepOutcome> {
        let name = self.config.venv_dir.display().to_string();
        let status = layout.status();

        if status == VenvStatus::Absent {
            return Ok(StepOutcome::Skipped(format!("No existing '{}'", name)));
        }

        let incomplete = status == VenvStatus::Incomplete;
        if incomplete {
            ui.warning(&format!(
                "'{}' exists but contains no Python interpreter",
                name
            ));
        }

        let recreate = match self.options.recreate_venv {
            Some(answer) => answer,
            None => confirm(
                ui,
                "recreate_venv",
                &format!(
                    "Virtual environment '{}' already exists. Delete and recreate it?",
                    name
                ),
                incomplete,
            )?,
        };

        if recreate {
            ui.message(&format!("  Removing '{}'...", name));
            venv::remove(layout)?;
            return Ok(StepOutcome::Completed(format!("Removed '{}'", name)));
        }

        if incomplete {
            return Err(SetupError::VenvIncomplete {
                path: layout.root().to_path_buf(),
            });
        }

        Ok(StepOutcome::Skipped(format!("Keeping existing '{}'", name)))
    }

    fn prepare_venv(
        &mut self,
        ui: &mut dyn UserInterface,
        interpreter: &Interpreter,
        layout: &VenvLayout,
    ) -> Result<StepOutcome> {
        let name = self.config.venv_dir.display().to_string();
        if layout.status() == VenvStatus::Ready {
            ui.success(&format!("Using existing '{}'", name));
            return Ok(StepOutcome::Completed(format!("Using existing '{}'", name)));
        }

        let started = Instant::now();
        let mut spinner = ui.start_spinner(&format!("Creating '{}'...", name));
        let created = venv::create(
            &mut *self.runner,
            &interpreter.path,
            &self.config.venv_dir,
            &self.project_root,
            layout,
        );

        match created {
            Ok(()) => {
                spinner.finish_success(&format!(
                    "Created '{}' ({})",
                    name,
                    format_duration(started.elapsed())
                ));
                Ok(StepOutcome::Completed(format!("Created '{}'", name)))
            }
            Err(e) => {
                spinner.finish_error(&format!("Could not create '{}'", name));
                Err(e)
            }
        }
    }

    fn upgrade_pip(
        &mut self,
        ui: &mut dyn UserInterface,
        activation: &Activation,
        python: &Path,
    ) -> Result<StepOutcome> {
        if !self.config.upgrade_pip {
            return Ok(StepOutcome::Skipped(
                "pip upgrade disabled in configuration".to_string(),
            ));
        }

        let spec = activation.apply(
            CommandSpec::new(python)
                .args(["-m", "pip", "install", "--upgrade", "pip"])
                .current_dir(&self.project_root),
        );
        let result = self.run_tool(ui, spec, "Upgrading pip")?;
        Ok(StepOutcome::Completed(format!(
            "pip upgraded in {}",
            format_duration(result.duration)
        )))
    }

    fn install_dependencies(
        &mut self,
        ui: &mut dyn UserInterface,
        activation: &Activation,
        python: &Path,
    ) -> Result<StepOutcome> {
        let manifest = self.project_root.join(&self.config.requirements);
        if !manifest.is_file() {
            return Err(SetupError::ManifestNotFound { path: manifest });
        }

        let spec = activation.apply(
            CommandSpec::new(python)
                .args(["-m", "pip", "install", "-r"])
                .arg(self.config.requirements.as_os_str())
                .current_dir(&self.project_root),
        );
        let label = format!("Installing {}", self.config.requirements.display());
        let result = self.run_tool(ui, spec, &label)?;
        Ok(StepOutcome::Completed(format!(
            "Installed {} in {}",
            self.config.requirements.display(),
            format_duration(result.duration)
        )))
    }

    /// Run a tool that must succeed.
    ///
    /// Verbose mode hands the terminal to the child. Otherwise the output is
    /// captured behind a spinner that shows the latest lines, and the tail is
    /// printed if the command fails.
    fn run_tool(
        &mut self,
        ui: &mut dyn UserInterface,
        spec: CommandSpec,
        label: &str,
    ) -> Result<CommandResult> {
        let command = self.masker.mask(&spec.display());

        if ui.output_mode().shows_command_output() {
            ui.message(&format!("  $ {}", command));
            let result = self.runner.run(&spec)?;
            if !result.success {
                return Err(SetupError::CommandFailed {
                    command,
                    code: result.exit_code,
                });
            }
            return Ok(result);
        }

        let running = format!("{}...", label);
        let mut spinner = ui.start_spinner(&running);
        let run = match spinner.progress_bar() {
            Some(bar) => self
                .runner
                .run_streaming(&spec, live_output_callback(bar, running.clone(), 2)),
            None => self.runner.run(&spec.clone().capture()),
        };

        let result = match run {
            Ok(result) => result,
            Err(e) => {
                spinner.finish_error(&format!("{} failed", label));
                return Err(e);
            }
        };

        if result.success {
            spinner.finish_success(&format!(
                "{} ({})",
                label,
                format_duration(result.duration)
            ));
            Ok(result)
        } else {
            spinner.finish_error(&format!("{} failed", label));
            let output = self.masker.mask(&result.tail(ERROR_TAIL_LINES));
            ui.show_error_block(&command, &output);
            Err(SetupError::CommandFailed {
                command,
                code: result.exit_code,
            })
        }
    }

    fn configure_api_key(&mut self, ui: &mut dyn UserInterface) -> Result<StepOutcome> {
        let config = self.config;
        let credentials = &config.credentials;
        let path = self.project_root.join(&credentials.config_file);
        let file = credentials.config_file.display().to_string();

        match secrets::placeholder_state(&path, &credentials.placeholder)? {
            PlaceholderState::MissingFile => {
                return Ok(StepOutcome::Skipped(format!("No {} found", file)));
            }
            PlaceholderState::Absent => {
                return Ok(StepOutcome::Skipped(format!(
                    "{} has no API key placeholder",
                    file
                )));
            }
            PlaceholderState::Present { .. } => {}
        }

        let outcome = self.write_api_key(ui, &path, &file)?;
        ui.show_hint(&hints::api_key_env(&credentials.env_var));
        Ok(outcome)
    }

    fn write_api_key(
        &mut self,
        ui: &mut dyn UserInterface,
        path: &Path,
        file: &str,
    ) -> Result<StepOutcome> {
        if self.options.skip_api_key {
            return Ok(StepOutcome::Skipped(format!(
                "API key entry skipped; {} left unchanged",
                file
            )));
        }

        let raw = match &self.options.api_key {
            Some(key) => key.clone(),
            None => {
                let wanted = confirm(
                    ui,
                    "enter_api_key",
                    &format!(
                        "{} still contains the API key placeholder. Enter your API key now?",
                        file
                    ),
                    false,
                )?;
                if !wanted {
                    return Ok(StepOutcome::Skipped(format!("{} left unchanged", file)));
                }
                ui.prompt(&Prompt::secret("api_key", "API key"))?
                    .as_string()
            }
        };

        let key = match secrets::validate_key(&raw) {
            Ok(key) => key,
            Err(InvalidKey::Empty) => {
                return Ok(StepOutcome::Warned(format!(
                    "No API key entered; {} left unchanged",
                    file
                )));
            }
            Err(reason) => {
                return Ok(StepOutcome::Warned(format!(
                    "Invalid API key ({}); {} left unchanged",
                    reason, file
                )));
            }
        };
        self.masker.add_secret(key.clone());

        let config = self.config;
        match secrets::patch_config_file(path, &config.credentials.placeholder, &key)? {
            PatchOutcome::Patched { occurrences } => {
                ui.success(&format!("API key written to {}", file));
                Ok(StepOutcome::Completed(format!(
                    "Replaced {} placeholder occurrence(s) in {}",
                    occurrences, file
                )))
            }
            PatchOutcome::NoPlaceholder => Ok(StepOutcome::Skipped(format!(
                "{} has no API key placeholder",
                file
            ))),
            PatchOutcome::MissingFile => Ok(StepOutcome::Warned(format!(
                "{} disappeared before the key could be written",
                file
            ))),
        }
    }

    fn run_tests(
        &mut self,
        ui: &mut dyn UserInterface,
        activation: &Activation,
        python: &Path,
    ) -> Result<StepOutcome> {
        let wanted = match self.options.run_tests {
            Some(answer) => answer,
            None => confirm(ui, "run_tests", "Run the test suite now?", false)?,
        };
        if !wanted {
            return Ok(StepOutcome::Skipped("Tests not run".to_string()));
        }

        let spec = activation.apply(
            CommandSpec::new(python)
                .args(&self.config.tests.args)
                .current_dir(&self.project_root),
        );
        ui.message(&format!("  $ {}", spec.display()));

        match self.runner.run(&spec) {
            Ok(result) if result.success => {
                ui.success("Tests passed");
                Ok(StepOutcome::Completed("Tests passed".to_string()))
            }
            Ok(result) => Ok(StepOutcome::Warned(format!(
                "Tests failed{}; continuing with setup",
                exit_code_suffix(result.exit_code)
            ))),
            Err(e) => Ok(StepOutcome::Warned(format!(
                "Could not run tests ({}); continuing with setup",
                e
            ))),
        }
    }

    fn launch_app(
        &mut self,
        ui: &mut dyn UserInterface,
        activation: &Activation,
        python: &Path,
        report: &mut SetupReport,
    ) -> Result<StepOutcome> {
        let config = self.config;
        let entry = &config.app.entry;
        let entry_name = entry.display().to_string();

        if !self.project_root.join(entry).is_file() {
            ui.warning(&format!("{} not found", entry_name));
            return Ok(StepOutcome::Skipped(format!(
                "Nothing to launch ({} missing)",
                entry_name
            )));
        }

        let wanted = match self.options.launch_app {
            Some(answer) => answer,
            None => confirm(
                ui,
                "launch_app",
                &format!("Launch {} now?", self.app_name()),
                false,
            )?,
        };
        if !wanted {
            ui.show_hint(&hints::launch_later(&entry_name));
            return Ok(StepOutcome::Skipped("Application not launched".to_string()));
        }

        let spec = activation.apply(
            CommandSpec::new(python)
                .arg(entry.as_os_str())
                .args(&config.app.args)
                .current_dir(&self.project_root),
        );
        ui.message(&format!("  Starting {} (Ctrl+C to stop)...", entry_name));

        let result = self.runner.run(&spec)?;
        let code = if result.success {
            0
        } else {
            result.exit_code.unwrap_or(1)
        };
        report.app_exit = Some(code);

        if code == 0 {
            Ok(StepOutcome::Completed(format!("{} exited normally", entry_name)))
        } else {
            Ok(StepOutcome::Warned(format!(
                "{} exited with code {}",
                entry_name, code
            )))
        }
    }
}

fn confirm(
    ui: &mut dyn UserInterface,
    key: &str,
    question: &str,
    default: bool,
) -> Result<bool> {
    let answer = ui.prompt(&Prompt::confirm(key, question, default))?;
    Ok(answer.as_bool().unwrap_or(default))
}

fn exit_code_suffix(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {})", code),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG_PY: &str = "import os\nGEMINI_API_KEY = \"<YOUR_GEMINI_API_KEY>\"\nDEBUG = True\n";

    struct Project {
        temp: TempDir,
        bin: PathBuf,
    }

    impl Project {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::create_dir(temp.path().join("proj")).unwrap();
            fs::create_dir(temp.path().join("bin")).unwrap();
            fs::write(temp.path().join("proj/requirements.txt"), "flask\n").unwrap();
            let bin = temp.path().join("bin");
            install_fake_python(&bin);
            Self { temp, bin }
        }

        fn root(&self) -> PathBuf {
            self.temp.path().join("proj")
        }

        fn write(&self, name: &str, contents: &str) {
            let path = self.root().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }

        fn existing_venv(&self) -> VenvLayout {
            let layout = VenvLayout::new(&self.root(), Path::new("venv"));
            fs::create_dir_all(layout.bin_dir()).unwrap();
            fs::write(layout.python(), "").unwrap();
            fs::write(layout.root().join("marker"), "keep me").unwrap();
            layout
        }
    }

    #[cfg(unix)]
    fn install_fake_python(bin: &Path) {
        use std::os::unix::fs::PermissionsExt;
        let path = bin.join("python3");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(not(unix))]
    fn install_fake_python(bin: &Path) {
        fs::write(bin.join("python.exe"), "").unwrap();
    }

    fn runner() -> MockRunner {
        let mut runner = MockRunner::new();
        runner.respond("--version", 0, "Python 3.11.4");
        runner
    }

    fn run_setup(
        project: &Project,
        config: &SetupConfig,
        options: SetupOptions,
        runner: &mut MockRunner,
        ui: &mut MockUI,
    ) -> Result<SetupReport> {
        SetupWorkflow::new(config, project.root(), options, runner)
            .with_path_entries(vec![project.bin.clone()])
            .run(ui)
    }

    #[test]
    fn fresh_project_runs_all_steps_with_defaults() {
        let project = Project::new();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();

        let report = run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui)
            .unwrap();

        assert_eq!(ui.progress().len(), 9);
        assert_eq!(ui.progress()[0], (1, 9, "Checking for Python".to_string()));
        assert!(runner.ran("-m venv venv"));
        assert!(runner.ran("-m pip install --upgrade pip"));
        assert!(runner.ran("-m pip install -r requirements.txt"));
        assert!(!runner.ran("pytest"));
        assert!(ui.has_success("Setup complete!"));
        assert!(!ui.was_prompted("recreate_venv"));
        assert!(!ui.was_prompted("enter_api_key"));
        assert!(ui.was_prompted("run_tests"));
        assert!(!ui.was_prompted("launch_app"));
        assert!(ui.has_warning("app.py not found"));
        assert_eq!(report.steps.len(), 9);
        assert_eq!(report.exit_code(), 0);
        assert!(project.root().join("venv").is_dir());
    }

    #[test]
    fn verbose_mode_echoes_commands_in_order() {
        let project = Project::new();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::with_mode(crate::ui::OutputMode::Verbose);

        run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        let lines = runner.command_lines();
        let position = |needle: &str| lines.iter().position(|l| l.contains(needle));
        let create = position("-m venv").unwrap();
        let upgrade = position("--upgrade pip").unwrap();
        let install = position("install -r").unwrap();
        assert!(create < upgrade && upgrade < install);
        assert!(ui.has_message("$ "));
        assert!(ui.has_message("-m pip install -r requirements.txt"));
    }

    #[test]
    fn missing_interpreter_fails_before_touching_anything() {
        let project = Project::new();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();

        let err = SetupWorkflow::new(&config, project.root(), SetupOptions::default(), &mut runner)
            .with_path_entries(vec![])
            .run(&mut ui)
            .unwrap_err();

        assert!(matches!(err, SetupError::InterpreterMissing { .. }));
        assert!(runner.calls().is_empty());
        assert!(!project.root().join("venv").exists());
        assert!(ui.has_hint("Install Python"));
    }

    #[test]
    fn interpreter_below_minimum_is_fatal() {
        let project = Project::new();
        let mut config = SetupConfig::default();
        config.interpreter.min_version = Some("3.12".to_string());
        let mut runner = runner();
        let mut ui = MockUI::new();

        let err = run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui)
            .unwrap_err();
        assert!(matches!(err, SetupError::InterpreterTooOld { .. }));
        assert!(!project.root().join("venv").exists());
    }

    #[test]
    fn declining_recreate_leaves_venv_untouched() {
        let project = Project::new();
        let layout = project.existing_venv();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response("recreate_venv", "n");

        run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert!(ui.was_prompted("recreate_venv"));
        assert_eq!(
            fs::read_to_string(layout.root().join("marker")).unwrap(),
            "keep me"
        );
        assert!(!runner.ran("-m venv"));
        assert!(runner.ran("pip install -r"));
    }

    #[test]
    fn accepting_recreate_deletes_then_recreates() {
        let project = Project::new();
        let layout = project.existing_venv();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response("recreate_venv", "y");

        let report =
            run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert!(!layout.root().join("marker").exists());
        assert!(layout.python().is_file());
        assert!(runner.ran("-m venv venv"));
        assert!(report
            .outcome(SetupStep::VenvCheck)
            .is_some_and(StepOutcome::is_completed));
    }

    #[test]
    fn recreate_option_skips_prompt() {
        let project = Project::new();
        project.existing_venv();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        let options = SetupOptions {
            recreate_venv: Some(false),
            ..Default::default()
        };

        run_setup(&project, &config, options, &mut runner, &mut ui).unwrap();
        assert!(!ui.was_prompted("recreate_venv"));
        assert!(!runner.ran("-m venv"));
    }

    #[test]
    fn incomplete_venv_defaults_to_recreate() {
        let project = Project::new();
        fs::create_dir(project.root().join("venv")).unwrap();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();

        run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert!(ui.has_warning("no Python interpreter"));
        assert!(runner.ran("-m venv venv"));
    }

    #[test]
    fn incomplete_venv_kept_is_fatal() {
        let project = Project::new();
        fs::create_dir(project.root().join("venv")).unwrap();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response("recreate_venv", "n");

        let err = run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui)
            .unwrap_err();
        assert!(matches!(err, SetupError::VenvIncomplete { .. }));
        assert!(!runner.ran("pip"));
    }

    #[test]
    fn commands_run_inside_activated_venv() {
        let project = Project::new();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();

        run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        let layout = VenvLayout::new(&project.root(), Path::new("venv"));
        let install = runner
            .calls()
            .iter()
            .find(|c| c.display().contains("install -r"))
            .unwrap();
        assert_eq!(install.program, layout.python());
        assert_eq!(install.cwd.as_deref(), Some(project.root().as_path()));
        assert_eq!(
            install.env.get("VIRTUAL_ENV"),
            Some(&layout.root().as_os_str().to_os_string())
        );
        let path = install.env.get("PATH").unwrap();
        assert_eq!(
            std::env::split_paths(path).next(),
            Some(layout.bin_dir())
        );
        assert!(install.env_remove.contains(&"PYTHONHOME".to_string()));
    }

    #[test]
    fn pip_upgrade_can_be_disabled() {
        let project = Project::new();
        let config = SetupConfig {
            upgrade_pip: false,
            ..Default::default()
        };
        let mut runner = runner();
        let mut ui = MockUI::new();

        let report =
            run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();
        assert!(!runner.ran("--upgrade pip"));
        assert!(report
            .outcome(SetupStep::PipUpgrade)
            .is_some_and(StepOutcome::is_skipped));
    }

    #[test]
    fn failed_dependency_install_aborts() {
        let project = Project::new();
        let config = SetupConfig::default();
        let mut runner = runner();
        runner.respond("install -r", 1, "ERROR: No matching distribution found for flask");
        let mut ui = MockUI::new();
        let options = SetupOptions {
            run_tests: Some(true),
            ..Default::default()
        };

        let err = run_setup(&project, &config, options, &mut runner, &mut ui).unwrap_err();

        assert!(matches!(err, SetupError::CommandFailed { code: Some(1), .. }));
        assert!(ui.has_error("install -r"));
        assert!(ui.has_message("No matching distribution"));
        assert!(!runner.ran("pytest"));
        assert!(!ui.has_success("Setup complete!"));
    }

    #[test]
    fn failed_pip_upgrade_aborts() {
        let project = Project::new();
        let config = SetupConfig::default();
        let mut runner = runner();
        runner.respond("--upgrade pip", 2, "");
        let mut ui = MockUI::new();

        let err = run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui)
            .unwrap_err();
        assert!(matches!(err, SetupError::CommandFailed { code: Some(2), .. }));
        assert!(!runner.ran("install -r"));
    }

    #[test]
    fn missing_manifest_is_fatal() {
        let project = Project::new();
        fs::remove_file(project.root().join("requirements.txt")).unwrap();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();

        let err = run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui)
            .unwrap_err();
        assert!(matches!(err, SetupError::ManifestNotFound { .. }));
    }

    #[test]
    fn api_key_replaces_placeholder_only() {
        let project = Project::new();
        project.write("config.py", CONFIG_PY);
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response("enter_api_key", "y");
        ui.set_prompt_response("api_key", "  AIzaSecret123 ");

        let report =
            run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert_eq!(
            fs::read_to_string(project.root().join("config.py")).unwrap(),
            "import os\nGEMINI_API_KEY = \"AIzaSecret123\"\nDEBUG = True\n"
        );
        assert!(report
            .outcome(SetupStep::ApiKey)
            .is_some_and(StepOutcome::is_completed));
        assert!(ui.has_hint("GEMINI_API_KEY=<your key>"));
        assert!(ui.all_text().iter().all(|t| !t.contains("AIzaSecret123")));
    }

    #[test]
    fn api_key_option_answers_both_prompts() {
        let project = Project::new();
        project.write("config.py", CONFIG_PY);
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        let options = SetupOptions {
            api_key: Some("from-flag".to_string()),
            ..Default::default()
        };

        run_setup(&project, &config, options, &mut runner, &mut ui).unwrap();

        assert!(!ui.was_prompted("enter_api_key"));
        assert!(!ui.was_prompted("api_key"));
        let text = fs::read_to_string(project.root().join("config.py")).unwrap();
        assert!(text.contains("\"from-flag\""));
    }

    #[test]
    fn config_without_placeholder_is_not_touched() {
        let project = Project::new();
        let original = "GEMINI_API_KEY = \"already-set\"\r\nDEBUG = False";
        project.write("config.py", original);
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();

        let report =
            run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert!(!ui.was_prompted("enter_api_key"));
        assert_eq!(
            fs::read(project.root().join("config.py")).unwrap(),
            original.as_bytes()
        );
        assert!(report
            .outcome(SetupStep::ApiKey)
            .is_some_and(StepOutcome::is_skipped));
    }

    #[test]
    fn empty_key_warns_and_keeps_file() {
        let project = Project::new();
        project.write("config.py", CONFIG_PY);
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response("enter_api_key", "y");
        ui.set_prompt_response("api_key", "   ");

        run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert!(ui.has_warning("No API key entered"));
        assert!(ui.has_hint("GEMINI_API_KEY"));
        assert_eq!(
            fs::read_to_string(project.root().join("config.py")).unwrap(),
            CONFIG_PY
        );
    }

    #[test]
    fn invalid_key_warns_and_keeps_file() {
        let project = Project::new();
        project.write("config.py", CONFIG_PY);
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        let options = SetupOptions {
            api_key: Some("abc\"def".to_string()),
            ..Default::default()
        };

        run_setup(&project, &config, options, &mut runner, &mut ui).unwrap();

        assert!(ui.has_warning("Invalid API key"));
        assert_eq!(
            fs::read_to_string(project.root().join("config.py")).unwrap(),
            CONFIG_PY
        );
    }

    #[test]
    fn declining_key_entry_keeps_file() {
        let project = Project::new();
        project.write("config.py", CONFIG_PY);
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();

        run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert!(ui.was_prompted("enter_api_key"));
        assert!(!ui.was_prompted("api_key"));
        assert_eq!(
            fs::read_to_string(project.root().join("config.py")).unwrap(),
            CONFIG_PY
        );
    }

    #[test]
    fn failing_tests_do_not_abort() {
        let project = Project::new();
        project.write("app.py", "print('hi')\n");
        let config = SetupConfig::default();
        let mut runner = runner();
        runner.respond("pytest", 1, "1 failed");
        let mut ui = MockUI::new();
        ui.set_prompt_response("run_tests", "y");

        let report =
            run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert!(runner.ran("-m pytest"));
        assert!(ui.has_warning("Tests failed (exit code 1)"));
        assert!(ui.has_success("Setup complete!"));
        assert!(ui.was_prompted("launch_app"));
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn passing_tests_are_completed() {
        let project = Project::new();
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();
        let options = SetupOptions {
            run_tests: Some(true),
            ..Default::default()
        };

        let report = run_setup(&project, &config, options, &mut runner, &mut ui).unwrap();
        assert!(report
            .outcome(SetupStep::Tests)
            .is_some_and(StepOutcome::is_completed));
    }

    #[test]
    fn launched_app_exit_code_is_reported() {
        let project = Project::new();
        project.write("app.py", "import sys; sys.exit(3)\n");
        let config = SetupConfig::default();
        let mut runner = runner();
        runner.respond("app.py", 3, "");
        let mut ui = MockUI::new();
        ui.set_prompt_response("launch_app", "yes");

        let report =
            run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert_eq!(report.app_exit, Some(3));
        assert_eq!(report.exit_code(), 3);
        assert!(ui.has_success("Setup complete!"));
    }

    #[test]
    fn declined_launch_shows_hint() {
        let project = Project::new();
        project.write("app.py", "print('hi')\n");
        let config = SetupConfig::default();
        let mut runner = runner();
        let mut ui = MockUI::new();

        let report =
            run_setup(&project, &config, SetupOptions::default(), &mut runner, &mut ui).unwrap();

        assert!(!runner.ran("app.py"));
        assert!(ui.has_hint("python app.py"));
        assert_eq!(report.app_exit, None);
    }

    #[test]
    fn exit_code_is_clamped() {
        let report = SetupReport {
            app_exit: Some(300),
            ..Default::default()
        };
        assert_eq!(report.exit_code(), 255);

        let report = SetupReport {
            app_exit: Some(-2),
            ..Default::default()
        };
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn app_name_prefers_config() {
        let project = Project::new();
        let mut runner = runner();
        let config = SetupConfig {
            app_name: Some("Chatbot".to_string()),
            ..Default::default()
        };
        let workflow =
            SetupWorkflow::new(&config, project.root(), SetupOptions::default(), &mut runner);
        assert_eq!(workflow.app_name(), "Chatbot");

        let config = SetupConfig::default();
        let mut runner = MockRunner::new();
        let workflow =
            SetupWorkflow::new(&config, project.root(), SetupOptions::default(), &mut runner);
        assert_eq!(workflow.app_name(), "proj");
    }
}

//! Setup command implementation.
//!
//! The `venvstrap setup` command (also the default) runs the setup workflow.

use std::path::{Path, PathBuf};

use crate::cli::args::SetupArgs;
use crate::config::load_config;
use crate::error::Result;
use crate::runner::{SetupReport, SetupWorkflow};
use crate::shell::{ProcessRunner, SystemRunner};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The setup command implementation.
pub struct SetupCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: SetupArgs,
}

impl SetupCommand {
    /// Create a new setup command.
    pub fn new(project_root: &Path, config_path: Option<PathBuf>, args: SetupArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path,
            args,
        }
    }

    /// Run the workflow with an explicit process runner and PATH.
    pub fn run_with(
        &self,
        runner: &mut dyn ProcessRunner,
        path_entries: Option<Vec<PathBuf>>,
        ui: &mut dyn UserInterface,
    ) -> Result<SetupReport> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        let mut workflow =
            SetupWorkflow::new(&config, &self.project_root, self.args.to_options(), runner);
        if let Some(entries) = path_entries {
            workflow = workflow.with_path_entries(entries);
        }
        workflow.run(ui)
    }
}

impl Command for SetupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut runner = SystemRunner::new();
        let report = self.run_with(&mut runner, None, ui)?;
        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}

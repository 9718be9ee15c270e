//! The fixed sequence of setup steps and their outcomes.

use std::fmt;

/// One step of the setup sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupStep {
    Interpreter,
    ProjectRoot,
    VenvCheck,
    VenvCreate,
    PipUpgrade,
    Dependencies,
    ApiKey,
    Tests,
    Launch,
}

impl SetupStep {
    /// Every step, in the order the workflow runs them.
    pub const ALL: [SetupStep; 9] = [
        SetupStep::Interpreter,
        SetupStep::ProjectRoot,
        SetupStep::VenvCheck,
        SetupStep::VenvCreate,
        SetupStep::PipUpgrade,
        SetupStep::Dependencies,
        SetupStep::ApiKey,
        SetupStep::Tests,
        SetupStep::Launch,
    ];

    /// Number of steps.
    pub const COUNT: usize = Self::ALL.len();

    /// 1-based position, as shown in `[n/9]`.
    pub fn number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Progress label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Interpreter => "Checking for Python",
            Self::ProjectRoot => "Locating project",
            Self::VenvCheck => "Checking virtual environment",
            Self::VenvCreate => "Preparing virtual environment",
            Self::PipUpgrade => "Upgrading pip",
            Self::Dependencies => "Installing dependencies",
            Self::ApiKey => "Configuring API key",
            Self::Tests => "Running tests",
            Self::Launch => "Launching application",
        }
    }

    /// Stable identifier, used in logs.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Interpreter => "interpreter",
            Self::ProjectRoot => "project_root",
            Self::VenvCheck => "venv_check",
            Self::VenvCreate => "venv_create",
            Self::PipUpgrade => "pip_upgrade",
            Self::Dependencies => "dependencies",
            Self::ApiKey => "api_key",
            Self::Tests => "tests",
            Self::Launch => "launch",
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a step ended, when it did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step did its work.
    Completed(String),
    /// The step had nothing to do or was declined.
    Skipped(String),
    /// The step failed in a way the run tolerates.
    Warned(String),
}

impl StepOutcome {
    /// Detail text carried by any variant.
    pub fn detail(&self) -> &str {
        match self {
            Self::Completed(s) | Self::Skipped(s) | Self::Warned(s) => s,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn is_warned(&self) -> bool {
        matches!(self, Self::Warned(_))
    }
}

/// A step paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: SetupStep,
    pub outcome: StepOutcome,
}

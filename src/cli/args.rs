//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::runner::SetupOptions;
use crate::secrets::REDACTED;

/// venvstrap - Python project environment bootstrap.
#[derive(Debug, Parser)]
#[command(name = "venvstrap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .venvstrap.yml)
    #[arg(short, long, global = true, env = "VENVSTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides discovery from the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show child process output as it runs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output; repeat (-qq) to show errors only
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the virtual environment and install dependencies (default)
    Setup(SetupArgs),

    /// Report the state of the project without changing anything
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `setup` command.
///
/// Each flag pre-answers one prompt. Without flags every decision is asked
/// interactively.
#[derive(Clone, Default, clap::Args)]
pub struct SetupArgs {
    /// Delete and recreate an existing virtual environment
    #[arg(long, conflicts_with = "keep_venv")]
    pub recreate: bool,

    /// Keep an existing virtual environment
    #[arg(long)]
    pub keep_venv: bool,

    /// API key to write into the config file
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Leave the config file's API key placeholder alone
    #[arg(long, conflicts_with = "api_key")]
    pub skip_api_key: bool,

    /// Run the test suite after installing
    #[arg(long, conflicts_with = "skip_tests")]
    pub run_tests: bool,

    /// Do not run the test suite
    #[arg(long)]
    pub skip_tests: bool,

    /// Launch the application when setup finishes
    #[arg(long, conflicts_with = "no_launch")]
    pub launch: bool,

    /// Do not launch the application
    #[arg(long)]
    pub no_launch: bool,

    /// Never prompt; use defaults and VENVSTRAP_PROMPT_* overrides
    #[arg(short = 'y', long)]
    pub non_interactive: bool,
}

impl SetupArgs {
    /// Prompt answers implied by the flags.
    pub fn to_options(&self) -> SetupOptions {
        SetupOptions {
            recreate_venv: flag_pair(self.recreate, self.keep_venv),
            api_key: self.api_key.clone(),
            skip_api_key: self.skip_api_key,
            run_tests: flag_pair(self.run_tests, self.skip_tests),
            launch_app: flag_pair(self.launch, self.no_launch),
        }
    }
}

// Hand-written so the key stays out of `--debug` logs.
impl std::fmt::Debug for SetupArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupArgs")
            .field("recreate", &self.recreate)
            .field("keep_venv", &self.keep_venv)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("skip_api_key", &self.skip_api_key)
            .field("run_tests", &self.run_tests)
            .field("skip_tests", &self.skip_tests)
            .field("launch", &self.launch)
            .field("no_launch", &self.no_launch)
            .field("non_interactive", &self.non_interactive)
            .finish()
    }
}

fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

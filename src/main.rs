//! venvstrap CLI entry point.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use venvstrap::cli::{Cli, CommandDispatcher, Commands};
use venvstrap::config::SetupConfig;
use venvstrap::project::resolve_project_root;
use venvstrap::shell::is_ci;
use venvstrap::ui::{create_ui, OutputMode};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("venvstrap=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("venvstrap=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("venvstrap starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.quiet, cli.verbose);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    // Prompts need a terminal on both ends.
    let attended = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let is_interactive = match &cli.command {
        Some(Commands::Setup(args)) => !args.non_interactive && !is_ci() && attended,
        _ => !is_ci() && attended,
    };

    let mut ui = create_ui(is_interactive, output_mode);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            ui.error(&format!("Error: cannot read current directory: {}", e));
            return ExitCode::from(1);
        }
    };

    // Discovery runs before the config is read, so it looks for the
    // default manifest name.
    let manifest = SetupConfig::default().requirements;
    let project_root = match resolve_project_root(cli.project.as_deref(), &cwd, &manifest) {
        Ok(root) => root,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            return ExitCode::from(1);
        }
    };

    let config_path = cli.config.as_deref().map(|p| absolute(p, &cwd));
    let dispatcher = CommandDispatcher::new(project_root, config_path);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}

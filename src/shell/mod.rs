//! Child process execution and platform helpers.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{
    captured, CommandResult, CommandSpec, OutputCallback, OutputLine, ProcessRunner, StdioMode,
    SystemRunner,
};
pub use mock::MockRunner;
pub use platform::{
    executable_extensions, export_hint, is_ci, is_executable, parse_system_path, prepend_path,
};

//! Python interpreter discovery and version checks.

pub mod discovery;
pub mod version;

pub use discovery::{discover, locate, query_version, resolve_program, Interpreter};
pub use version::PythonVersion;

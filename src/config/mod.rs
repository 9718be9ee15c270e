//! Configuration loading and schema.
//!
//! The project config (`.venvstrap.yml`) is optional. When absent, the
//! defaults in [`schema`] reproduce the behaviour of the classic setup
//! scripts: `venv/`, `requirements.txt`, `config.py`, `app.py`.

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_file, parse_config, project_config_path, CONFIG_FILE_NAME};
pub use schema::{
    AppConfig, CredentialsConfig, InterpreterConfig, SetupConfig, TestsConfig, DEFAULT_API_KEY_ENV,
    DEFAULT_PLACEHOLDER,
};

//! Virtual environment layout and lifecycle.
//!
//! - [`layout`] - where things live inside a venv, and activation
//! - [`manager`] - creating and deleting the directory

pub mod layout;
pub mod manager;

pub use layout::{bin_dir_name, python_file_name, Activation, VenvLayout, VenvStatus};
pub use manager::{create, create_command, remove};

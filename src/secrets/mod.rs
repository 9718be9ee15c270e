//! Credential injection and secret masking.
//!
//! - [`placeholder`] - find and replace the API key placeholder in a config file
//! - [`OutputMasker`] - keeps the key out of messages and logs
//!
//! # Example
//!
//! ```
//! use venvstrap::secrets::{validate_key, OutputMasker};
//!
//! let key = validate_key("  my-api-key \n").unwrap();
//! let mut masker = OutputMasker::new();
//! masker.add_secret(key.clone());
//! assert!(!masker.mask(&format!("using {}", key)).contains("my-api-key"));
//! ```

pub mod mask;
pub mod placeholder;

pub use mask::{OutputMasker, REDACTED};
pub use placeholder::{
    contains_placeholder, patch_config_file, placeholder_state, substitute, validate_key,
    InvalidKey, PatchOutcome, PlaceholderState,
};

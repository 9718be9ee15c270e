//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{Result, SetupError};

use super::{
    answer_from_text, OutputMode, Prompt, PromptResult, SpinnerHandle, UserInterface,
};

/// Prefix of environment variables that answer prompts by key.
pub const PROMPT_ENV_PREFIX: &str = "VENVSTRAP_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Never reads stdin. A prompt with key `run_tests` is answered from
/// `VENVSTRAP_PROMPT_RUN_TESTS` when set, otherwise from the prompt's
/// default. A prompt with neither is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }

    /// Environment variable name answering `key`.
    pub fn env_key(key: &str) -> String {
        format!("{}{}", PROMPT_ENV_PREFIX, key.to_uppercase())
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("→ {}", hint);
        }
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        if let Some(value) = self.env_overrides.get(&Self::env_key(&prompt.key)) {
            tracing::debug!("Prompt '{}' answered from environment", prompt.key);
            return Ok(answer_from_text(prompt, value));
        }

        if let Some(default) = &prompt.default {
            return Ok(answer_from_text(prompt, default));
        }

        Err(SetupError::PromptUnavailable {
            key: prompt.key.clone(),
            message: format!(
                "no default in non-interactive mode (set {})",
                Self::env_key(&prompt.key)
            ),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("  {}", message);
        }
        Box::new(LineSpinner { mode: self.mode })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_progress(&mut self, current: usize, total: usize, label: &str) {
        if self.mode.shows_progress() {
            println!("[{}/{}] {}", current, total, label);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints the final status as a plain line.
struct LineSpinner {
    mode: OutputMode,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  ✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("  ✗ {}", msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  ○ {}", msg);
        }
    }
}

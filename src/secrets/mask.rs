//! Masking of secret values in messages and logs.

/// Text shown in place of a secret.
pub const REDACTED: &str = "[REDACTED]";

/// Replaces registered secret values with a mask string.
///
/// # Example
///
/// ```
/// use venvstrap::secrets::OutputMasker;
///
/// let mut masker = OutputMasker::new();
/// masker.add_secret("AIzaSyExample");
///
/// let output = masker.mask("patched key AIzaSyExample into config.py");
/// assert_eq!(output, "patched key [REDACTED] into config.py");
/// ```
#[derive(Debug, Clone)]
pub struct OutputMasker {
    secrets: Vec<String>,
    mask: String,
}

impl OutputMasker {
    /// Create a new masker with the default `[REDACTED]` mask.
    pub fn new() -> Self {
        Self::with_mask(REDACTED)
    }

    /// Create a masker with a custom mask string.
    pub fn with_mask(mask: impl Into<String>) -> Self {
        Self {
            secrets: Vec::new(),
            mask: mask.into(),
        }
    }

    /// Register a secret value to be masked.
    ///
    /// Empty strings and duplicates are ignored.
    pub fn add_secret(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() && !self.secrets.contains(&value) {
            self.secrets.push(value);
            // Longest first so a secret containing another is masked whole.
            self.secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));
        }
    }

    /// Mask any secret values in the given string.
    pub fn mask(&self, input: &str) -> String {
        let mut result = input.to_string();
        for secret in &self.secrets {
            result = result.replace(secret.as_str(), &self.mask);
        }
        result
    }

    /// Get the number of registered secrets.
    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }
}

impl Default for OutputMasker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_every_occurrence() {
        let mut masker = OutputMasker::new();
        masker.add_secret("k3y");
        assert_eq!(masker.mask("k3y and k3y"), "[REDACTED] and [REDACTED]");
    }

    #[test]
    fn ignores_empty_and_duplicate_secrets() {
        let mut masker = OutputMasker::new();
        masker.add_secret("");
        masker.add_secret("abc");
        masker.add_secret("abc");
        assert_eq!(masker.secret_count(), 1);
    }

    #[test]
    fn longer_secret_masked_before_its_prefix() {
        let mut masker = OutputMasker::with_mask("***");
        masker.add_secret("abc");
        masker.add_secret("abcdef");
        assert_eq!(masker.mask("key=abcdef"), "key=***");
    }

    #[test]
    fn no_masking_without_secrets() {
        let masker = OutputMasker::default();
        assert_eq!(masker.mask("nothing to hide"), "nothing to hide");
    }
}

//! In-place credential injection.
//!
//! A project ships a config file with a literal placeholder token, e.g.
//!
//! ```text
//! GEMINI_API_KEY = "<YOUR_GEMINI_API_KEY>"
//! ```
//!
//! and setup replaces the token with the user's key. Only the token's bytes
//! change; line endings, other lines and the trailing newline are kept.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Whether `text` contains the placeholder token.
///
/// Works on raw bytes so files in any encoding can be inspected.
pub fn contains_placeholder(text: impl AsRef<[u8]>, placeholder: &str) -> bool {
    find(text.as_ref(), placeholder.as_bytes(), 0).is_some()
}

/// Replace every occurrence of `placeholder` with `key`.
///
/// Bytes outside the placeholder are copied unchanged, whether or not they
/// are valid UTF-8.
pub fn substitute(text: impl AsRef<[u8]>, placeholder: &str, key: &str) -> Vec<u8> {
    let text = text.as_ref();
    let needle = placeholder.as_bytes();
    let mut out = Vec::with_capacity(text.len());
    let mut from = 0;
    while let Some(at) = find(text, needle, from) {
        out.extend_from_slice(&text[from..at]);
        out.extend_from_slice(key.as_bytes());
        from = at + needle.len();
    }
    out.extend_from_slice(&text[from..]);
    out
}

/// Why a key was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidKey {
    /// Nothing left after trimming.
    Empty,
    /// Contains a character that cannot sit inside a quoted config value.
    ForbiddenChar(char),
}

impl std::fmt::Display for InvalidKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "no key entered"),
            Self::ForbiddenChar(c) if c.is_whitespace() => {
                write!(f, "key contains whitespace")
            }
            Self::ForbiddenChar(c) if c.is_control() => {
                write!(f, "key contains a control character")
            }
            Self::ForbiddenChar(c) => write!(f, "key contains '{}'", c),
        }
    }
}

/// Trim and check a user-supplied key.
///
/// Surrounding whitespace is dropped. The key must be non-empty and free of
/// whitespace, quotes, backslashes and control characters.
pub fn validate_key(raw: &str) -> std::result::Result<String, InvalidKey> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(InvalidKey::Empty);
    }
    if let Some(c) = key
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '\\'))
    {
        return Err(InvalidKey::ForbiddenChar(c));
    }
    Ok(key.to_string())
}

/// What [`patch_config_file`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum PatchOutcome {
    /// The config file does not exist.
    MissingFile,
    /// The file exists but has no placeholder; it was not touched.
    NoPlaceholder,
    /// The placeholder was replaced.
    Patched { occurrences: usize },
}

/// Placeholder presence in a config file, as seen without modifying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum PlaceholderState {
    /// The config file does not exist.
    MissingFile,
    /// The file exists and has no placeholder (key already set, or none needed).
    Absent,
    /// The placeholder is still in the file.
    Present { occurrences: usize },
}

/// Inspect a config file without modifying it.
pub fn placeholder_state(path: &Path, placeholder: &str) -> Result<PlaceholderState> {
    if !path.is_file() {
        return Ok(PlaceholderState::MissingFile);
    }
    let bytes = fs::read(path)?;
    if !contains_placeholder(&bytes, placeholder) {
        return Ok(PlaceholderState::Absent);
    }
    Ok(PlaceholderState::Present {
        occurrences: count(&bytes, placeholder),
    })
}

/// Replace the placeholder in `path` with `key`.
///
/// The new contents go to a sibling temporary file that is then renamed
/// over the original. A file without the placeholder is never rewritten.
pub fn patch_config_file(path: &Path, placeholder: &str, key: &str) -> Result<PatchOutcome> {
    if !path.is_file() {
        return Ok(PatchOutcome::MissingFile);
    }

    let bytes = fs::read(path)?;
    if !contains_placeholder(&bytes, placeholder) {
        return Ok(PatchOutcome::NoPlaceholder);
    }

    let occurrences = count(&bytes, placeholder);
    let patched = substitute(&bytes, placeholder, key);
    write_replacing(path, &patched)?;
    tracing::info!(
        "Replaced {} placeholder occurrence(s) in {}",
        occurrences,
        path.display()
    );

    Ok(PatchOutcome::Patched { occurrences })
}

fn count(text: &[u8], placeholder: &str) -> usize {
    let needle = placeholder.as_bytes();
    let mut found = 0;
    let mut from = 0;
    while let Some(at) = find(text, needle, from) {
        found += 1;
        from = at + needle.len();
    }
    found
}

/// Offset of the first `needle` at or after `from`. An empty needle never matches.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|at| at + from)
}

fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.venvstrap-tmp", file_name));

    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        if let Ok(meta) = fs::metadata(path) {
            file.set_permissions(meta.permissions())?;
        }
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    Ok(written?)
}

//! Python version parsing and comparison.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Matches `Python 3.11.4`, `Python 3.12.0rc1`, `Python 2.7`.
static VERSION_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Python\s+(\d+)\.(\d+)(?:\.(\d+))?").expect("valid version regex")
});

/// Matches a bare requirement like `3.9` or `3.10.2`.
static VERSION_REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\.(\d+)(?:\.(\d+))?\s*$").expect("valid requirement regex")
});

/// A Python interpreter version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PythonVersion {
    /// Create a version.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the version from `python --version` output.
    ///
    /// Python 2 prints to stderr and Python 3 to stdout, so callers pass the
    /// combined output.
    pub fn from_output(output: &str) -> Option<Self> {
        let caps = VERSION_OUTPUT.captures(output)?;
        Some(Self::from_captures(&caps))
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Self {
        let num = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        Self::new(num(1), num(2), num(3))
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for PythonVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VERSION_REQUIREMENT
            .captures(s)
            .map(|caps| Self::from_captures(&caps))
            .ok_or_else(|| format!("invalid Python version: {}", s))
    }
}

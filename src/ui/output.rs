//! Output verbosity.

/// How much the UI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Child process output is streamed as it arrives.
    Verbose,
    /// Step headers, spinners, and status lines.
    #[default]
    Normal,
    /// Status lines and spinners, no step headers (`-q`).
    Quiet,
    /// Errors only (`-qq`).
    Silent,
}

impl OutputMode {
    /// Map the `-q` count and `-v` flag to a mode.
    ///
    /// Quiet wins if both are somehow given.
    pub fn from_flags(quiet: u8, verbose: bool) -> Self {
        match (quiet, verbose) {
            (0, true) => Self::Verbose,
            (0, false) => Self::Normal,
            (1, _) => Self::Quiet,
            _ => Self::Silent,
        }
    }

    pub fn shows_command_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    pub fn shows_spinners(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// The `[n/9] Step` lines.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_select_mode() {
        assert_eq!(OutputMode::from_flags(0, false), OutputMode::Normal);
        assert_eq!(OutputMode::from_flags(0, true), OutputMode::Verbose);
        assert_eq!(OutputMode::from_flags(1, false), OutputMode::Quiet);
        assert_eq!(OutputMode::from_flags(3, false), OutputMode::Silent);
    }

    #[test]
    fn only_verbose_streams_command_output() {
        assert!(OutputMode::Verbose.shows_command_output());
        assert!(!OutputMode::Normal.shows_command_output());
        assert!(!OutputMode::Quiet.shows_command_output());
    }

    #[test]
    fn silent_keeps_only_errors() {
        assert!(!OutputMode::Silent.shows_status());
        assert!(!OutputMode::Silent.shows_spinners());
        assert!(!OutputMode::Silent.shows_progress());
        assert!(OutputMode::Quiet.shows_status());
        assert!(!OutputMode::Quiet.shows_progress());
    }
}

//! How serious a diagnostic is.
//!
//! Passes report progress as notes, recoverable problems (an unplaced clock
//! buffer, an unknown constraint port) as warnings, and anything that stops
//! the current operation as an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic, ordered `Note < Warning < Error`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Pass progress or debug output.
    Note,
    /// The flow continues, but a resource was skipped or left to a later pass.
    Warning,
    /// The current operation stopped.
    Error,
}

impl Severity {
    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// ANSI SGR color code used for the rendered header.
    pub fn ansi_color(self) -> &'static str {
        match self {
            Severity::Note => "36",
            Severity::Warning => "33",
            Severity::Error => "31",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

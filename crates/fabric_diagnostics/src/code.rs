//! Diagnostic codes with category prefixes for structured error identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
///
/// Each category maps to a single-character prefix used in diagnostic code
/// display (e.g., `D001` for a device database problem, `R002` for routing).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// General error diagnostics, prefixed with `E`.
    Error,
    /// General warning diagnostics, prefixed with `W`.
    Warning,
    /// Device database diagnostics, prefixed with `D`.
    Chipdb,
    /// Placement diagnostics, prefixed with `P`.
    Place,
    /// Dedicated-net routing diagnostics, prefixed with `R`.
    Route,
    /// Timing and delay diagnostics, prefixed with `T`.
    Timing,
    /// Constraint file diagnostics, prefixed with `X`.
    Constraint,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Chipdb => 'D',
            Category::Place => 'P',
            Category::Route => 'R',
            Category::Timing => 'T',
            Category::Constraint => 'X',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `E101`, `R003`, `X001`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

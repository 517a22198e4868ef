//! Diagnostic creation, severity management, and terminal rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels,
//! category-prefixed codes, and optional file locations. The thread-safe
//! [`DiagnosticSink`] accumulates diagnostics while the device is loaded and
//! while placement and routing passes run, and [`TerminalRenderer`] formats
//! them for the command line.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Location};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;

//! Loader for the XDC constraint subset used to pin ports.
//!
//! Only `set_property <KEY> <VALUE> [get_ports <name>]` is applied; the
//! property lands in the attribute map of the port's cell. Other commands are
//! reported and skipped.

use crate::netlist::Netlist;
use fabric_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Location};
use std::path::Path;

/// Properties that are accepted but have no effect.
const IGNORED_PROPERTIES: [&str; 1] = ["INTERNAL_VREF"];

/// A malformed constraint file.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    /// The file could not be read.
    #[error("failed to read constraint file '{path}': {source}")]
    Io {
        /// The file.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },
    /// `set_property` with the wrong number of arguments.
    #[error("expected four arguments to 'set_property' (on line {line})")]
    Arity {
        /// 1-based line number.
        line: u32,
    },
    /// A target that is not a bracketed command with a name.
    #[error("failed to parse target '{target}' (on line {line})")]
    BadTarget {
        /// 1-based line number.
        line: u32,
        /// The offending argument.
        target: String,
    },
    /// A target command other than `get_ports`.
    #[error("targets other than 'get_ports' are not supported (on line {line})")]
    UnsupportedTarget {
        /// 1-based line number.
        line: u32,
    },
    /// Brackets left open at the end of a line.
    #[error("unbalanced brackets (on line {line})")]
    Unbalanced {
        /// 1-based line number.
        line: u32,
    },
}

fn code(number: u16) -> DiagnosticCode {
    DiagnosticCode::new(Category::Constraint, number)
}

/// Splits a line into blank-separated arguments. With `group_brackets`,
/// a `[...]` group is one argument. Returns `None` on unbalanced brackets.
fn split_args(text: &str, group_brackets: bool) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut buffer = String::new();
    let mut depth = 0i32;
    for c in text.chars() {
        if group_brackets && c == '[' {
            depth += 1;
        }
        if group_brackets && c == ']' {
            depth -= 1;
            buffer.push(c);
            if depth == 0 {
                args.push(std::mem::take(&mut buffer));
            }
            continue;
        }
        if (c == ' ' || c == '\t') && depth == 0 {
            if !buffer.is_empty() {
                args.push(std::mem::take(&mut buffer));
            }
            continue;
        }
        buffer.push(c);
    }
    if !buffer.is_empty() {
        args.push(buffer);
    }
    (depth == 0).then_some(args)
}

/// Removes one level of `"..."` or `{...}` quoting.
fn strip_quotes(s: &str) -> Option<&str> {
    match s.chars().next() {
        Some('"') => s.strip_prefix('"')?.strip_suffix('"'),
        Some('{') => s.strip_prefix('{')?.strip_suffix('}'),
        _ => Some(s),
    }
}

/// Extracts the port name from a `[get_ports <name>]` target.
fn target_port(target: &str, line: u32) -> Result<String, ConstraintError> {
    let bad = || ConstraintError::BadTarget {
        line,
        target: target.to_string(),
    };
    let inner = target
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(bad)?;
    let parts = split_args(inner, false).ok_or_else(bad)?;
    if parts.len() < 2 {
        return Err(bad());
    }
    if parts[0] != "get_ports" {
        return Err(ConstraintError::UnsupportedTarget { line });
    }
    strip_quotes(&parts[1]).map(str::to_string).ok_or_else(bad)
}

/// Applies constraint text to a netlist and returns the number of
/// properties set. `file` names the source in diagnostics.
pub fn parse_xdc(
    netlist: &mut Netlist,
    text: &str,
    file: &str,
    diags: &DiagnosticSink,
) -> Result<usize, ConstraintError> {
    let mut applied = 0;
    for (index, raw) in text.lines().enumerate() {
        let line = index as u32 + 1;
        let content = raw.split('#').next().unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }
        let args = split_args(content.trim_end_matches('\r'), true)
            .ok_or(ConstraintError::Unbalanced { line })?;
        let Some(cmd) = args.first() else {
            continue;
        };
        if cmd != "set_property" {
            diags.emit(
                Diagnostic::note(code(1), format!("ignoring unsupported XDC command '{cmd}'"))
                    .at(Location::new(file, line)),
            );
            continue;
        }
        if args.len() != 4 {
            return Err(ConstraintError::Arity { line });
        }
        let key = &args[1];
        if IGNORED_PROPERTIES.contains(&key.as_str()) {
            continue;
        }
        let port = target_port(&args[3], line)?;
        let value = strip_quotes(&args[2]).unwrap_or(&args[2]).to_string();
        match netlist.cell_by_name(&port) {
            Some(cell) => {
                netlist.cell_mut(cell).attrs.insert(key.clone(), value);
                applied += 1;
            }
            None => diags.emit(
                Diagnostic::warning(code(2), format!("port '{port}' not found in the design"))
                    .at(Location::new(file, line))
                    .with_help(format!("property '{key}' was not applied")),
            ),
        }
    }
    Ok(applied)
}

/// Reads a constraint file and applies it to a netlist.
pub fn load_xdc(
    netlist: &mut Netlist,
    path: &Path,
    diags: &DiagnosticSink,
) -> Result<usize, ConstraintError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConstraintError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_xdc(netlist, &text, &path.display().to_string(), diags)
}

//! Positions, severities and validation findings shared by every dialect.

use serde::Serialize;
use std::fmt;

/// A 1-based source location. Always points at the first token of the construct it locates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn start() -> Self {
        Self::new(1, 1)
    }

    /// Moves the position down by `lines`, e.g. to map a fenced block back onto its document.
    pub const fn shifted(self, lines: usize) -> Self {
        Self {
            line: self.line + lines,
            column: self.column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, col {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding.
///
/// Diagnostics are produced by exactly one rule invocation and never mutated afterwards;
/// [`Diagnostic::shifted`] returns a relocated copy instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    position: Position,
    severity: Severity,
    message: String,
}

impl Diagnostic {
    pub fn new(position: Position, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            position,
            severity,
            message: message.into(),
        }
    }

    pub fn error(position: Position, message: impl Into<String>) -> Self {
        Self::new(position, Severity::Error, message)
    }

    pub fn warning(position: Position, message: impl Into<String>) -> Self {
        Self::new(position, Severity::Warning, message)
    }

    pub fn info(position: Position, message: impl Into<String>) -> Self {
        Self::new(position, Severity::Info, message)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn shifted(&self, lines: usize) -> Self {
        Self {
            position: self.position.shifted(lines),
            ..self.clone()
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.position, self.severity, self.message)
    }
}

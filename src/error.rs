// ABOUTME: Error kinds and the runtime-scoped error condition

use thiserror::Error;

/// The kinds spec.md §7 enumerates. `Other` is the extensible catch-all
/// for embedder-defined failures that don't fit the fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Eof,
    Ferror,
    NotFound,
    Type,
    TooFew,
    TooMany,
    Error,
    Other,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Eof => "eof",
            ErrorKind::Ferror => "ferror",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Type => "type",
            ErrorKind::TooFew => "too-few",
            ErrorKind::TooMany => "too-many",
            ErrorKind::Error => "error",
            ErrorKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A snapshot of one active call frame, captured for diagnostics when an
/// error is raised. Mirrors what `dump-stack` prints.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub callable: String,
    pub args: String,
}

/// The condition a failing core operation raises. Propagation is strictly
/// bubble-up: any caller observing this immediately returns it, with no
/// recovery attempted in the core (spec.md §7). The embedder inspects the
/// runtime's last error (`Runtime::print_error`/`clear_error`) rather than
/// matching on this type directly.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct LispError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
    pub stack: Vec<FrameSnapshot>,
}

impl LispError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        LispError {
            kind,
            message: message.into(),
            line: None,
            stack: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_stack(mut self, stack: Vec<FrameSnapshot>) -> Self {
        self.stack = stack;
        self
    }
}

/// The result type every core operation returns: the heap handle of the
/// produced value, or the condition that stopped evaluation.
pub type LResult = Result<crate::heap::ObjRef, LispError>;

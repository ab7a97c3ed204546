//! Script evaluation errors.

use std::fmt;
use std::time::Duration;

use crate::model::ScriptDialect;

/// What went wrong while evaluating a request script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptErrorKind {
    /// The script could not be parsed.
    Syntax,
    /// The script raised an error while running.
    Runtime,
    /// The script produced something other than a record.
    UnexpectedType {
        expected: &'static str,
        found: String,
    },
    /// The record's fields could not be mapped onto a request.
    InvalidOutput,
    /// The script ran past its time budget.
    Timeout,
    /// The dialect is not compiled into this build.
    Unsupported,
}

/// Error raised by a [`ScriptEvaluator`](super::ScriptEvaluator).
///
/// The interpreter's own message is kept verbatim in `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub dialect: ScriptDialect,
    pub kind: ScriptErrorKind,
    pub message: String,
}

impl ScriptError {
    pub fn new(dialect: ScriptDialect, kind: ScriptErrorKind, message: impl Into<String>) -> Self {
        Self {
            dialect,
            kind,
            message: message.into(),
        }
    }

    pub fn runtime(dialect: ScriptDialect, message: impl Into<String>) -> Self {
        Self::new(dialect, ScriptErrorKind::Runtime, message)
    }

    pub fn unexpected_type(
        dialect: ScriptDialect,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        let found = found.into();
        Self {
            dialect,
            message: format!("expected {}, got {}", expected, found),
            kind: ScriptErrorKind::UnexpectedType { expected, found },
        }
    }

    pub fn timeout(dialect: ScriptDialect, limit: Duration) -> Self {
        Self::new(
            dialect,
            ScriptErrorKind::Timeout,
            format!("script did not finish within {}ms", limit.as_millis()),
        )
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ScriptErrorKind::Timeout
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} script: {}", self.dialect, self.message)
    }
}

impl std::error::Error for ScriptError {}

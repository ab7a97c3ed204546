//! Crate error types.

use std::fmt;
use std::path::PathBuf;

use crate::scripting::ScriptError;
use crate::transport::TransportError;

/// Errors that abort resolving or running a request chain.
#[derive(Debug)]
pub enum Error {
    /// No mold with the requested name exists.
    RequestNotFound { name: String },

    /// A chain link names a previous request that does not exist.
    PreviousRequestNotFound { name: String, referenced_by: String },

    /// The backward walk reached a name it had already visited.
    CyclicChain { name: String },

    /// A request script failed or produced the wrong shape.
    Script(ScriptError),

    /// The HTTP call failed.
    Transport(TransportError),

    /// A request file could not be turned into a mold.
    InvalidMold { name: String, message: String },

    /// Writing a response body to its output file failed.
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The run was cancelled before the next link started.
    Cancelled { completed: usize },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::RequestNotFound { .. } | Error::PreviousRequestNotFound { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RequestNotFound { name } => {
                write!(f, "could not find a request with name '{}'", name)
            }
            Error::PreviousRequestNotFound {
                name,
                referenced_by,
            } => write!(
                f,
                "previous request '{}' of '{}' not found",
                name, referenced_by
            ),
            Error::CyclicChain { name } => {
                write!(f, "request chain is cyclic: '{}' is visited twice", name)
            }
            Error::Script(e) => write!(f, "script evaluation error: {}", e),
            Error::Transport(e) => write!(f, "transport error: {}", e),
            Error::InvalidMold { name, message } => {
                write!(f, "invalid request '{}': {}", name, message)
            }
            Error::Output { path, source } => {
                write!(f, "failed to write output '{}': {}", path.display(), source)
            }
            Error::Cancelled { completed } => {
                write!(f, "chain cancelled after {} completed request(s)", completed)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Script(e) => Some(e),
            Error::Transport(e) => Some(e),
            Error::Output { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ScriptError> for Error {
    fn from(e: ScriptError) -> Self {
        Error::Script(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

/// Result type alias for chain operations.
pub type Result<T> = std::result::Result<T, Error>;

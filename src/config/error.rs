//! Configuration error types.

use std::fmt;

/// Error returned while loading configuration from the environment.
#[derive(Debug)]
pub enum ConfigError {
    /// A variable is set but does not parse.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// A required variable is not set.
    Missing { key: String },
    /// A variable parses but its value is not allowed.
    Invalid { key: String, message: String },
    /// Reading a file named by a variable failed.
    Io { path: String, error: std::io::Error },
}

impl ConfigError {
    /// Name of the environment variable the error is about.
    pub fn key(&self) -> &str {
        match self {
            ConfigError::Parse { key, .. }
            | ConfigError::Missing { key }
            | ConfigError::Invalid { key, .. } => key,
            ConfigError::Io { path, .. } => path,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Missing { key } => {
                write!(f, "missing required environment variable: {}", key)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
            ConfigError::Io { path, error } => {
                write!(f, "IO error for '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

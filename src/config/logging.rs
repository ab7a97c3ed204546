//! Logging configuration.

use super::parse::env_or;
use super::ConfigError;

/// Filter used when neither `LOG_LEVEL` nor `RUST_LOG` is set.
const DEFAULT_FILTER: &str = "reqchain=info";

/// Output format of the log subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable `tracing-subscriber` fmt output.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "" | "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid {
                key: "LOG_FORMAT".into(),
                message: format!("expected 'text' or 'json', got '{}'", other),
            }),
        }
    }
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    pub format: LogFormat,
    /// Service name for structured logging.
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Text,
            service_name: "reqchain".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error.
    /// RUST_LOG accepts full tracing filter syntax: reqchain=debug,reqwest=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: Self::resolve_log_filter(),
            format: LogFormat::parse(&env_or("LOG_FORMAT", "text"))?,
            service_name: env_or("SERVICE_NAME", "reqchain"),
        })
    }

    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter() -> String {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("reqchain={}", level);
                }
                _ => {
                    // Subscriber is not installed yet.
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Ok(filter) = std::env::var("RUST_LOG") {
            return filter;
        }

        DEFAULT_FILTER.to_string()
    }
}

//! Configuration loaded from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use reqchain::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Request timeout: {:?}", config.runner.request_timeout);
//! println!("Script timeout: {:?}", config.script.timeout);
//! ```

mod error;
mod logging;
mod parse;
mod runner;
mod script;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::{env_bool, env_duration, env_opt, env_or, env_parse, parse_duration};
pub use runner::RunnerConfig;
pub use script::ScriptConfig;

/// Complete application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub runner: RunnerConfig,
    pub script: ScriptConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            runner: RunnerConfig::from_env()?,
            script: ScriptConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        match self.runner.request_timeout {
            Some(t) => info!("  Request timeout: {}ms", t.as_millis()),
            None => info!("  Request timeout: disabled"),
        }
        info!("  User agent: {}", self.runner.user_agent);
        info!("  Default profile: {}", self.runner.default_profile);
        if !self.runner.write_output {
            info!("  Output files: disabled");
        }
        match self.script.timeout {
            Some(t) => info!("  Script timeout: {}ms", t.as_millis()),
            None => info!("  Script timeout: disabled"),
        }
        info!("  Profile namespace: {}", self.script.profile_namespace);
        info!("  Log format: {:?}", self.logging.format);
    }
}

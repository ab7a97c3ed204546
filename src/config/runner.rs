//! Runner and HTTP transport configuration.

use std::time::Duration;

use super::parse::{env_bool, env_duration, env_or};
use super::ConfigError;
use crate::model::DEFAULT_PROFILE;

/// Settings for running chains against real endpoints.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Per-request timeout applied by the transport; `None` disables it.
    /// A request's own `timeout` option overrides it.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
    /// Profile name used when the caller does not pick one.
    pub default_profile: String,
    /// Write each link's body to its `output` path.
    pub write_output: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            user_agent: default_user_agent(),
            default_profile: DEFAULT_PROFILE.to_string(),
            write_output: true,
        }
    }
}

fn default_user_agent() -> String {
    format!("reqchain/{}", crate::PKG_VERSION)
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let user_agent = env_or("USER_AGENT", &default_user_agent());
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "USER_AGENT".into(),
                message: "must not be empty".into(),
            });
        }

        Ok(Self {
            request_timeout: env_duration("REQUEST_TIMEOUT", "30s")?,
            user_agent,
            default_profile: env_or("DEFAULT_PROFILE", DEFAULT_PROFILE),
            write_output: env_bool("WRITE_OUTPUT", true),
        })
    }
}

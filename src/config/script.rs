//! Script evaluation configuration.

use std::time::Duration;

use super::parse::{env_duration, env_or};
use super::ConfigError;
use crate::scripting::PREVIOUS_RESPONSE_GLOBAL;

#[derive(Clone, Debug)]
pub struct ScriptConfig {
    /// Budget for one script evaluation; `None` disables it.
    pub timeout: Option<Duration>,
    /// Global the profile variables are exposed under.
    pub profile_namespace: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(10)),
            profile_namespace: "profile".to_string(),
        }
    }
}

impl ScriptConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile_namespace = env_or("SCRIPT_PROFILE_NAMESPACE", "profile");
        validate_namespace(&profile_namespace)?;

        Ok(Self {
            timeout: env_duration("SCRIPT_TIMEOUT", "10s")?,
            profile_namespace,
        })
    }
}

fn validate_namespace(name: &str) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::Invalid {
        key: "SCRIPT_PROFILE_NAMESPACE".into(),
        message: format!("'{}' {}", name, message),
    };

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return Err(invalid("is not an identifier")),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("is not an identifier"));
    }
    if name == PREVIOUS_RESPONSE_GLOBAL {
        return Err(invalid("collides with the previous response global"));
    }
    Ok(())
}

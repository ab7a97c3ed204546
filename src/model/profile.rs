//! Profiles: named variable sets selected per run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Profile used when the caller asks for none.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// Picks a profile by exact name, `"default"` when `name` is empty.
///
/// No match is not an error: the run proceeds without substitutions.
pub fn select_profile<'a>(profiles: &'a [Profile], name: &str) -> Option<&'a Profile> {
    let name = if name.is_empty() { DEFAULT_PROFILE } else { name };
    profiles.iter().find(|p| p.name == name)
}

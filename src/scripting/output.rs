//! Mapping a script's produced record onto a request.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ScriptError, ScriptErrorKind};
use crate::model::{Auth, Body, Headers, Options, ResolvedRequest, ScriptDialect};

/// Record fields a request script may produce. Missing fields stay empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScriptOutput {
    pub url: String,
    pub method: String,
    pub headers: Headers,
    pub body: Option<Body>,
    pub auth: Option<Auth>,
    pub options: Options,
    pub output: String,
}

impl ScriptOutput {
    /// Maps a record with string keys. Unknown keys are ignored.
    pub fn from_record(dialect: ScriptDialect, record: Map<String, Value>) -> Result<Self, ScriptError> {
        serde_json::from_value(Value::Object(record))
            .map_err(|e| ScriptError::new(dialect, ScriptErrorKind::InvalidOutput, e.to_string()))
    }
}

impl From<ScriptOutput> for ResolvedRequest {
    fn from(out: ScriptOutput) -> Self {
        Self {
            url: out.url,
            method: out.method,
            headers: out.headers,
            body: out.body,
            auth: out.auth.unwrap_or_default(),
            options: out.options,
            output: out.output,
        }
    }
}

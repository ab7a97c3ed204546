//! Request bodies as authored and as sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a request definition: raw text or a structured tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    Text(String),
    Structured(Value),
}

impl Body {
    /// Returns the structured mapping, if this body is one.
    pub fn as_mapping(&self) -> Option<&Map<String, Value>> {
        match self {
            Body::Structured(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Flattens a mapping body into form pairs.
    ///
    /// Scalars are stringified, nested values are encoded as JSON text.
    pub fn as_form_pairs(&self) -> Option<Vec<(String, String)>> {
        self.as_mapping().map(|map| {
            map.iter()
                .map(|(k, v)| {
                    let value = match v {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect()
        })
    }
}

/// Body in the shape the transport sends it.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Text(String),
    Json(Value),
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

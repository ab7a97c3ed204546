//! Resolved requests: the concrete form a chain link is sent in.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::body::{Body, RequestBody};
use super::headers::Headers;
use crate::config::parse_duration;

/// Free-form per-request options (`timeout`, `insecure`, ...).
pub type Options = BTreeMap<String, Value>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Credentials attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<BasicAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl Auth {
    pub fn is_empty(&self) -> bool {
        self.basic.is_none() && self.bearer.is_none()
    }
}

/// Transport settings read out of [`Options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Per-request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl TransportOptions {
    /// Reads known keys; unknown keys and malformed values are ignored.
    ///
    /// `timeout` accepts a number of seconds or a duration string ("30s", "2m").
    pub fn from_options(options: &Options) -> Self {
        let timeout = match options.get("timeout") {
            Some(Value::Number(n)) => n
                .as_f64()
                .filter(|secs| *secs > 0.0)
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
            Some(Value::String(s)) => parse_duration(s).ok().flatten(),
            _ => None,
        };
        let insecure = match options.get("insecure") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
            _ => false,
        };
        Self { timeout, insecure }
    }
}

/// A request ready for the transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRequest {
    pub url: String,
    pub method: String,
    pub headers: Headers,
    pub body: Option<Body>,
    pub auth: Auth,
    pub options: Options,
    pub output: String,
}

impl ResolvedRequest {
    /// Method to send; empty means GET.
    pub fn effective_method(&self) -> String {
        let method = self.method.trim();
        if method.is_empty() {
            "GET".to_string()
        } else {
            method.to_ascii_uppercase()
        }
    }

    /// True when the Content-Type header asks for url-encoded form data.
    pub fn is_form(&self) -> bool {
        self.headers
            .get("Content-Type")
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .eq_ignore_ascii_case(FORM_CONTENT_TYPE)
            })
            .unwrap_or(false)
    }

    /// Body in its transport shape.
    ///
    /// Mapping bodies become form pairs for form requests, everything
    /// structured otherwise goes out as JSON.
    pub fn transport_body(&self) -> RequestBody {
        match &self.body {
            None => RequestBody::Empty,
            Some(Body::Text(text)) if text.is_empty() => RequestBody::Empty,
            Some(Body::Text(text)) => RequestBody::Text(text.clone()),
            Some(Body::Structured(Value::Null)) => RequestBody::Empty,
            Some(body @ Body::Structured(value)) => match body.as_form_pairs() {
                Some(pairs) if self.is_form() => RequestBody::Form(pairs),
                _ => RequestBody::Json(value.clone()),
            },
        }
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions::from_options(&self.options)
    }
}

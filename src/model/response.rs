//! Responses recorded by the runner.

use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use serde_json::{json, Value};

use super::headers::Headers;

/// What a transport hands back for one request.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: StatusCode, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// Response of one executed chain link.
///
/// Immutable once built; the next link only ever sees it by reference.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Bytes,
    elapsed: Duration,
}

impl Response {
    pub fn new(raw: TransportResponse, elapsed: Duration) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            elapsed,
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Context object handed to the next link's script as `prevResponse`.
    pub fn script_context(&self) -> Value {
        json!({
            "status": self.status.as_u16(),
            "headers": self.headers.first_values(),
            "body": self.body_text(),
        })
    }

    /// `prevResponse` for a chain root: present but empty.
    pub fn empty_script_context() -> Value {
        json!({ "headers": {} })
    }
}

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;

use super::{Transport, TransportError};
use crate::model::{Headers, ResolvedRequest, TransportResponse};

/// Transport that answers every request with the same canned response.
///
/// Sent requests are recorded, which makes it useful for dry runs and
/// tests.
pub struct StubTransport {
    status: StatusCode,
    headers: Headers,
    body: Bytes,
    sent: Mutex<Vec<ResolvedRequest>>,
}

impl StubTransport {
    /// Empty `200 OK` responses.
    pub fn new() -> Self {
        Self::with_response(StatusCode::OK, Headers::new(), Bytes::new())
    }

    pub fn with_response(status: StatusCode, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Requests sent so far, oldest first.
    pub fn sent(&self) -> Vec<ResolvedRequest> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Default for StubTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &ResolvedRequest) -> Result<TransportResponse, TransportError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }
        Ok(TransportResponse::new(
            self.status,
            self.headers.clone(),
            self.body.clone(),
        ))
    }

    #[inline]
    fn name(&self) -> &'static str {
        "stub"
    }
}

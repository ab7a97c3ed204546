//! HTTP transports.
//!
//! The runner sends every resolved request through a [`Transport`]. The
//! default one is [`ReqwestTransport`]; [`StubTransport`] answers without
//! touching the network.

mod client;
mod stub;

use std::fmt;

use async_trait::async_trait;

use crate::model::{ResolvedRequest, TransportResponse};

pub use client::ReqwestTransport;
pub use stub::StubTransport;

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request could not be built (bad URL, method or header).
    InvalidRequest,
    /// Connecting to the endpoint failed.
    Connect,
    /// The request or response exceeded its timeout.
    Timeout,
    /// Reading the response body failed.
    Body,
    Other,
}

impl TransportErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::InvalidRequest => "invalid request",
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::Body => "body error",
            TransportErrorKind::Other => "request failed",
        }
    }
}

/// Error returned by a [`Transport`]; keeps the client's own message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidRequest, message)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for TransportError {}

/// Sends one resolved request and returns the full response.
///
/// Non-2xx statuses are responses, not errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ResolvedRequest) -> Result<TransportResponse, TransportError>;

    /// Name used in log events.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: &ResolvedRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

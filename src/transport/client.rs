use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use tracing::trace;

use super::{Transport, TransportError, TransportErrorKind};
use crate::config::RunnerConfig;
use crate::model::{Headers, RequestBody, ResolvedRequest, TransportResponse};

/// [`Transport`] backed by a shared `reqwest::Client`.
///
/// Requests with the `insecure` option go through a second client that
/// skips certificate verification; it is built on first use.
pub struct ReqwestTransport {
    client: reqwest::Client,
    insecure: OnceLock<reqwest::Client>,
    timeout: Option<Duration>,
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(config: &RunnerConfig) -> Result<Self, TransportError> {
        let client = Self::builder(&config.user_agent).build()?;
        Ok(Self {
            client,
            insecure: OnceLock::new(),
            timeout: config.request_timeout,
            user_agent: config.user_agent.clone(),
        })
    }

    fn builder(user_agent: &str) -> reqwest::ClientBuilder {
        reqwest::Client::builder().user_agent(user_agent)
    }

    fn insecure_client(&self) -> Result<&reqwest::Client, TransportError> {
        if let Some(client) = self.insecure.get() {
            return Ok(client);
        }
        let client = Self::builder(&self.user_agent)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(self.insecure.get_or_init(|| client))
    }

    fn build(
        &self,
        client: &reqwest::Client,
        request: &ResolvedRequest,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Request, TransportError> {
        let method = Method::from_bytes(request.effective_method().as_bytes())
            .map_err(|e| TransportError::invalid_request(format!("method: {}", e)))?;
        let url = reqwest::Url::parse(request.url.trim())
            .map_err(|e| TransportError::invalid_request(format!("url '{}': {}", request.url, e)))?;

        let mut builder = client.request(method, url);
        for (name, values) in request.headers.iter() {
            for value in values {
                builder = builder.header(name, value.as_str());
            }
        }

        if let Some(basic) = &request.auth.basic {
            builder = builder.basic_auth(&basic.username, basic.password.as_ref());
        }
        if let Some(token) = &request.auth.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.transport_body() {
            RequestBody::Empty => builder,
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(pairs) => builder.form(&pairs),
        };

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ResolvedRequest) -> Result<TransportResponse, TransportError> {
        let options = request.transport_options();
        let client = if options.insecure {
            self.insecure_client()?
        } else {
            &self.client
        };

        let built = self.build(client, request, options.timeout.or(self.timeout))?;
        trace!(method = %built.method(), url = %built.url(), "sending request");

        let response = client.execute(built).await?;
        let status = response.status();
        let headers = Headers::from(response.headers());
        let body = response.bytes().await?;

        Ok(TransportResponse::new(status, headers, body))
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_builder() {
            TransportErrorKind::InvalidRequest
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else if e.is_body() || e.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Other
        };
        TransportError::new(kind, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Auth, BasicAuth, Body};
    use serde_json::json;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(&RunnerConfig::default()).unwrap()
    }

    #[test]
    fn test_build_applies_headers_auth_and_json() {
        let transport = transport();
        let request = ResolvedRequest {
            url: "http://localhost:9/items".into(),
            method: "post".into(),
            headers: [("X-Foos", "a"), ("X-Foos", "b")].into_iter().collect(),
            body: Some(Body::Structured(json!({"id": 1}))),
            auth: Auth {
                bearer: Some("t0k3n".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let built = transport
            .build(&transport.client, &request, Some(Duration::from_secs(2)))
            .unwrap();

        assert_eq!(built.method(), Method::POST);
        assert_eq!(built.url().as_str(), "http://localhost:9/items");
        let foos: Vec<_> = built.headers().get_all("x-foos").iter().collect();
        assert_eq!(foos.len(), 2);
        assert_eq!(built.headers()["authorization"], "Bearer t0k3n");
        assert_eq!(built.headers()["content-type"], "application/json");
        assert_eq!(built.timeout(), Some(&Duration::from_secs(2)));
        let body = built.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"id":1}"#);
    }

    #[test]
    fn test_build_form_body() {
        let transport = transport();
        let request = ResolvedRequest {
            url: "http://localhost:9/login".into(),
            method: "POST".into(),
            headers: [("Content-Type", "application/x-www-form-urlencoded")]
                .into_iter()
                .collect(),
            body: Some(Body::Structured(json!({"user": "joe", "age": 42}))),
            auth: Auth {
                basic: Some(BasicAuth {
                    username: "joe".into(),
                    password: Some("pw".into()),
                }),
                ..Default::default()
            },
            ..Default::default()
        };

        let built = transport.build(&transport.client, &request, None).unwrap();
        let body = built.body().and_then(|b| b.as_bytes()).unwrap();
        let body = std::str::from_utf8(body).unwrap();
        assert!(body.contains("user=joe"));
        assert!(body.contains("age=42"));
        assert!(built.headers()["authorization"]
            .to_str()
            .unwrap()
            .starts_with("Basic "));
    }

    #[test]
    fn test_empty_method_defaults_to_get() {
        let transport = transport();
        let request = ResolvedRequest {
            url: "http://localhost:9/".into(),
            ..Default::default()
        };
        let built = transport.build(&transport.client, &request, None).unwrap();
        assert_eq!(built.method(), Method::GET);
        assert!(built.body().is_none());
    }

    #[test]
    fn test_invalid_url() {
        let transport = transport();
        let request = ResolvedRequest {
            url: "{{domain}}/items".into(),
            ..Default::default()
        };
        let err = transport
            .build(&transport.client, &request, None)
            .unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::InvalidRequest);
    }
}

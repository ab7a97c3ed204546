//! Test helpers and utilities

use reqchain::config::{RunnerConfig, ScriptConfig};
use reqchain::{Profile, RequestMold, ReqwestTransport, Runner};
use serde_json::Value;
use wiremock::MockServer;

/// Mock upstream plus a runner pointed at it.
pub struct TestEnv {
    pub server: MockServer,
    pub runner: Runner<ReqwestTransport>,
}

#[allow(dead_code)]
impl TestEnv {
    pub async fn new() -> Self {
        Self::with_config(RunnerConfig::default()).await
    }

    pub async fn with_config(config: RunnerConfig) -> Self {
        let server = MockServer::start().await;
        let transport = ReqwestTransport::new(&config).expect("Failed to create transport");
        let runner = Runner::new(transport, &config, &ScriptConfig::default());
        Self { server, runner }
    }

    /// Profile `default` whose `domain` points at the mock server.
    pub fn profile(&self) -> Profile {
        Profile::new("default").with_variable("domain", self.server.uri())
    }

    /// JSON bodies of every request the server received, in order.
    pub async fn received_json(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }

    /// Paths of every request the server received, in order.
    pub async fn received_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}

/// Declarative mold from inline YAML.
pub fn yaml(name: &str, raw: &str) -> RequestMold {
    RequestMold::from_yaml(name, raw).expect("valid request yaml")
}

/// Mold built the way a file loader would build it.
#[allow(dead_code)]
pub fn file(path: &str, content: &str) -> RequestMold {
    RequestMold::from_file_parts(path, content).expect("valid request file")
}

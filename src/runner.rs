//! Sequential execution of a resolved chain.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::chain::ChainResolver;
use crate::config::{Config, RunnerConfig, ScriptConfig};
use crate::engine::EvaluationEngine;
use crate::error::{Error, Result};
use crate::model::{select_profile, Profile, RequestMold, Response};
use crate::transport::{ReqwestTransport, Transport};

/// Runs chains link by link over a [`Transport`].
///
/// A runner keeps no state between calls. Separate chains may run
/// concurrently on the same runner; the links of one chain never do.
pub struct Runner<T> {
    transport: T,
    engine: EvaluationEngine,
    default_profile: String,
    write_output: bool,
}

impl Runner<ReqwestTransport> {
    /// Runner over a [`ReqwestTransport`] built from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.runner)?;
        Ok(Self::new(transport, &config.runner, &config.script))
    }
}

impl<T: Transport> Runner<T> {
    pub fn new(transport: T, runner: &RunnerConfig, script: &ScriptConfig) -> Self {
        Self {
            transport,
            engine: EvaluationEngine::new(script),
            default_profile: runner.default_profile.clone(),
            write_output: runner.write_output,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Finds `target` in `universe`, picks the profile and runs the chain.
    ///
    /// `profile_name` falls back to the configured default profile when
    /// `None` or empty. A profile that does not exist means no
    /// substitutions.
    pub async fn run<F>(
        &self,
        target: &str,
        universe: &[RequestMold],
        profiles: &[Profile],
        profile_name: Option<&str>,
        on_response: F,
    ) -> Result<Vec<Response>>
    where
        F: FnMut(Duration, u16),
    {
        let name = profile_name
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_profile.as_str());
        let profile = select_profile(profiles, name);
        if profile.is_none() {
            debug!(target: "chain", profile = %name, "profile not found, running without substitutions");
        }

        let chain = ChainResolver::new(universe).resolve(target)?;
        self.run_request_chain(&chain, profile, on_response).await
    }

    /// Runs `chain` from root to target.
    ///
    /// `on_response` gets each link's elapsed time and status code as soon
    /// as the link completes. The first failing link aborts the run and
    /// only the error is returned.
    pub async fn run_request_chain<F>(
        &self,
        chain: &[RequestMold],
        profile: Option<&Profile>,
        on_response: F,
    ) -> Result<Vec<Response>>
    where
        F: FnMut(Duration, u16),
    {
        self.run_request_chain_with_cancel(chain, profile, on_response, &CancellationToken::new())
            .await
    }

    /// Like [`Runner::run_request_chain`], but stops before the next link
    /// once `cancel` fires.
    pub async fn run_request_chain_with_cancel<F>(
        &self,
        chain: &[RequestMold],
        profile: Option<&Profile>,
        mut on_response: F,
        cancel: &CancellationToken,
    ) -> Result<Vec<Response>>
    where
        F: FnMut(Duration, u16),
    {
        let mut responses: Vec<Response> = Vec::with_capacity(chain.len());

        for (link, mold) in chain.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled { completed: link });
            }

            let resolved = self
                .engine
                .evaluate(mold, responses.last(), profile)
                .await?;

            let started = Instant::now();
            let raw = self.transport.send(&resolved).await?;
            let response = Response::new(raw, started.elapsed());

            debug!(
                target: "chain",
                request = %mold.name(),
                link,
                transport = self.transport.name(),
                status = response.status().as_u16(),
                elapsed_ms = response.elapsed().as_millis() as u64,
                "link completed"
            );
            on_response(response.elapsed(), response.status().as_u16());

            if self.write_output && !resolved.output.is_empty() {
                write_output(&resolved.output, &response).await?;
            }

            responses.push(response);
        }

        Ok(responses)
    }
}

async fn write_output(path: &str, response: &Response) -> Result<()> {
    let path = PathBuf::from(path);
    tokio::fs::write(&path, response.body())
        .await
        .map_err(|source| Error::Output {
            path: path.clone(),
            source,
        })?;
    debug!(target: "chain", path = %path.display(), bytes = response.body().len(), "output written");
    Ok(())
}

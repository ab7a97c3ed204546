//! reqchain - run chains of dependent HTTP requests.
//!
//! A request is authored either declaratively (YAML) or as a script
//! (Starlark or Lua). Each request may name a previous request; running a
//! target runs its whole chain from the root, feeding every response into
//! the evaluation of the next link.
//!
//! # Architecture
//!
//! - [`model`] - request molds, profiles, resolved requests and responses
//! - [`chain`] - walks `prev_req` links back to the root
//! - [`engine`] - turns one mold into a resolved request (substitution or
//!   script evaluation)
//! - [`scripting`] - per-dialect evaluators with fresh interpreter state
//! - [`transport`] - the HTTP boundary (`reqwest`, or a stub)
//! - [`runner`] - executes a chain in order, fail-fast
//!
//! # Example
//!
//! ```rust,ignore
//! use reqchain::{Config, Profile, RequestMold, Runner};
//!
//! let config = Config::from_env()?;
//! reqchain::logging::init(&config.logging)?;
//!
//! let universe = vec![
//!     RequestMold::from_yaml("login", "url: \"{{domain}}/login\"\nmethod: POST")?,
//!     RequestMold::from_file_parts("me.lua", std::fs::read_to_string("me.lua")?)?,
//! ];
//! let profiles = vec![Profile::new("default").with_variable("domain", "http://localhost:8080")];
//!
//! let runner = Runner::from_config(&config)?;
//! let responses = runner
//!     .run("me", &universe, &profiles, None, |elapsed, status| {
//!         println!("{} in {:?}", status, elapsed);
//!     })
//!     .await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod runner;
pub mod scripting;
pub mod substitution;
pub mod transport;

// Re-exports for convenience
pub use chain::{resolve_request_chain, resolve_request_chain_by_name, ChainResolver};
pub use config::Config;
pub use engine::EvaluationEngine;
pub use error::{Error, Result};
pub use model::{
    select_profile, Payload, Profile, RequestMold, ResolvedRequest, Response, ScriptDialect,
};
pub use runner::Runner;
pub use transport::{ReqwestTransport, StubTransport, Transport, TransportError};

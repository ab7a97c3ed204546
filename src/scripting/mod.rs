//! Request script evaluation.
//!
//! Each dialect is a [`ScriptEvaluator`]. An evaluation always starts from a
//! fresh interpreter, so nothing leaks between chain links or runs.
//!
//! # Injected globals
//!
//! | Global | Content |
//! |--------|---------|
//! | `prevResponse` | previous link's `headers` (first value per lower-case name), `status` and `body`; only `headers = {}` for a chain root |
//! | profile namespace (default `profile`) | active profile variables, empty without a profile |
//!
//! # Produced value
//!
//! A script must produce a record with any of the fields `url`, `method`,
//! `headers`, `body`, `auth`, `options`, `output`:
//!
//! - Lua: the table returned by the chunk
//! - Starlark: the dict value of a trailing expression, or else the
//!   module's top-level bindings with those names
//!
//! # Example
//!
//! ```lua
//! -- meta:name: get item
//! -- meta:prev_req: login
//! return {
//!     url = profile.domain .. "/items/1",
//!     method = "GET",
//!     headers = { Authorization = "Bearer " .. prevResponse.headers["x-token"] },
//! }
//! ```

mod error;
mod output;

#[cfg(feature = "lua")]
mod lua;

#[cfg(feature = "starlark")]
mod starlark;

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

pub use error::{ScriptError, ScriptErrorKind};
pub use output::ScriptOutput;

#[cfg(feature = "lua")]
pub use lua::LuaEvaluator;

#[cfg(feature = "starlark")]
pub use self::starlark::StarlarkEvaluator;

use crate::model::{Profile, Response, ScriptDialect};

/// Global holding the previous link's response.
pub const PREVIOUS_RESPONSE_GLOBAL: &str = "prevResponse";

/// Record field names a script can set.
pub const OUTPUT_FIELDS: [&str; 7] = [
    "url", "method", "headers", "body", "auth", "options", "output",
];

/// Nesting limit when converting interpreter values.
pub(crate) const MAX_VALUE_DEPTH: usize = 64;

/// Everything a script can see besides its own source.
#[derive(Debug, Clone)]
pub struct ScriptContext {
    /// JSON object bound to [`PREVIOUS_RESPONSE_GLOBAL`].
    pub previous_response: Value,
    /// Global name the profile variables are bound to.
    pub profile_namespace: String,
    pub profile: BTreeMap<String, String>,
    /// Evaluation budget; evaluators that can interrupt themselves honor it.
    pub timeout: Option<Duration>,
}

impl ScriptContext {
    pub fn new(
        previous: Option<&Response>,
        profile: Option<&Profile>,
        profile_namespace: impl Into<String>,
    ) -> Self {
        Self {
            previous_response: previous
                .map(Response::script_context)
                .unwrap_or_else(Response::empty_script_context),
            profile_namespace: profile_namespace.into(),
            profile: profile.map(|p| p.variables.clone()).unwrap_or_default(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One scripting dialect.
///
/// Implementations create their interpreter inside `evaluate` and drop it
/// before returning.
pub trait ScriptEvaluator: Send + Sync {
    fn dialect(&self) -> ScriptDialect;

    /// Runs `script` and maps its produced record.
    fn evaluate(&self, script: &str, context: &ScriptContext) -> Result<ScriptOutput, ScriptError>;
}

/// Evaluator for a dialect, if it is compiled in.
pub fn evaluator_for(dialect: ScriptDialect) -> Result<&'static dyn ScriptEvaluator, ScriptError> {
    match dialect {
        #[cfg(feature = "lua")]
        ScriptDialect::Lua => Ok(&LuaEvaluator),
        #[cfg(feature = "starlark")]
        ScriptDialect::Starlark => Ok(&StarlarkEvaluator),
        #[allow(unreachable_patterns)]
        other => Err(ScriptError::new(
            other,
            ScriptErrorKind::Unsupported,
            format!("{} scripts are not enabled in this build", other),
        )),
    }
}

/// Evaluates on the blocking pool, bounded by `context.timeout`.
///
/// On timeout the caller gets [`ScriptErrorKind::Timeout`] right away; an
/// evaluator that cannot interrupt itself keeps its blocking thread until
/// the script ends.
pub async fn evaluate_blocking(
    dialect: ScriptDialect,
    script: String,
    context: ScriptContext,
) -> Result<ScriptOutput, ScriptError> {
    let evaluator = evaluator_for(dialect)?;
    let timeout = context.timeout;
    let task = tokio::task::spawn_blocking(move || evaluator.evaluate(&script, &context));

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| ScriptError::timeout(dialect, limit))?,
        None => task.await,
    };

    joined.map_err(|e| ScriptError::runtime(dialect, format!("script task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Headers, TransportResponse};
    use http::StatusCode;

    #[test]
    fn test_context_without_previous_response() {
        let ctx = ScriptContext::new(None, None, "profile");
        assert_eq!(ctx.previous_response, Response::empty_script_context());
        assert!(ctx.profile.is_empty());
    }

    #[test]
    fn test_context_with_previous_response_and_profile() {
        let headers: Headers = [("x-token", "abc")].into_iter().collect();
        let prev = Response::new(
            TransportResponse::new(StatusCode::OK, headers, "{}"),
            Duration::ZERO,
        );
        let profile = Profile::new("default").with_variable("domain", "http://h");

        let ctx = ScriptContext::new(Some(&prev), Some(&profile), "env");
        assert_eq!(ctx.previous_response["headers"]["x-token"], "abc");
        assert_eq!(ctx.profile_namespace, "env");
        assert_eq!(ctx.profile.get("domain").map(String::as_str), Some("http://h"));
    }

    #[cfg(feature = "lua")]
    #[tokio::test]
    async fn test_evaluate_blocking_times_out() {
        let ctx = ScriptContext::new(None, None, "profile")
            .with_timeout(Some(Duration::from_millis(100)));
        let err = evaluate_blocking(ScriptDialect::Lua, "while true do end".into(), ctx)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}

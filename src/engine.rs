//! Evaluation: turning one mold into a [`ResolvedRequest`].
//!
//! Declarative molds are copied and run through profile substitution.
//! Scripted molds are evaluated instead; their output is taken as final and
//! not substituted again.

use std::time::Duration;

use tracing::trace;

use crate::config::ScriptConfig;
use crate::error::Result;
use crate::model::{DeclarativeRequest, Payload, Profile, RequestMold, ResolvedRequest, Response};
use crate::scripting::{evaluate_blocking, ScriptContext};
use crate::substitution::Substitutor;

/// Stateless evaluator for chain links.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    profile_namespace: String,
    script_timeout: Option<Duration>,
}

impl Default for EvaluationEngine {
    fn default() -> Self {
        Self::new(&ScriptConfig::default())
    }
}

impl EvaluationEngine {
    pub fn new(config: &ScriptConfig) -> Self {
        Self {
            profile_namespace: config.profile_namespace.clone(),
            script_timeout: config.timeout,
        }
    }

    /// Evaluates `mold` with the previous link's response (`None` for a
    /// chain root) and the active profile (`None` for no substitutions).
    pub async fn evaluate(
        &self,
        mold: &RequestMold,
        previous: Option<&Response>,
        profile: Option<&Profile>,
    ) -> Result<ResolvedRequest> {
        match mold.payload() {
            Payload::Declarative(request) => Ok(resolve_declarative(request, profile)),
            Payload::Script(script) => {
                let context = ScriptContext::new(previous, profile, self.profile_namespace.clone())
                    .with_timeout(self.script_timeout);
                let output =
                    evaluate_blocking(script.dialect, script.script.clone(), context).await?;
                trace!(
                    request = %mold.name(),
                    dialect = %script.dialect,
                    url = %output.url,
                    "script evaluated"
                );
                Ok(output.into())
            }
        }
    }
}

/// Copies declarative fields and substitutes profile placeholders in the
/// URL, header values, body and auth.
pub fn resolve_declarative(request: &DeclarativeRequest, profile: Option<&Profile>) -> ResolvedRequest {
    let mut resolved = ResolvedRequest {
        url: request.url.clone(),
        method: request.method.clone(),
        headers: request.headers.clone(),
        body: request.body.clone(),
        auth: request.auth.clone().unwrap_or_default(),
        options: request.options.clone(),
        output: request.output.clone(),
    };

    if let Some(profile) = profile {
        let sub = Substitutor::new(&profile.variables);
        sub.apply_in_place(&mut resolved.url);
        sub.apply_headers(&mut resolved.headers);
        if let Some(body) = resolved.body.as_mut() {
            sub.apply_body(body);
        }
        sub.apply_auth(&mut resolved.auth);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{Body, ScriptDialect};
    use crate::scripting::ScriptErrorKind;
    use serde_json::json;

    fn profile() -> Profile {
        Profile::new("default")
            .with_variable("domain", "http://localhost:9999")
            .with_variable("token", "t0k3n")
    }

    #[tokio::test]
    async fn test_declarative_substitution() {
        let mold = RequestMold::from_yaml(
            "items",
            r#"
url: "{{domain}}/items"
method: POST
headers:
  Authorization: "Bearer {{token}}"
body:
  token: "{{token}}"
  keep: "{{unknown}}"
"#,
        )
        .unwrap();

        let resolved = EvaluationEngine::default()
            .evaluate(&mold, None, Some(&profile()))
            .await
            .unwrap();

        assert_eq!(resolved.url, "http://localhost:9999/items");
        assert_eq!(resolved.headers.get("Authorization"), Some("Bearer t0k3n"));
        assert_eq!(
            resolved.body,
            Some(Body::Structured(json!({"token": "t0k3n", "keep": "{{unknown}}"})))
        );

        // The mold itself is untouched.
        assert_eq!(mold.url(), "{{domain}}/items");
    }

    #[tokio::test]
    async fn test_declarative_without_profile() {
        let mold = RequestMold::from_yaml("a", "url: \"{{domain}}/a\"").unwrap();
        let resolved = EvaluationEngine::default()
            .evaluate(&mold, None, None)
            .await
            .unwrap();
        assert_eq!(resolved.url, "{{domain}}/a");
    }

    #[cfg(feature = "lua")]
    #[tokio::test]
    async fn test_script_output_is_not_substituted() {
        let mold = RequestMold::from_script(
            ScriptDialect::Lua,
            r#"return { url = profile.domain .. "/{{token}}" }"#,
        );
        let resolved = EvaluationEngine::default()
            .evaluate(&mold, None, Some(&profile()))
            .await
            .unwrap();
        assert_eq!(resolved.url, "http://localhost:9999/{{token}}");
    }

    #[cfg(feature = "lua")]
    #[tokio::test]
    async fn test_script_wrong_shape() {
        let mold = RequestMold::from_script(ScriptDialect::Lua, r#"return "http://x""#);
        let err = EvaluationEngine::default()
            .evaluate(&mold, None, None)
            .await
            .unwrap_err();
        match err {
            Error::Script(e) => assert!(matches!(e.kind, ScriptErrorKind::UnexpectedType { .. })),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(feature = "starlark")]
    #[tokio::test]
    async fn test_starlark_profile_namespace() {
        let config = ScriptConfig {
            profile_namespace: "env".into(),
            ..ScriptConfig::default()
        };
        let mold = RequestMold::from_script(ScriptDialect::Starlark, r#"url = env["domain"] + "/s""#);
        let resolved = EvaluationEngine::new(&config)
            .evaluate(&mold, None, Some(&profile()))
            .await
            .unwrap();
        assert_eq!(resolved.url, "http://localhost:9999/s");
    }
}

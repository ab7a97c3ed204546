//! Declarative chains: profile substitution, bodies and auth.

use crate::helpers::*;
use reqchain::Profile;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, body_string, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_chain_runs_root_first_with_substitution() {
    let env = TestEnv::new().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"user": "joe", "tags": ["a", "t0k3n"]})))
        .respond_with(ResponseTemplate::new(201).insert_header("x-token", "abc"))
        .expect(1)
        .mount(&env.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("x-api-key", "t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&env.server)
        .await;

    let universe = vec![
        yaml(
            "items",
            r#"
prev_req: login
url: "{{domain}}/items"
headers:
  X-Api-Key: "{{token}}"
"#,
        ),
        yaml(
            "login",
            r#"
url: "{{domain}}/login"
method: post
body:
  user: joe
  tags: [a, "{{token}}"]
"#,
        ),
    ];
    let profiles = vec![env.profile().with_variable("token", "t0k3n")];

    let mut statuses = Vec::new();
    let responses = env
        .runner
        .run("items", &universe, &profiles, None, |_, status| statuses.push(status))
        .await
        .unwrap();

    assert_eq!(statuses, [201, 200]);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].headers().get("x-token"), Some("abc"));
    assert_eq!(responses[1].body_text(), r#"[{"id":1}]"#);
    assert_eq!(env.received_paths().await, ["/login", "/items"]);

    // The universe is left as authored.
    assert_eq!(universe[0].url(), "{{domain}}/items");
}

#[tokio::test]
async fn test_named_profile_is_selected() {
    let env = TestEnv::new().await;

    Mock::given(path("/staging"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.server)
        .await;

    let universe = vec![yaml("ping", r#"url: "{{domain}}/{{stage}}""#)];
    let profiles = vec![
        env.profile().with_variable("stage", "default"),
        Profile::new("staging")
            .with_variable("domain", env.server.uri())
            .with_variable("stage", "staging"),
    ];

    env.runner
        .run("ping", &universe, &profiles, Some("staging"), |_, _| {})
        .await
        .unwrap();
}

#[tokio::test]
async fn test_form_body_and_basic_auth() {
    let env = TestEnv::new().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(basic_auth("client", "s3cret"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("grant_type=password&retries=3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&env.server)
        .await;

    let universe = vec![yaml(
        "token",
        r#"
url: "{{domain}}/token"
method: POST
headers:
  Content-Type: application/x-www-form-urlencoded
auth:
  basic:
    username: client
    password: "{{secret}}"
body:
  grant_type: password
  retries: 3
"#,
    )];
    let profiles = vec![env.profile().with_variable("secret", "s3cret")];

    let responses = env
        .runner
        .run("token", &universe, &profiles, None, |_, _| {})
        .await
        .unwrap();
    assert_eq!(responses[0].body_text(), "ok");
}

#[tokio::test]
async fn test_error_status_is_a_response() {
    let env = TestEnv::new().await;

    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .mount(&env.server)
        .await;

    let universe = vec![yaml("missing", r#"url: "{{domain}}/missing""#)];
    let responses = env
        .runner
        .run("missing", &universe, &[env.profile()], None, |_, _| {})
        .await
        .unwrap();

    assert_eq!(responses[0].status().as_u16(), 404);
    assert_eq!(responses[0].body_text(), "nope");
}

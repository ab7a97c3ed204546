//! Chains with Lua and Starlark links reading the previous response.

use crate::helpers::*;
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const LOGIN: &str = r#"
url: "{{domain}}/login"
method: POST
body:
  user: joe
"#;

async fn mount_login(env: &TestEnv) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Token", "abc")
                .set_body_json(json!({"ok": true})),
        )
        .expect(1)
        .mount(&env.server)
        .await;
}

#[cfg(feature = "lua")]
#[tokio::test]
async fn test_lua_link_uses_previous_response() {
    let env = TestEnv::new().await;
    mount_login(&env).await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(bearer_token("abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("joe"))
        .expect(1)
        .mount(&env.server)
        .await;

    let universe = vec![
        file("requests/login.yaml", LOGIN),
        file(
            "requests/me.lua",
            r#"-- meta:name: me
-- meta:prev_req: login
-- doc:url: {{domain}}/me
return {
    url = profile.domain .. "/me",
    method = "GET",
    auth = { bearer = prevResponse.headers["x-token"] },
}
"#,
        ),
    ];

    assert_eq!(universe[1].name(), "me");
    assert_eq!(universe[1].previous_request(), "login");

    let responses = env
        .runner
        .run("me", &universe, &[env.profile()], None, |_, _| {})
        .await
        .unwrap();
    assert_eq!(responses[1].body_text(), "joe");
}

#[cfg(feature = "starlark")]
#[tokio::test]
async fn test_starlark_link_uses_previous_response() {
    let env = TestEnv::new().await;
    mount_login(&env).await;

    Mock::given(method("PUT"))
        .and(path("/orders/7"))
        .and(header("authorization", "Bearer abc"))
        .and(body_json(json!({"status": 200, "lines": [1, 2]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&env.server)
        .await;

    let universe = vec![
        file("login.yml", LOGIN),
        file(
            "order.star",
            r#""""
meta:name: order
meta:prev_req: login
"""
url = profile["domain"] + "/orders/7"
method = "PUT"
headers = {"Authorization": "Bearer " + prevResponse["headers"]["x-token"]}
body = {"status": prevResponse["status"], "lines": [1, 2]}
"#,
        ),
    ];

    let mut statuses = Vec::new();
    env.runner
        .run("order", &universe, &[env.profile()], None, |_, status| {
            statuses.push(status)
        })
        .await
        .unwrap();
    assert_eq!(statuses, [200, 204]);
}

#[cfg(feature = "lua")]
#[tokio::test]
async fn test_script_root_sees_empty_previous_response() {
    let env = TestEnv::new().await;

    Mock::given(path("/root"))
        .and(header("x-had-token", "false"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.server)
        .await;

    let universe = vec![file(
        "root.lua",
        r#"-- meta:name: root
return {
    url = profile.domain .. "/root",
    headers = { ["X-Had-Token"] = tostring(prevResponse.headers["x-token"] ~= nil) },
}
"#,
    )];

    env.runner
        .run("root", &universe, &[env.profile()], None, |_, _| {})
        .await
        .unwrap();
}

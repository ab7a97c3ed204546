//! Fail-fast behavior: nothing after a failing link runs.

use crate::helpers::*;
use reqchain::Error;
use wiremock::matchers::path;
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_transport_failure_stops_chain() {
    let env = TestEnv::new().await;

    Mock::given(path("/first"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(path("/third"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&env.server)
        .await;

    let universe = vec![
        yaml("first", r#"url: "{{domain}}/first""#),
        // Nothing listens on port 1.
        yaml("second", "prev_req: first\nurl: http://127.0.0.1:1/second"),
        yaml("third", "prev_req: second\nurl: \"{{domain}}/third\""),
    ];

    let mut observed = 0;
    let err = env
        .runner
        .run("third", &universe, &[env.profile()], None, |_, _| observed += 1)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got {err}");
    assert_eq!(observed, 1);
    assert_eq!(env.received_paths().await, ["/first"]);
}

#[tokio::test]
async fn test_missing_previous_request() {
    let env = TestEnv::new().await;
    let universe = vec![yaml("b", "prev_req: a\nurl: \"{{domain}}/b\"")];

    let err = env
        .runner
        .run("b", &universe, &[env.profile()], None, |_, _| {})
        .await
        .unwrap_err();

    match err {
        Error::PreviousRequestNotFound {
            name,
            referenced_by,
        } => {
            assert_eq!(name, "a");
            assert_eq!(referenced_by, "b");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(env.received_paths().await.is_empty());
}

#[tokio::test]
async fn test_cycle_is_rejected_before_any_call() {
    let env = TestEnv::new().await;
    let universe = vec![
        yaml("a", "prev_req: b\nurl: \"{{domain}}/a\""),
        yaml("b", "prev_req: a\nurl: \"{{domain}}/b\""),
    ];

    let err = env
        .runner
        .run("a", &universe, &[env.profile()], None, |_, _| {})
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CyclicChain { .. }), "got {err}");
    assert!(env.received_paths().await.is_empty());
}

#[cfg(feature = "starlark")]
#[tokio::test]
async fn test_script_error_keeps_message() {
    let env = TestEnv::new().await;

    Mock::given(path("/first"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&env.server)
        .await;

    let universe = vec![
        yaml("first", r#"url: "{{domain}}/first""#),
        file(
            "second.star",
            "# meta:name: second\n# meta:prev_req: first\nfail(\"token missing\")\n",
        ),
    ];

    let err = env
        .runner
        .run("second", &universe, &[env.profile()], None, |_, _| {})
        .await
        .unwrap_err();

    match err {
        Error::Script(e) => assert!(e.message.contains("token missing"), "got {e}"),
        other => panic!("unexpected error: {other}"),
    }
}

//! Response bodies written to a link's `output` path.

use crate::helpers::*;
use reqchain::config::RunnerConfig;
use reqchain::Error;
use wiremock::matchers::path;
use wiremock::{Mock, ResponseTemplate};

async fn mount_report(env: &TestEnv) {
    Mock::given(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string("report body"))
        .mount(&env.server)
        .await;
}

fn report(output: &std::path::Path) -> reqchain::RequestMold {
    yaml(
        "report",
        &format!(
            "url: \"{{{{domain}}}}/report\"\noutput: \"{}\"\n",
            output.display()
        ),
    )
}

#[tokio::test]
async fn test_body_is_written_to_output() {
    let env = TestEnv::new().await;
    mount_report(&env).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.txt");

    env.runner
        .run("report", &[report(&output)], &[env.profile()], None, |_, _| {})
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "report body");
}

#[tokio::test]
async fn test_output_disabled() {
    let env = TestEnv::with_config(RunnerConfig {
        write_output: false,
        ..RunnerConfig::default()
    })
    .await;
    mount_report(&env).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.txt");

    env.runner
        .run("report", &[report(&output)], &[env.profile()], None, |_, _| {})
        .await
        .unwrap();

    assert!(!output.exists());
}

#[tokio::test]
async fn test_unwritable_output_fails() {
    let env = TestEnv::new().await;
    mount_report(&env).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing-dir").join("report.txt");

    let err = env
        .runner
        .run("report", &[report(&output)], &[env.profile()], None, |_, _| {})
        .await
        .unwrap_err();

    match err {
        Error::Output { path, .. } => assert_eq!(path, output),
        other => panic!("unexpected error: {other}"),
    }
}

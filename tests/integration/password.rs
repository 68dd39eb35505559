//! Password-protected control requests.

use http::StatusCode;

use http_profiler::config::ProfilerOptions;

use crate::helpers::*;

fn protected() -> TestApp {
    TestApp::with_options(ProfilerOptions {
        password: Some("s3cret".into()),
        ..ProfilerOptions::default()
    })
}

/// Control requests without the password are refused
#[tokio::test]
async fn test_missing_password() {
    let app = protected();

    for uri in ["/__start__", "/__stop__", "/__data__", "/method1?profile=true"] {
        let res = app.get(uri).await;
        assert_status(&res, StatusCode::UNAUTHORIZED);
        assert!(body_text(&res).starts_with("Profiling is password-protected"));
    }
    assert!(app.seen().is_empty());
    assert_eq!(app.sampler.starts(), 0);
}

/// A wrong password is refused like a missing one
#[tokio::test]
async fn test_wrong_password() {
    let app = protected();

    let res = app.get("/__start__?profiling_password=guess").await;

    assert_status(&res, StatusCode::UNAUTHORIZED);
    assert!(!app.middleware.session().is_running());
}

/// The right password unlocks every control request
#[tokio::test]
async fn test_correct_password() {
    let app = protected();

    assert_status(
        &app.get("/__start__?profiling_password=s3cret").await,
        StatusCode::OK,
    );
    assert_status(
        &app.get("/__stop__?profiling_password=s3cret").await,
        StatusCode::OK,
    );
    assert_status(
        &app.get("/__data__?profiling_password=s3cret").await,
        StatusCode::OK,
    );

    let res = app
        .get("/method1?profile=true&profiling_password=s3cret&a=1")
        .await;
    assert_status(&res, StatusCode::OK);
    assert_eq!(app.seen_queries(), vec![Some("a=1".to_string())]);
}

/// Plain requests need no password and never see it
#[tokio::test]
async fn test_plain_requests_unaffected() {
    let app = protected();

    let res = app.get("/method1?profiling_password=s3cret&a=1").await;

    assert_status(&res, StatusCode::ACCEPTED);
    assert_eq!(app.seen_queries(), vec![Some("a=1".to_string())]);
}

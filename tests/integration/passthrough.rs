//! Requests that reach the wrapped application.

use http::StatusCode;

use crate::helpers::*;

/// Control parameters are stripped, the rest keep their order and encoding
#[tokio::test]
async fn test_control_params_stripped() {
    let app = TestApp::new();

    app.get("/page?a=1&printer=gif&b=x%20y&focus=foo&ignore=bar&times=2&c=3")
        .await;

    assert_eq!(app.seen_queries(), vec![Some("a=1&b=x%20y&c=3".to_string())]);
}

/// Only control parameters leaves an empty, but present, query
#[tokio::test]
async fn test_only_control_params() {
    let app = TestApp::new();

    app.get("/page?printer=gif&focus=foo").await;

    assert_eq!(app.seen_queries(), vec![Some(String::new())]);
}

/// Encoded control keys are recognised too
#[tokio::test]
async fn test_encoded_control_key_stripped() {
    let app = TestApp::new();

    app.get("/page?%70rinter=gif&keep=1").await;

    assert_eq!(app.seen_queries(), vec![Some("keep=1".to_string())]);
}

/// Status, headers and body of the application are returned unchanged
#[tokio::test]
async fn test_response_unchanged() {
    let app = TestApp::new();

    let res = app.get("/page?a=1").await;

    assert_status(&res, StatusCode::ACCEPTED);
    assert_eq!(res.header("x-app"), Some("recording"));
    assert_eq!(body_text(&res), "app saw /page?a=1");
    assert_eq!(app.sampler.starts(), 0);
}

/// Requests without a query are forwarded as they are
#[tokio::test]
async fn test_no_query() {
    let app = TestApp::new();

    let res = app.get("/page").await;

    assert_eq!(body_text(&res), "app saw /page");
    assert_eq!(app.seen_queries(), vec![None]);
}

/// While a session runs, plain requests are forwarded once each
#[tokio::test]
async fn test_running_session_passthrough() {
    let app = TestApp::new();
    app.get("/__start__").await;

    for _ in 0..3 {
        let res = app.get("/method1?x=1&printer=text").await;
        assert_status(&res, StatusCode::ACCEPTED);
    }

    assert_eq!(app.seen().len(), 3);
    assert!(app
        .seen_queries()
        .iter()
        .all(|q| q.as_deref() == Some("x=1")));
    assert_eq!(app.sampler.starts(), 1);
}

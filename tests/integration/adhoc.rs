//! `profile=true` requests and printer selection.

use http::StatusCode;

use http_profiler::config::ProfilerOptions;
use http_profiler::profiler::{GraphFormat, Printer};

use crate::helpers::*;

fn pdf_default() -> ProfilerOptions {
    ProfilerOptions {
        default_printer: Printer::Pdf,
        ..ProfilerOptions::default()
    }
}

/// A profiled request returns a text report by default
#[tokio::test]
async fn test_profile_text_report() {
    let app = TestApp::new();

    let res = app.get("/method1?profile=true").await;

    assert_status(&res, StatusCode::OK);
    assert_eq!(res.content_type(), Some("text/plain"));
    let body = body_text(&res);
    assert!(body.contains("Total:"), "{body}");
    assert!(body.contains("method1"), "{body}");
    assert!(!app.middleware.session().is_running());
}

/// `times` repeats the application call sequentially
#[tokio::test]
async fn test_profile_times() {
    let app = TestApp::new();

    let res = app.get("/method1?profile=true&times=3&keep=me").await;

    assert!(body_text(&res).starts_with("Total: 3 samples"));
    let seen = app.seen();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|s| s.query.as_deref() == Some("keep=me")));
}

/// Unusable `times` values are rejected before the application runs
#[tokio::test]
async fn test_profile_invalid_times() {
    let app = TestApp::new();

    for uri in [
        "/m?profile=true&times=0",
        "/m?profile=true&times=many",
        "/m?profile=true&times=1001",
    ] {
        assert_status(&app.get(uri).await, StatusCode::BAD_REQUEST);
    }
    assert!(app.seen().is_empty());
    assert_eq!(app.sampler.starts(), 0);
}

/// The request's printer wins over the configured default
#[tokio::test]
async fn test_request_printer_overrides_default() {
    let app = TestApp::with_options(pdf_default());

    let res = app.get("/method1?profile=true&printer=gif").await;

    assert_status(&res, StatusCode::OK);
    assert_eq!(res.content_type(), Some("image/gif"));
    assert_eq!(res.content_disposition(), None);
    assert_eq!(res.body().as_ref(), b"GIF89a-stub");
}

/// The PDF printer is served as a download
#[tokio::test]
async fn test_pdf_attachment() {
    let app = TestApp::with_options(pdf_default());

    let res = app.get("/method1?profile=true").await;

    assert_eq!(res.content_type(), Some("application/pdf"));
    assert_eq!(
        res.content_disposition(),
        Some(r#"attachment; filename="profile_data.pdf""#)
    );
    let calls = app.renderer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, GraphFormat::Pdf);
    assert!(calls[0].1.starts_with("digraph"));
}

/// Every printer sets Content-Length
#[tokio::test]
async fn test_content_length() {
    let app = TestApp::new();

    for printer in ["text", "gif", "pdf"] {
        let res = app
            .get(&format!("/method1?profile=true&printer={}", printer))
            .await;
        assert_eq!(
            res.content_length(),
            Some(res.body_len() as u64),
            "{printer}"
        );
    }
}

/// An unknown printer is a client error and leaves no session behind
#[tokio::test]
async fn test_invalid_printer() {
    let app = TestApp::new();

    let res = app.get("/method1?profile=true&printer=badprinter").await;

    assert_status(&res, StatusCode::BAD_REQUEST);
    assert!(body_text(&res).contains("Invalid printer type: badprinter"));
    assert!(app.seen().is_empty());
    assert!(!app.middleware.session().is_running());
}

/// A renderer failure is a server error
#[tokio::test]
async fn test_renderer_failure() {
    let app = TestApp::with_failing_renderer();

    let res = app.get("/method1?profile=true&printer=gif").await;

    assert_status(&res, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.content_type(), Some("text/plain"));
    assert!(!app.middleware.session().is_running());
}

/// `profile=true` during a running session is a plain forward
#[tokio::test]
async fn test_profile_while_session_running() {
    let app = TestApp::new();
    app.get("/__start__").await;

    let res = app.get("/method1?profile=true&times=4").await;

    assert_status(&res, StatusCode::ACCEPTED);
    assert_eq!(app.seen().len(), 1);
    assert!(app.middleware.session().is_running());
}

/// `focus` keeps only stacks through the matching frame
#[tokio::test]
async fn test_focus() {
    let app = TestApp::new();
    collect(&app).await;

    let body = body_text(&app.get("/__data__?focus=method1").await);

    assert!(body.contains("method1"), "{body}");
    assert!(!body.contains("method2"), "{body}");
}

/// `ignore` drops stacks through the matching frame
#[tokio::test]
async fn test_ignore() {
    let app = TestApp::new();
    collect(&app).await;

    let body = body_text(&app.get("/__data__?ignore=method1").await);

    assert!(!body.contains("method1"), "{body}");
    assert!(body.contains("method2"), "{body}");
}

/// Filters apply to graph printers as well
#[tokio::test]
async fn test_filters_reach_graph() {
    let app = TestApp::new();
    collect(&app).await;

    app.get("/__data__?printer=gif&focus=method2").await;

    let calls = app.renderer.calls.lock().unwrap();
    assert!(calls[0].1.contains("method2"));
    assert!(!calls[0].1.contains("method1"));
}

async fn collect(app: &TestApp) {
    app.get("/__start__").await;
    app.get("/method1").await;
    app.get("/method2").await;
    app.get("/__stop__").await;
}

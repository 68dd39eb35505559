//! `/__start__`, `/__stop__` and `/__data__`.

use std::sync::Arc;

use http::StatusCode;

use crate::helpers::*;

/// A full start / work / stop / data cycle
#[tokio::test]
async fn test_session_cycle() {
    let app = TestApp::new();

    assert_status(&app.get("/__start__").await, StatusCode::OK);
    app.get("/method1").await;
    app.get("/method1").await;
    app.get("/method2").await;
    assert_status(&app.get("/__stop__").await, StatusCode::OK);

    let res = app.get("/__data__").await;
    assert_status(&res, StatusCode::OK);
    assert_eq!(res.content_type(), Some("text/plain"));

    let body = body_text(&res);
    assert!(body.starts_with("Total: 3 samples"), "{body}");
    assert!(body.contains("method1"), "{body}");
    assert!(body.contains("method2"), "{body}");
}

/// Control requests never reach the application
#[tokio::test]
async fn test_control_requests_not_forwarded() {
    let app = TestApp::new();

    app.get("/__start__?a=1").await;
    app.get("/__stop__").await;
    app.get("/__data__").await;

    assert!(app.seen().is_empty());
}

/// Control paths are matched as suffixes
#[tokio::test]
async fn test_control_path_suffix() {
    let app = TestApp::new();

    assert_status(&app.get("/admin/__start__").await, StatusCode::OK);
    assert!(app.middleware.session().is_running());
    assert_status(&app.get("/admin/__stop__").await, StatusCode::OK);
    assert!(!app.middleware.session().is_running());
}

/// Starting twice is harmless
#[tokio::test]
async fn test_start_idempotent() {
    let app = TestApp::new();

    app.get("/__start__").await;
    let res = app.get("/__start__").await;

    assert_status(&res, StatusCode::OK);
    assert_eq!(body_text(&res), "Profiling is already running");
    assert_eq!(app.sampler.starts(), 1);
}

/// Stopping an idle session is a client error
#[tokio::test]
async fn test_stop_idle() {
    let app = TestApp::new();

    let res = app.get("/__stop__").await;

    assert_status(&res, StatusCode::BAD_REQUEST);
    assert!(body_text(&res).contains("not running"));
}

/// Data before any session, and while one is running
#[tokio::test]
async fn test_data_unavailable() {
    let app = TestApp::new();

    let res = app.get("/__data__").await;
    assert_status(&res, StatusCode::NOT_FOUND);
    assert!(body_text(&res).contains("No profiling data available"));

    app.get("/__start__").await;
    let res = app.get("/__data__").await;
    assert_status(&res, StatusCode::BAD_REQUEST);
    assert!(body_text(&res).contains("No profiling data available"));
}

/// Data can be read repeatedly, in different printers
#[tokio::test]
async fn test_data_rereadable() {
    let app = TestApp::new();
    app.get("/__start__").await;
    app.get("/method1").await;
    app.get("/__stop__").await;

    let text = app.get("/__data__").await;
    let gif = app.get("/__data__?printer=gif").await;
    let again = app.get("/__data__").await;

    assert_eq!(text.body(), again.body());
    assert_eq!(gif.content_type(), Some("image/gif"));
    assert_eq!(gif.body().as_ref(), b"GIF89a-stub");
}

/// Data with an unknown printer is a client error
#[tokio::test]
async fn test_data_invalid_printer() {
    let app = TestApp::new();
    app.get("/__start__").await;
    app.get("/__stop__").await;

    let res = app.get("/__data__?printer=svg").await;

    assert_status(&res, StatusCode::BAD_REQUEST);
    assert!(body_text(&res).contains("Invalid printer type: svg"));
}

/// Concurrent starts initialise the sampler once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts() {
    let app = Arc::new(TestApp::new());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let app = Arc::clone(&app);
            tokio::spawn(async move { body_text(&app.get("/__start__").await) })
        })
        .collect();

    let mut started = 0;
    for handle in handles {
        if handle.await.unwrap() == "Profiling started" {
            started += 1;
        }
    }

    assert_eq!(started, 1);
    assert_eq!(app.sampler.starts(), 1);
}

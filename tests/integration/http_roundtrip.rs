//! The middleware served over a real loopback connection.

use std::sync::Arc;

use reqwest::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use http_profiler::server;

use crate::helpers::*;

/// Start/stop/data and an ad-hoc profile over HTTP
#[tokio::test]
async fn test_profile_over_http() {
    let app = TestApp::new();
    let seen = Arc::clone(&app.app);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(server::serve_listener(listener, app.middleware, async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();
    let get = |path: &str| client.get(format!("{}{}", base, path)).send();

    let resp = get("/__start__").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "Profiling started");

    let resp = get("/method1?a=1&focus=x").await.unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(resp.text().await.unwrap(), "app saw /method1?a=1");

    assert_eq!(get("/__stop__").await.unwrap().status(), StatusCode::OK);

    let resp = get("/__data__").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().starts_with("Total: 1 samples"));

    let resp = get("/method2?profile=true&times=2").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/plain")
    );
    assert!(resp.text().await.unwrap().starts_with("Total: 2 samples"));

    assert_eq!(seen.seen.lock().unwrap().len(), 3);

    let _ = stop_tx.send(());
    server.await.unwrap().unwrap();
}

/// Requests get an x-request-id on their way to the application
#[tokio::test]
async fn test_request_id_assigned() {
    use http_profiler::core::{handler_fn, Response};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handler = handler_fn(|req: http_profiler::core::Request| async move {
        Response::ok(req.request_id().unwrap_or("missing").to_string())
    });

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(server::serve_listener(listener, handler, async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();
    let assigned = client.get(&base).send().await.unwrap().text().await.unwrap();
    assert_eq!(assigned.len(), 36);

    let kept = client
        .get(&base)
        .header("x-request-id", "abc123")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(kept, "abc123");

    let _ = stop_tx.send(());
    server.await.unwrap().unwrap();
}

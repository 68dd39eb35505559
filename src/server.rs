//! Minimal hyper host for a [`Handler`].
//!
//! Each connection is served by hyper's auto (HTTP/1.1 + HTTP/2) builder.
//! Request bodies are collected in full before the handler runs, since the
//! profiler may deliver the same request several times.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming as IncomingBody;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::{Handler, Request, Response};

static X_REQUEST_ID: LazyLock<HeaderName> = LazyLock::new(|| HeaderName::from_static("x-request-id"));

/// Check if an error is a common connection reset or timeout.
#[inline]
fn is_connection_error(err_str: &str) -> bool {
    err_str.contains("connection reset")
        || err_str.contains("broken pipe")
        || err_str.contains("Connection reset")
        || err_str.contains("os error 104")
        || err_str.contains("os error 32")
        || err_str.contains("timed out")
}

/// Bind `addr` and serve `handler` until `shutdown` resolves.
pub async fn serve<H, F>(
    addr: SocketAddr,
    handler: H,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    H: Handler + 'static,
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, handler, shutdown).await
}

/// Accept connections on `listener` until `shutdown` resolves.
///
/// Connections already accepted keep running until their client closes them.
pub async fn serve_listener<H, F>(
    listener: TcpListener,
    handler: H,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    H: Handler + 'static,
    F: Future<Output = ()>,
{
    info!("Listening on http://{}", listener.local_addr()?);

    let handler = Arc::new(handler);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, remote_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    serve_connection(stream, remote_addr, handler).await;
                });
            }
            _ = &mut shutdown => {
                info!("Shutting down...");
                return Ok(());
            }
        }
    }
}

async fn serve_connection<H: Handler + 'static>(
    stream: tokio::net::TcpStream,
    remote_addr: SocketAddr,
    handler: Arc<H>,
) {
    let service = service_fn(move |req| {
        let handler = Arc::clone(&handler);
        async move { Ok::<_, Infallible>(handle_request(handler.as_ref(), req, remote_addr).await) }
    });

    let io = TokioIo::new(stream);
    if let Err(err) = auto::Builder::new(TokioExecutor::new())
        .serve_connection(io, service)
        .await
    {
        let err_str = format!("{:?}", err);
        if !is_connection_error(&err_str) {
            debug!("Connection error: {:?}", err);
        }
    }
}

async fn handle_request<H: Handler>(
    handler: &H,
    req: http::Request<IncomingBody>,
    remote_addr: SocketAddr,
) -> http::Response<Full<Bytes>> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(error = %e, "failed to read request body");
            let res = Response::text(StatusCode::BAD_REQUEST, "Failed to read request body");
            return http::Response::from(res).map(Full::new);
        }
    };

    let mut request = Request::from(http::Request::from_parts(parts, body));
    let request_id = ensure_request_id(&mut request);

    let method = request.method().clone();
    let path = request.path().to_string();
    let response = handler.call(request).await;

    info!(
        request_id = %request_id,
        ip = %remote_addr.ip(),
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        bytes = response.body_len() as u64,
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "request served"
    );

    http::Response::from(response).map(Full::new)
}

/// Reuse the client's `x-request-id`, or assign a fresh one.
fn ensure_request_id(request: &mut Request) -> String {
    if let Some(id) = request.request_id() {
        return id.to_string();
    }

    let id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        request.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    id
}

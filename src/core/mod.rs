//! Core types for HTTP request/response handling.
//!
//! This module provides the HTTP abstraction the profiler sits on:
//!
//! - [`Request`] - HTTP request with query-string rewriting
//! - [`Response`] - HTTP response abstraction with builder pattern
//! - [`Handler`] - anything that turns a request into a response
//! - [`Error`] - Core error types
//!
//! # Example
//!
//! ```rust,ignore
//! use http_profiler::core::{handler_fn, Request, Response};
//!
//! let app = handler_fn(|req: Request| async move {
//!     Response::ok(format!("Hello from {}", req.path()))
//! });
//! ```

mod error;
mod handler;
mod request;
mod response;

pub use error::{Error, Result};
pub use handler::{handler_fn, Handler, HandlerFn};
pub use request::Request;
pub use response::{Response, ResponseBuilder};

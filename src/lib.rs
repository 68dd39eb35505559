//! http_profiler - On-demand CPU profiling middleware for HTTP handlers.
//!
//! Wrap any [`Handler`](core::Handler) in a
//! [`ProfilerMiddleware`](profiler::ProfilerMiddleware) and profile it over
//! HTTP, without restarting or redeploying the process.
//!
//! # Features
//!
//! - **Session profiling**: `/__start__`, `/__stop__` and `/__data__` endpoints
//! - **Ad-hoc profiling**: `?profile=true&times=N` profiles a single request
//! - **Printers**: text report, GIF call graph, PDF call graph
//! - **Filters**: `focus` and `ignore` narrow the report to matching stacks
//! - **Password protection**: optional `profiling_password` on every control request
//!
//! # Architecture
//!
//! The middleware drives a pluggable [`Sampler`](profiler::Sampler):
//!
//! - `PprofSampler` - default, SIGPROF-based CPU sampler (feature `pprof`)
//! - any other implementation producing folded stacks
//!
//! Call graphs are rendered by a [`GraphRenderer`](profiler::GraphRenderer),
//! by default Graphviz `dot` ([`DotCommand`](profiler::DotCommand)).
//!
//! # Example
//!
//! ```rust,ignore
//! use http_profiler::config::Config;
//! use http_profiler::demo::DemoApp;
//! use http_profiler::profiler::{DotCommand, PprofSampler, ProfilerMiddleware};
//!
//! let config = Config::from_env()?;
//! let app = ProfilerMiddleware::new(DemoApp, config.profiler, PprofSampler::new(), DotCommand::new())?;
//! http_profiler::server::serve(config.server.listen_addr, app, shutdown).await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod core;
pub mod demo;
pub mod logging;
pub mod profiler;
pub mod server;

// Re-exports for convenience
pub use config::Config;
pub use profiler::ProfilerMiddleware;

//! On-demand CPU profiling for a running HTTP application.
//!
//! [`ProfilerMiddleware`] wraps an application [`Handler`](crate::core::Handler)
//! and lets an operator switch sampling on and off over plain HTTP:
//!
//! | Request | Effect |
//! |---------|--------|
//! | `.../__start__` | start a session spanning the following requests |
//! | `.../__stop__` | stop it and keep the sample |
//! | `.../__data__` | render the kept sample |
//! | `...?profile=true` | profile just this request (`times=N` repeats it) |
//! | anything else | forwarded to the application |
//!
//! `printer`, `focus` and `ignore` select how a sample is rendered. These and
//! the other profiling parameters are stripped before the application sees
//! the request.
//!
//! # Example
//!
//! ```rust,ignore
//! use http_profiler::config::ProfilerOptions;
//! use http_profiler::profiler::{DotCommand, PprofSampler, ProfilerMiddleware};
//!
//! let options = ProfilerOptions::validate(&raw_options)?;
//! let app = ProfilerMiddleware::new(my_app, options, PprofSampler::new(), DotCommand::new())?;
//! ```

mod error;
mod middleware;
mod params;
pub mod printer;
pub mod profile;
mod sampler;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{NoDataReason, ProfileError, RenderError, SamplerError, SessionError};
pub use middleware::ProfilerMiddleware;
pub use params::{
    classify, split_params, ControlParams, ParamError, RequestKind, CONTROL_KEYS, MAX_TIMES,
};
pub use printer::{
    DotCommand, GraphFormat, GraphRenderer, Printer, PrinterDispatcher, RenderRequest,
    RenderedResponse,
};
#[cfg(feature = "pprof")]
pub use sampler::PprofSampler;
pub use sampler::{Sampler, SamplerOptions, SamplingMode};
pub use session::{ProfilingSession, SessionStatus, SessionTicket, StartOutcome};

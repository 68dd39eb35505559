//! Profiling controller wrapping an application handler.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use tracing::{debug, error, info, warn};

use super::params::{classify, split_params, ControlParams, RequestKind};
use super::printer::{GraphRenderer, PrinterDispatcher, RenderRequest};
use super::sampler::{Sampler, SamplerOptions};
use super::session::{ProfilingSession, SessionTicket, StartOutcome};
use super::{NoDataReason, SessionError};
use crate::config::{ConfigError, OptionViolation, ProfilerOptions, RawOptions};
use crate::core::{Handler, Request, Response};

const PASSWORD_REQUIRED: &str =
    "Profiling is password-protected. Pass profiling_password=<password> with the request.";
const NOT_RUNNING: &str = "Profiling is not running. Start it with /__start__ first.";
const NO_DATA_RUNNING: &str =
    "No profiling data available. Profiling is still running; stop it with /__stop__ first.";
const NO_DATA_EMPTY: &str =
    "No profiling data available. Run /__start__ and /__stop__, or pass profile=true.";
const SUPERSEDED: &str =
    "Profiling was stopped by another request before this one finished. No data returned.";

/// Middleware that profiles the wrapped handler on demand.
///
/// All clones of the middleware's [`ProfilingSession`] observe the same
/// state, so an embedding application can share one session between
/// several wrapped handlers with [`ProfilerMiddleware::with_session`].
pub struct ProfilerMiddleware<H> {
    inner: H,
    options: ProfilerOptions,
    sampler_options: SamplerOptions,
    session: Arc<ProfilingSession>,
    printers: PrinterDispatcher,
}

impl<H: Handler> ProfilerMiddleware<H> {
    /// Wrap `inner` with a fresh session over `sampler`.
    ///
    /// Fails when `sampler` cannot run in the configured mode.
    pub fn new(
        inner: H,
        options: ProfilerOptions,
        sampler: impl Sampler + 'static,
        renderer: impl GraphRenderer + 'static,
    ) -> Result<Self, ConfigError> {
        Self::with_session(
            inner,
            options,
            Arc::new(ProfilingSession::new(sampler)),
            PrinterDispatcher::new(renderer),
        )
    }

    /// Wrap `inner` around an existing session.
    pub fn with_session(
        inner: H,
        options: ProfilerOptions,
        session: Arc<ProfilingSession>,
        printers: PrinterDispatcher,
    ) -> Result<Self, ConfigError> {
        if !session.supports(options.mode) {
            return Err(ConfigError::Options(vec![OptionViolation::UnsupportedMode(
                options.mode.to_string(),
            )]));
        }

        let sampler_options = options.sampler_options();
        Ok(Self {
            inner,
            options,
            sampler_options,
            session,
            printers,
        })
    }

    /// Validate a raw option mapping, then wrap `inner`.
    ///
    /// Nothing is constructed when the options are rejected.
    pub fn try_new(
        inner: H,
        raw: &RawOptions,
        sampler: impl Sampler + 'static,
        renderer: impl GraphRenderer + 'static,
    ) -> Result<Self, ConfigError> {
        let options = ProfilerOptions::validate(raw)?;
        Self::new(inner, options, sampler, renderer)
    }

    pub fn session(&self) -> &Arc<ProfilingSession> {
        &self.session
    }

    pub fn options(&self) -> &ProfilerOptions {
        &self.options
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    fn authorized(&self, control: &ControlParams) -> bool {
        match self.options.password.as_deref() {
            None => true,
            Some(expected) => control.password.as_deref() == Some(expected),
        }
    }

    fn start(&self) -> Response {
        match self.session.start(&self.sampler_options) {
            Ok(StartOutcome::Started(_)) => Response::text(StatusCode::OK, "Profiling started"),
            Ok(StartOutcome::AlreadyRunning) => {
                Response::text(StatusCode::OK, "Profiling is already running")
            }
            Err(e) => {
                error!(error = %e, "failed to start profiling");
                Response::internal_error(&format!("Failed to start profiling: {}", e))
            }
        }
    }

    fn stop(&self) -> Response {
        match self.session.stop() {
            Ok(_) => Response::text(StatusCode::OK, "Profiling stopped"),
            Err(SessionError::NotRunning) => Response::text(StatusCode::BAD_REQUEST, NOT_RUNNING),
            Err(e) => {
                error!(error = %e, "failed to stop profiling");
                Response::internal_error(&format!("Failed to stop profiling: {}", e))
            }
        }
    }

    async fn data(&self, control: &ControlParams) -> Response {
        match self.session.data() {
            Ok(sample) => self.render(&sample, control).await,
            Err(SessionError::NoData(NoDataReason::Running)) => {
                Response::text(StatusCode::BAD_REQUEST, NO_DATA_RUNNING)
            }
            Err(SessionError::NoData(NoDataReason::Empty)) => {
                Response::text(StatusCode::NOT_FOUND, NO_DATA_EMPTY)
            }
            Err(e) => Response::internal_error(&e.to_string()),
        }
    }

    async fn render(&self, sample: &Bytes, control: &ControlParams) -> Response {
        let printer = match control.printer(self.options.default_printer) {
            Ok(printer) => printer,
            Err(e) => return Response::text(StatusCode::BAD_REQUEST, e.to_string()),
        };

        let request = RenderRequest {
            sample,
            printer,
            focus: control.focus.as_deref(),
            ignore: control.ignore.as_deref(),
        };

        match self.printers.render(request).await {
            Ok(rendered) => rendered.into_response(),
            Err(e) => {
                error!(printer = %printer, error = %e, "failed to render profile");
                Response::internal_error(&format!("Failed to render profile: {}", e))
            }
        }
    }

    async fn profile(&self, req: Request, control: &ControlParams, passthrough: &str) -> Response {
        // Reject bad parameters before the application sees anything.
        let times = match control.times() {
            Ok(times) => times,
            Err(e) => return Response::text(StatusCode::BAD_REQUEST, e.to_string()),
        };
        if let Err(e) = control.printer(self.options.default_printer) {
            return Response::text(StatusCode::BAD_REQUEST, e.to_string());
        }

        let req = match req.with_query(passthrough) {
            Ok(req) => req,
            Err(e) => return Response::text(StatusCode::BAD_REQUEST, e.to_string()),
        };

        let ticket = match self.session.start(&self.sampler_options) {
            Ok(StartOutcome::Started(ticket)) => ticket,
            Ok(StartOutcome::AlreadyRunning) => {
                debug!(path = req.path(), "session already running, forwarding once");
                return self.inner.call(req).await;
            }
            Err(e) => {
                error!(error = %e, "failed to start profiling");
                return Response::internal_error(&format!("Failed to start profiling: {}", e));
            }
        };

        let guard = StopOnDrop::new(&self.session, ticket);
        let started = Instant::now();
        for _ in 0..times {
            let _ = self.inner.call(req.fork()).await;
        }

        let sample = match guard.finish() {
            Ok(sample) => sample,
            Err(SessionError::Superseded) => {
                warn!(path = req.path(), "profiling session was stopped while the request ran");
                return Response::text(StatusCode::CONFLICT, SUPERSEDED);
            }
            Err(e) => {
                error!(error = %e, "failed to stop profiling");
                return Response::internal_error(&format!("Failed to stop profiling: {}", e));
            }
        };

        info!(
            path = req.path(),
            times,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request profiled"
        );
        self.render(&sample, control).await
    }
}

#[async_trait]
impl<H: Handler> Handler for ProfilerMiddleware<H> {
    async fn call(&self, req: Request) -> Response {
        let (control, passthrough) = split_params(req.query());
        let kind = classify(req.path(), &control);
        debug!(kind = %kind, path = req.path(), "profiler request");

        if kind.is_control() && !self.authorized(&control) {
            warn!(kind = %kind, path = req.path(), "rejected profiling request without valid password");
            return Response::text(StatusCode::UNAUTHORIZED, PASSWORD_REQUIRED);
        }

        match kind {
            RequestKind::Start => self.start(),
            RequestKind::Stop => self.stop(),
            RequestKind::Data => self.data(&control).await,
            RequestKind::ProfiledApp => self.profile(req, &control, &passthrough).await,
            RequestKind::PlainApp => {
                // A request without a query is forwarded untouched.
                if req.query().is_none() {
                    return self.inner.call(req).await;
                }
                match req.with_query(&passthrough) {
                    Ok(req) => self.inner.call(req).await,
                    Err(e) => Response::text(StatusCode::BAD_REQUEST, e.to_string()),
                }
            }
        }
    }
}

/// Stops an ad-hoc run if the profiled request is abandoned midway.
///
/// Only the run identified by `ticket` is ever stopped; a session restarted
/// by someone else in the meantime is left running.
struct StopOnDrop<'a> {
    session: &'a ProfilingSession,
    ticket: SessionTicket,
    armed: bool,
}

impl<'a> StopOnDrop<'a> {
    fn new(session: &'a ProfilingSession, ticket: SessionTicket) -> Self {
        Self {
            session,
            ticket,
            armed: true,
        }
    }

    fn finish(mut self) -> Result<Bytes, SessionError> {
        self.armed = false;
        self.session.stop_owned(self.ticket)
    }
}

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.session.stop_owned(self.ticket) {
            Ok(_) | Err(SessionError::Superseded) => {}
            Err(e) => warn!(error = %e, "failed to stop abandoned profiling session"),
        }
    }
}

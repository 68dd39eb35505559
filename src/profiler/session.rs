//! Process-wide profiling session.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::{info, warn};

use super::sampler::{Sampler, SamplerOptions, SamplingMode};
use super::{NoDataReason, SessionError};

/// Whether the sampler is collecting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
}

/// Identifies one `Idle -> Running` transition of a session.
///
/// Only the holder of the current ticket can end the run with
/// [`ProfilingSession::stop_owned`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTicket(u64);

/// Result of [`ProfilingSession::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// This call moved the session from idle to running.
    Started(SessionTicket),
    /// The session was already running; nothing changed.
    AlreadyRunning,
}

#[derive(Debug)]
struct State {
    status: SessionStatus,
    /// Bumped on every successful start.
    generation: u64,
    last_sample: Option<Bytes>,
}

/// Profiling session shared by every request a middleware instance serves.
///
/// Lifecycle is `Idle -> Running -> Idle (with data)`. Every transition,
/// including the call into the sampler, happens under one lock, so two
/// concurrent `start`s can never both initialise the sampler and a `stop`
/// never interleaves with a `start`. A transition the sampler refuses
/// leaves the session exactly as it was.
pub struct ProfilingSession {
    sampler: Box<dyn Sampler>,
    state: Mutex<State>,
}

impl ProfilingSession {
    /// Create an idle session with no data.
    pub fn new(sampler: impl Sampler + 'static) -> Self {
        Self {
            sampler: Box::new(sampler),
            state: Mutex::new(State {
                status: SessionStatus::Idle,
                generation: 0,
                last_sample: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start sampling. Discards the previous sample on success.
    pub fn start(&self, options: &SamplerOptions) -> Result<StartOutcome, SessionError> {
        let mut state = self.lock();
        if state.status == SessionStatus::Running {
            return Ok(StartOutcome::AlreadyRunning);
        }

        self.sampler.start(options)?;
        state.status = SessionStatus::Running;
        state.generation = state.generation.wrapping_add(1);
        state.last_sample = None;

        info!(
            mode = %options.mode,
            frequency = options.frequency.map(|f| f.get()),
            "profiling started"
        );
        Ok(StartOutcome::Started(SessionTicket(state.generation)))
    }

    /// Whether the sampler can run in `mode` at all.
    pub fn supports(&self, mode: SamplingMode) -> bool {
        self.sampler.supports(mode)
    }

    /// Stop sampling and keep the collected sample.
    pub fn stop(&self) -> Result<Bytes, SessionError> {
        let mut state = self.lock();
        if state.status != SessionStatus::Running {
            return Err(SessionError::NotRunning);
        }
        self.stop_locked(&mut state)
    }

    /// Stop the run identified by `ticket`.
    ///
    /// Fails with [`SessionError::Superseded`] and leaves the session alone
    /// when that run already ended, even if another one has started since.
    pub fn stop_owned(&self, ticket: SessionTicket) -> Result<Bytes, SessionError> {
        let mut state = self.lock();
        if state.status != SessionStatus::Running || state.generation != ticket.0 {
            return Err(SessionError::Superseded);
        }
        self.stop_locked(&mut state)
    }

    fn stop_locked(&self, state: &mut State) -> Result<Bytes, SessionError> {
        match self.sampler.stop() {
            Ok(sample) => {
                state.status = SessionStatus::Idle;
                state.last_sample = Some(sample.clone());
                info!(bytes = sample.len(), "profiling stopped");
                Ok(sample)
            }
            Err(e) => {
                // Follow the sampler: if it stopped anyway the data is lost.
                if !self.sampler.is_running() {
                    state.status = SessionStatus::Idle;
                }
                warn!(error = %e, "sampler failed to stop cleanly");
                Err(e.into())
            }
        }
    }

    /// The most recently completed sample.
    pub fn data(&self) -> Result<Bytes, SessionError> {
        let state = self.lock();
        if state.status == SessionStatus::Running {
            return Err(SessionError::NoData(NoDataReason::Running));
        }
        state
            .last_sample
            .clone()
            .ok_or(SessionError::NoData(NoDataReason::Empty))
    }

    /// Forget the last sample. Does not affect a running session.
    pub fn clear(&self) {
        self.lock().last_sample = None;
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status
    }

    pub fn is_running(&self) -> bool {
        self.status() == SessionStatus::Running
    }
}

//! Profiler error types.

use std::fmt;

/// Why [`ProfilingSession::data`](super::ProfilingSession::data) has nothing to return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoDataReason {
    /// A session is still collecting samples.
    Running,
    /// No session has completed since the last clear.
    Empty,
}

/// Errors from the external sampler collaborator.
#[derive(Debug)]
pub enum SamplerError {
    /// The sampler cannot sample in the requested mode.
    UnsupportedMode(&'static str),
    /// The sampler is already collecting.
    AlreadyRunning,
    /// The sampler was asked to stop while idle.
    NotRunning,
    /// Backend failure.
    Backend(String),
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerError::UnsupportedMode(mode) => {
                write!(f, "sampler does not support {} mode", mode)
            }
            SamplerError::AlreadyRunning => write!(f, "sampler is already running"),
            SamplerError::NotRunning => write!(f, "sampler is not running"),
            SamplerError::Backend(msg) => write!(f, "sampler error: {}", msg),
        }
    }
}

impl std::error::Error for SamplerError {}

/// Profiling session errors.
#[derive(Debug)]
pub enum SessionError {
    /// `stop` was called while idle.
    NotRunning,
    /// The run a caller started has already been ended by someone else.
    Superseded,
    /// `data` has nothing to return.
    NoData(NoDataReason),
    /// The sampler refused a transition; the session state is unchanged.
    Sampler(SamplerError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotRunning => write!(f, "profiling is not running"),
            SessionError::Superseded => {
                write!(f, "profiling session was stopped by another request")
            }
            SessionError::NoData(NoDataReason::Running) => write!(f, "not running"),
            SessionError::NoData(NoDataReason::Empty) => write!(f, "no data"),
            SessionError::Sampler(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Sampler(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SamplerError> for SessionError {
    fn from(e: SamplerError) -> Self {
        SessionError::Sampler(e)
    }
}

/// Errors parsing a folded-stack sample buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum ProfileError {
    /// The buffer is not UTF-8.
    Encoding,
    /// A line is not `frames count`.
    MalformedLine { line: usize },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::Encoding => write!(f, "sample data is not valid UTF-8"),
            ProfileError::MalformedLine { line } => {
                write!(f, "malformed sample data at line {}", line)
            }
        }
    }
}

impl std::error::Error for ProfileError {}

/// Errors producing a rendered profile.
#[derive(Debug)]
pub enum RenderError {
    /// The sample buffer could not be parsed.
    Profile(ProfileError),
    /// The external renderer could not be spawned or talked to.
    Io(std::io::Error),
    /// The external renderer exited unsuccessfully.
    Renderer { status: Option<i32>, stderr: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Profile(e) => write!(f, "{}", e),
            RenderError::Io(e) => write!(f, "renderer I/O error: {}", e),
            RenderError::Renderer { status, stderr } => match status {
                Some(code) => write!(f, "renderer exited with status {}: {}", code, stderr),
                None => write!(f, "renderer terminated by signal: {}", stderr),
            },
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Profile(e) => Some(e),
            RenderError::Io(e) => Some(e),
            RenderError::Renderer { .. } => None,
        }
    }
}

impl From<ProfileError> for RenderError {
    fn from(e: ProfileError) -> Self {
        RenderError::Profile(e)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::Io(e)
    }
}

//! Request classification and profiling-parameter stripping.

use std::fmt;

use percent_encoding::percent_decode_str;

use super::Printer;

/// Query keys consumed by the profiler. None of them reaches the application.
pub const CONTROL_KEYS: [&str; 6] = [
    "profile",
    "times",
    "printer",
    "focus",
    "ignore",
    "profiling_password",
];

/// Largest `times` an ad-hoc profile accepts.
pub const MAX_TIMES: u32 = 1000;

const START_SUFFIX: &str = "/__start__";
const STOP_SUFFIX: &str = "/__stop__";
const DATA_SUFFIX: &str = "/__data__";

/// What an incoming request asks the profiler to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// Begin a session spanning several requests.
    Start,
    /// End the running session.
    Stop,
    /// Render the last completed sample.
    Data,
    /// Profile this one application request (`profile=true`).
    ProfiledApp,
    /// Ordinary application request.
    PlainApp,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Start => "start",
            RequestKind::Stop => "stop",
            RequestKind::Data => "data",
            RequestKind::ProfiledApp => "profiled_app",
            RequestKind::PlainApp => "plain_app",
        }
    }

    /// Whether the request manages the session rather than reaching the application.
    pub fn is_control(&self) -> bool {
        !matches!(self, RequestKind::PlainApp)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a request by its path and already-split control parameters.
pub fn classify(path: &str, control: &ControlParams) -> RequestKind {
    if path.ends_with(START_SUFFIX) {
        RequestKind::Start
    } else if path.ends_with(STOP_SUFFIX) {
        RequestKind::Stop
    } else if path.ends_with(DATA_SUFFIX) {
        RequestKind::Data
    } else if control.profile {
        RequestKind::ProfiledApp
    } else {
        RequestKind::PlainApp
    }
}

/// A control parameter with an unusable value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamError {
    InvalidTimes(String),
    InvalidPrinter(String),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::InvalidTimes(v) => {
                write!(
                    f,
                    "Invalid times value: {} (expected an integer from 1 to {})",
                    v, MAX_TIMES
                )
            }
            ParamError::InvalidPrinter(v) => {
                write!(f, "Invalid printer type: {} (expected text, gif or pdf)", v)
            }
        }
    }
}

impl std::error::Error for ParamError {}

/// Profiling parameters found in a query string (decoded, last occurrence wins).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlParams {
    /// `profile=true` was present.
    pub profile: bool,
    pub times: Option<String>,
    pub printer: Option<String>,
    pub focus: Option<String>,
    pub ignore: Option<String>,
    pub password: Option<String>,
}

impl ControlParams {
    /// Number of application invocations for an ad-hoc profile (default 1,
    /// at most [`MAX_TIMES`]).
    pub fn times(&self) -> Result<u32, ParamError> {
        match self.times.as_deref() {
            None => Ok(1),
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if (1..=MAX_TIMES).contains(&n) => Ok(n),
                _ => Err(ParamError::InvalidTimes(raw.to_string())),
            },
        }
    }

    /// Printer for this request: the `printer` parameter, else `default`.
    pub fn printer(&self, default: Printer) -> Result<Printer, ParamError> {
        match self.printer.as_deref() {
            None => Ok(default),
            Some(raw) => Printer::parse(raw).ok_or_else(|| ParamError::InvalidPrinter(raw.to_string())),
        }
    }

    fn absorb(&mut self, key: &str, value: String) {
        match key {
            "profile" => self.profile = value.eq_ignore_ascii_case("true"),
            "times" => self.times = Some(value),
            "printer" => self.printer = Some(value),
            "focus" => self.focus = Some(value),
            "ignore" => self.ignore = Some(value),
            "profiling_password" => self.password = Some(value),
            _ => {}
        }
    }
}

/// Split a raw query string into control parameters and the query to forward.
///
/// Pass-through pairs keep their original text, encoding and relative order.
/// With no pass-through pairs the forwarded query is `""`, never absent.
pub fn split_params(query: Option<&str>) -> (ControlParams, String) {
    let mut control = ControlParams::default();
    let mut passthrough: Vec<&str> = Vec::new();

    for pair in query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        let key = decode(raw_key);
        if CONTROL_KEYS.contains(&key.as_str()) {
            control.absorb(&key, decode(raw_value));
        } else {
            passthrough.push(pair);
        }
    }

    (control, passthrough.join("&"))
}

/// Decode one form-encoded query component (`+` is a space).
fn decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

//! Profiler middleware options.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use super::parse::env_opt;
use super::{ConfigError, OptionViolation};
use crate::profiler::{Printer, SamplerOptions, SamplingMode};

/// Untyped option mapping as supplied by the host application.
pub type RawOptions = BTreeMap<String, String>;

/// Option names [`ProfilerOptions::validate`] accepts.
///
/// `blocklist` is handed through to the sampler.
pub const ALLOWED_OPTIONS: [&str; 5] = ["mode", "frequency", "default_printer", "password", "blocklist"];

/// Environment variable for each allowed option.
const ENV_KEYS: [(&str, &str); 5] = [
    ("mode", "PROFILER_MODE"),
    ("frequency", "PROFILER_FREQUENCY"),
    ("default_printer", "PROFILER_DEFAULT_PRINTER"),
    ("password", "PROFILER_PASSWORD"),
    ("blocklist", "PROFILER_BLOCKLIST"),
];

/// Validated, immutable profiler configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfilerOptions {
    /// Sampling clock.
    pub mode: SamplingMode,
    /// Samples per second (`None` = sampler default).
    pub frequency: Option<NonZeroU32>,
    /// Printer used when a request has no `printer` parameter.
    pub default_printer: Printer,
    /// Required `profiling_password` for control requests.
    pub password: Option<String>,
    /// Shared objects the sampler skips.
    pub blocklist: Vec<String>,
}

impl ProfilerOptions {
    /// Map a raw option mapping onto typed options.
    ///
    /// The mapping is only borrowed. Every violation is collected, so the
    /// error names all unknown keys and all bad values at once.
    pub fn validate(raw: &RawOptions) -> Result<Self, ConfigError> {
        let mut violations = Vec::new();
        let mut options = Self::default();

        let unknown: Vec<String> = raw
            .keys()
            .filter(|key| !ALLOWED_OPTIONS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            violations.push(OptionViolation::UnknownKeys(unknown));
        }

        if let Some(value) = raw.get("mode") {
            match SamplingMode::parse(value) {
                Some(mode) => options.mode = mode,
                None => violations.push(OptionViolation::InvalidMode(value.clone())),
            }
        }

        if let Some(value) = raw.get("frequency") {
            match value.trim().parse::<NonZeroU32>() {
                Ok(frequency) => options.frequency = Some(frequency),
                Err(_) => violations.push(OptionViolation::InvalidFrequency(value.clone())),
            }
        }

        if let Some(value) = raw.get("default_printer") {
            match Printer::parse(value) {
                Some(printer) => options.default_printer = printer,
                None => violations.push(OptionViolation::InvalidPrinter(value.clone())),
            }
        }

        options.password = raw.get("password").filter(|p| !p.is_empty()).cloned();

        if let Some(value) = raw.get("blocklist") {
            options.blocklist = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if violations.is_empty() {
            Ok(options)
        } else {
            Err(ConfigError::Options(violations))
        }
    }

    /// Load options from `PROFILER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw: RawOptions = ENV_KEYS
            .iter()
            .filter_map(|(key, var)| env_opt(var).map(|value| (key.to_string(), value)))
            .collect();
        Self::validate(&raw)
    }

    /// Parameters for the sampler's `start`.
    pub fn sampler_options(&self) -> SamplerOptions {
        SamplerOptions {
            mode: self.mode,
            frequency: self.frequency,
            blocklist: self.blocklist.clone(),
        }
    }

    pub fn is_password_protected(&self) -> bool {
        self.password.is_some()
    }
}

//! Configuration error types.

use std::fmt;

/// One problem found while validating profiler options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionViolation {
    /// Keys outside the allow-list, sorted.
    UnknownKeys(Vec<String>),
    /// `mode` is not a known sampling mode.
    InvalidMode(String),
    /// `frequency` is not a positive integer.
    InvalidFrequency(String),
    /// `default_printer` is not `text`, `gif` or `pdf`.
    InvalidPrinter(String),
    /// `mode` names a mode the configured sampler cannot run in.
    UnsupportedMode(String),
}

impl fmt::Display for OptionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionViolation::UnknownKeys(keys) => {
                write!(f, "Invalid option(s): {}", keys.join(", "))
            }
            OptionViolation::InvalidMode(value) => write!(f, "Invalid mode: {}", value),
            OptionViolation::InvalidFrequency(value) => {
                write!(f, "Invalid frequency: {} (expected a positive integer)", value)
            }
            OptionViolation::InvalidPrinter(value) => {
                write!(f, "Invalid printer type: {}", value)
            }
            OptionViolation::UnsupportedMode(value) => {
                write!(f, "Unsupported mode: {} (not available with this sampler)", value)
            }
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Invalid value for environment variable.
    Invalid { key: String, message: String },
    /// Profiler options were rejected. Lists every violation found.
    Options(Vec<OptionViolation>),
}

impl ConfigError {
    /// Option violations, empty for other kinds of error.
    pub fn violations(&self) -> &[OptionViolation] {
        match self {
            ConfigError::Options(violations) => violations,
            _ => &[],
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
            ConfigError::Options(violations) => {
                for (i, violation) in violations.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", violation)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

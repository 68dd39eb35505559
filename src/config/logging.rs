//! Logging configuration.

use super::ConfigError;

const DEFAULT_FILTER: &str = "http_profiler=info";

/// Output format for log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable tracing-subscriber output.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("json") {
            Some(LogFormat::Json)
        } else if s.eq_ignore_ascii_case("text") {
            Some(LogFormat::Text)
        } else {
            None
        }
    }
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Output format (from LOG_FORMAT).
    pub format: LogFormat,
    /// Service name for structured logging.
    pub service_name: String,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error.
    /// RUST_LOG accepts full tracing filter syntax: http_profiler=debug,hyper=warn.
    /// LOG_FORMAT is `text` (default) or `json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::from_lookup(|key| {
            std::env::var(key).ok().filter(|v| !v.is_empty())
        }))
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Unusable LOG_LEVEL and LOG_FORMAT values fall back to their defaults
    /// with a warning on stderr, since no subscriber is installed yet.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let format = match lookup("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(value) => LogFormat::parse(&value).unwrap_or_else(|| {
                eprintln!("Warning: Invalid LOG_FORMAT '{}', expected: text, json", value);
                LogFormat::default()
            }),
        };

        Self {
            filter: resolve_log_filter(lookup("LOG_LEVEL"), lookup("RUST_LOG")),
            format,
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "http_profiler".to_string()),
        }
    }
}

/// Priority: LOG_LEVEL > RUST_LOG > default (info)
fn resolve_log_filter(log_level: Option<String>, rust_log: Option<String>) -> String {
    if let Some(level) = log_level {
        let level = level.to_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {
                return format!("http_profiler={}", level);
            }
            _ => {
                eprintln!(
                    "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                    level
                );
            }
        }
    }

    rust_log.unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

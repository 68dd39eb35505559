//! Configuration module for http_profiler.
//!
//! Configuration is loaded from environment variables. The profiler options
//! can also be built from an in-memory mapping, which is what embedding
//! applications normally do.
//!
//! # Example
//!
//! ```rust,ignore
//! use http_profiler::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("Default printer: {}", config.profiler.default_printer);
//! ```

mod error;
mod logging;
mod parse;
mod profiler;
mod server;

pub use error::{ConfigError, OptionViolation};
pub use logging::{LogFormat, LoggingConfig};
pub use profiler::{ProfilerOptions, RawOptions, ALLOWED_OPTIONS};
pub use server::ServerConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Profiler middleware options.
    pub profiler: ProfilerOptions,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            profiler: ProfilerOptions::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Log format: {:?}", self.logging.format);
        info!("  Sampling mode: {}", self.profiler.mode);

        match self.profiler.frequency {
            Some(hz) => info!("  Sampling frequency: {} Hz", hz),
            None => info!("  Sampling frequency: sampler default"),
        }

        info!("  Default printer: {}", self.profiler.default_printer);

        if self.profiler.is_password_protected() {
            info!("  Control endpoints: password-protected");
        }

        if !self.profiler.blocklist.is_empty() {
            info!("  Blocklist: {}", self.profiler.blocklist.join(", "));
        }
    }
}

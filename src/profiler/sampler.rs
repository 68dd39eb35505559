//! External sampler collaborator.
//!
//! The profiler core never samples anything itself. It drives a [`Sampler`]
//! through `start`/`stop` and treats what comes back as an opaque buffer in
//! folded-stack form (`root;caller;leaf count` per line).

use std::fmt;
use std::num::NonZeroU32;

use bytes::Bytes;

use super::SamplerError;

/// What the sampler's clock measures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplingMode {
    /// CPU time consumed by the process.
    #[default]
    Cpu,
    /// Elapsed real time, including time spent blocked.
    WallClock,
}

impl SamplingMode {
    /// Parse a mode name. Accepts `cpu`/`cputime` and `walltime`/`wall-clock`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cpu" | "cputime" => Some(SamplingMode::Cpu),
            "walltime" | "wall-clock" | "wallclock" => Some(SamplingMode::WallClock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SamplingMode::Cpu => "cpu",
            SamplingMode::WallClock => "wall-clock",
        }
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters handed to [`Sampler::start`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplerOptions {
    pub mode: SamplingMode,
    /// Samples per second; `None` leaves the sampler's own default.
    pub frequency: Option<NonZeroU32>,
    /// Shared objects whose frames the sampler should skip.
    pub blocklist: Vec<String>,
}

/// A statistical sampler the profiling session can switch on and off.
///
/// Implementations only need to be correct when `start` and `stop`
/// alternate; the session guarantees that.
pub trait Sampler: Send + Sync {
    /// Begin collecting samples.
    fn start(&self, options: &SamplerOptions) -> Result<(), SamplerError>;

    /// Stop collecting and return the folded-stack buffer.
    fn stop(&self) -> Result<Bytes, SamplerError>;

    /// Whether samples are currently being collected.
    fn is_running(&self) -> bool;

    /// Whether `start` can succeed in `mode`.
    fn supports(&self, _mode: SamplingMode) -> bool {
        true
    }
}

impl<S: Sampler + ?Sized> Sampler for std::sync::Arc<S> {
    fn start(&self, options: &SamplerOptions) -> Result<(), SamplerError> {
        (**self).start(options)
    }

    fn stop(&self) -> Result<Bytes, SamplerError> {
        (**self).stop()
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }

    fn supports(&self, mode: SamplingMode) -> bool {
        (**self).supports(mode)
    }
}

#[cfg(feature = "pprof")]
pub use self::cpu::PprofSampler;

#[cfg(feature = "pprof")]
mod cpu {
    use std::fmt::Write;
    use std::sync::{Mutex, PoisonError};

    use bytes::Bytes;
    use pprof::{ProfilerGuard, ProfilerGuardBuilder, Report};

    use super::{Sampler, SamplerOptions, SamplingMode};
    use crate::profiler::SamplerError;

    /// 99 Hz rather than 100 to avoid lock-step with other timers.
    const DEFAULT_FREQUENCY: i32 = 99;

    /// CPU sampler backed by pprof-rs.
    ///
    /// pprof-rs drives a process-wide `SIGPROF` timer, so only CPU time
    /// can be sampled and only one guard may exist at a time.
    #[derive(Default)]
    pub struct PprofSampler {
        guard: Mutex<Option<ProfilerGuard<'static>>>,
    }

    impl PprofSampler {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Sampler for PprofSampler {
        fn start(&self, options: &SamplerOptions) -> Result<(), SamplerError> {
            if !self.supports(options.mode) {
                return Err(SamplerError::UnsupportedMode(options.mode.as_str()));
            }

            let mut slot = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                return Err(SamplerError::AlreadyRunning);
            }

            let frequency = match options.frequency {
                Some(f) => i32::try_from(f.get()).map_err(|_| {
                    SamplerError::Backend(format!("frequency {} out of range", f))
                })?,
                None => DEFAULT_FREQUENCY,
            };

            let builder = ProfilerGuardBuilder::default().frequency(frequency);
            // pprof-rs only resolves shared objects on these targets.
            #[cfg(all(
                any(target_arch = "x86_64", target_arch = "aarch64"),
                any(target_os = "linux", target_os = "freebsd")
            ))]
            let builder = builder.blocklist(options.blocklist.as_slice());
            let guard = builder
                .build()
                .map_err(|e| SamplerError::Backend(e.to_string()))?;

            *slot = Some(guard);
            Ok(())
        }

        fn stop(&self) -> Result<Bytes, SamplerError> {
            let guard = self
                .guard
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .ok_or(SamplerError::NotRunning)?;

            let report = guard
                .report()
                .build()
                .map_err(|e| SamplerError::Backend(e.to_string()))?;

            // Dropping the guard disarms the timer.
            drop(guard);

            Ok(fold(&report))
        }

        fn is_running(&self) -> bool {
            self.guard
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        }

        fn supports(&self, mode: SamplingMode) -> bool {
            mode == SamplingMode::Cpu
        }
    }

    /// Render a report as folded stacks, root frame first.
    fn fold(report: &Report) -> Bytes {
        let mut out = String::new();
        for (frames, count) in report.data.iter() {
            if *count <= 0 {
                continue;
            }
            let stack: Vec<String> = frames
                .frames
                .iter()
                .rev()
                .flat_map(|inlined| inlined.iter().rev())
                .map(|symbol| symbol.name().replace(';', ":"))
                .collect();
            if stack.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{} {}", stack.join(";"), count);
        }
        Bytes::from(out)
    }
}

//! In-memory sampler for unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bytes::Bytes;

use super::sampler::{Sampler, SamplerOptions, SamplingMode};
use super::SamplerError;

#[derive(Default)]
struct Inner {
    running: bool,
    stacks: BTreeMap<String, u64>,
    last_options: Option<SamplerOptions>,
    fail_next_start: Option<SamplerError>,
}

/// Sampler whose samples are recorded explicitly by the code under test.
#[derive(Default)]
pub struct ScriptedSampler {
    inner: Mutex<Inner>,
    starts: AtomicUsize,
    cpu_only: bool,
}

impl ScriptedSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sampler that, like pprof-rs, cannot sample wall-clock time.
    pub fn cpu_only() -> Self {
        Self {
            cpu_only: true,
            ..Self::default()
        }
    }

    /// Attribute `count` samples to a folded stack. Ignored while idle.
    pub fn record(&self, stack: &str, count: u64) {
        let mut inner = self.inner.lock().unwrap();
        if inner.running {
            *inner.stacks.entry(stack.to_string()).or_default() += count;
        }
    }

    pub fn fail_next_start(&self, error: SamplerError) {
        self.inner.lock().unwrap().fail_next_start = Some(error);
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<SamplerOptions> {
        self.inner.lock().unwrap().last_options.clone()
    }
}

impl Sampler for ScriptedSampler {
    fn start(&self, options: &SamplerOptions) -> Result<(), SamplerError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_start.take() {
            return Err(error);
        }
        if inner.running {
            return Err(SamplerError::AlreadyRunning);
        }
        inner.running = true;
        inner.stacks.clear();
        inner.last_options = Some(options.clone());
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<Bytes, SamplerError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.running {
            return Err(SamplerError::NotRunning);
        }
        inner.running = false;
        let folded: String = inner
            .stacks
            .iter()
            .map(|(stack, count)| format!("{} {}\n", stack, count))
            .collect();
        Ok(Bytes::from(folded))
    }

    fn is_running(&self) -> bool {
        self.inner.lock().unwrap().running
    }

    fn supports(&self, mode: SamplingMode) -> bool {
        !self.cpu_only || mode == SamplingMode::Cpu
    }
}

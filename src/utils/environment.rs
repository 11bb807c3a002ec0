//! Contains run environment specific logic.

use crate::utils::Timer;
use std::sync::Arc;

/// A logger type which is called with various information.
pub type InfoLogger = Arc<dyn Fn(&str) + Send + Sync>;

/// Specifies a computational quota for a run. The main purpose is to allow to stop
/// the engine in reaction to external events such as user cancellation or a timer.
pub trait Quota: Send + Sync {
    /// Returns true when the run should be stopped.
    fn is_reached(&self) -> bool;
}

/// Specifies data parallelism settings for candidate scoring.
#[derive(Clone, Copy, Debug)]
pub struct Parallelism {
    available_cpus: usize,
}

impl Parallelism {
    /// Creates a new instance of `Parallelism` with the given cpu budget.
    pub fn new(available_cpus: usize) -> Self {
        Self { available_cpus: available_cpus.max(1) }
    }

    /// Returns amount of cpus available for scoring.
    pub fn available_cpus(&self) -> usize {
        self.available_cpus
    }

    /// Checks whether scoring should fan out over the thread pool.
    pub fn is_parallel(&self) -> bool {
        self.available_cpus > 1
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Self::new(std::thread::available_parallelism().map(|cpus| cpus.get()).unwrap_or(1))
    }
}

/// A wall-clock time quota.
pub struct TimeQuota {
    start: Timer,
    limit_in_secs: f64,
}

impl TimeQuota {
    /// Creates a new instance of `TimeQuota`.
    pub fn new(limit_in_secs: f64) -> Self {
        Self { start: Timer::start(), limit_in_secs }
    }
}

impl Quota for TimeQuota {
    fn is_reached(&self) -> bool {
        self.start.elapsed_secs_as_f64() > self.limit_in_secs
    }
}

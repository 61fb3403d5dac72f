//! Soft real-time periodic pacing
//!
//! Every periodic activity runs the same shape of loop: record the entry
//! time, execute the body, then sleep for whatever is left of the period.
//! An iteration that overruns gets zero sleep and the next one starts
//! immediately — skipped time is never carried over, so sustained overrun
//! drifts the schedule instead of bursting to catch up.

pub mod stats;
pub mod types;

pub use stats::TaskStats;
pub use types::TaskMetadata;

use embassy_time::{Instant, Timer};

/// Seconds between statistics log lines per task
const STATS_LOG_INTERVAL_S: u32 = 10;

/// Fixed-rate pacer for one periodic task
///
/// ```ignore
/// let mut pacer = Pacer::new(SAMPLING_TASK);
/// loop {
///     pacer.enter();
///     // ... task body ...
///     pacer.pace().await;
/// }
/// ```
pub struct Pacer {
    metadata: TaskMetadata,
    stats: TaskStats,
    entry: Instant,
    log_every: u32,
}

impl Pacer {
    /// Create a pacer for the given task
    pub fn new(metadata: TaskMetadata) -> Self {
        Self {
            metadata,
            stats: TaskStats::new(),
            entry: Instant::now(),
            log_every: metadata.rate_hz.saturating_mul(STATS_LOG_INTERVAL_S),
        }
    }

    /// Mark the start of an iteration
    pub fn enter(&mut self) {
        self.entry = Instant::now();
    }

    /// Record the iteration and sleep out the rest of the period
    pub async fn pace(&mut self) {
        let elapsed = self.entry.elapsed();
        let execution_us = elapsed.as_micros().min(u32::MAX as u64) as u32;
        self.stats.record(execution_us, self.metadata.period_us());

        if execution_us > self.metadata.budget_us {
            crate::log_debug!(
                "{} over budget: {}us (budget {}us)",
                self.metadata.name,
                execution_us,
                self.metadata.budget_us
            );
        }

        if self.log_every > 0 && self.stats.iterations % self.log_every == 0 {
            crate::log_debug!(
                "{}: {} iterations, last {}us, max {}us, {} overruns",
                self.metadata.name,
                self.stats.iterations,
                self.stats.last_execution_us,
                self.stats.max_execution_us,
                self.stats.overruns
            );
        }

        // max(0, period - elapsed); overruns get no sleep and no catch-up
        if let Some(idle) = self.metadata.period().checked_sub(elapsed) {
            Timer::after(idle).await;
        }
    }

    /// Counters recorded so far
    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }
}

//! Task metadata
//!
//! Static per-task description: name, target rate, and the execution budget
//! each iteration is expected to stay within.

use embassy_time::Duration;

/// Compile-time description of one periodic task
#[derive(Debug, Clone, Copy)]
pub struct TaskMetadata {
    /// Task name for diagnostics
    pub name: &'static str,

    /// Target iteration rate in Hz
    pub rate_hz: u32,

    /// Expected worst-case execution time per iteration (µs)
    pub budget_us: u32,
}

impl TaskMetadata {
    /// Target period in microseconds
    pub const fn period_us(&self) -> u32 {
        1_000_000 / self.rate_hz
    }

    /// Target period as a duration
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us() as u64)
    }
}

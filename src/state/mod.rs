//! Shared sensor and button state
//!
//! The sampling, button, and telemetry tasks communicate only through the
//! [`SampleStore`]: a pair of independently locked slots holding the latest
//! fused IMU sample and the latest button event.

pub mod store;

pub use store::{SampleStore, StoreError, LOCK_TIMEOUT};

use bitflags::bitflags;
use nalgebra::{Quaternion, Vector3};

bitflags! {
    /// Buttons on the handheld, one bit per physical button
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ButtonMask: u8 {
        /// Front face button
        const PRIMARY = 0b0000_0001;
        /// Side button
        const SECONDARY = 0b0000_0010;
    }
}

/// One fused inertial sample
///
/// Produced by the sampling task, handed off to the [`SampleStore`] under its
/// lock, and consumed by the telemetry task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Bias-corrected angular rate, body frame (rad/s)
    pub gyro: Vector3<f32>,

    /// Acceleration, body frame (g)
    pub accel: Vector3<f32>,

    /// Fused attitude (unit quaternion, scalar-first)
    pub quat: Quaternion<f32>,

    /// Monotonic milliseconds since boot
    pub timestamp_ms: u64,
}

/// Latest observed button edge
///
/// Overwritten on every detected edge; `dirty` is cleared once the event has
/// been transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Monotonic milliseconds since boot
    pub timestamp_ms: u64,

    /// Buttons held down when the edge was observed
    pub buttons: ButtonMask,

    /// True until the event has been consumed by the transmitter
    pub dirty: bool,
}

impl ButtonEvent {
    /// All buttons released, nothing to transmit
    pub const fn idle() -> Self {
        Self {
            timestamp_ms: 0,
            buttons: ButtonMask::empty(),
            dirty: false,
        }
    }
}

impl Default for ButtonEvent {
    fn default() -> Self {
        Self::idle()
    }
}

//! Startup gyroscope bias estimation
//!
//! The handheld rests on a surface for the first second after boot while the
//! calibrator averages raw gyro samples. The mean becomes the bias offset
//! subtracted from every later reading. One-shot: once converged the
//! calibrator ignores further samples until explicitly re-armed.

use nalgebra::Vector3;

/// Samples accumulated before the bias estimate is emitted (1 s at 200 Hz)
pub const CALIBRATION_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Accumulating,
    Converged,
}

/// Accumulates stationary gyro samples and emits their mean once
pub struct GyroCalibrator {
    sum: Vector3<f32>,
    count: usize,
    window: usize,
    phase: Phase,
}

impl GyroCalibrator {
    /// Create a calibrator that converges after `window` samples
    pub fn new(window: usize) -> Self {
        Self {
            sum: Vector3::zeros(),
            count: 0,
            window,
            phase: Phase::Accumulating,
        }
    }

    /// Feed one raw gyro sample
    ///
    /// Returns `Some(mean)` exactly once, on the sample that fills the
    /// window; the accumulator is reset and the calibrator transitions to
    /// converged. Samples pushed after convergence are ignored.
    pub fn push(&mut self, sample: Vector3<f32>) -> Option<Vector3<f32>> {
        if self.phase == Phase::Converged {
            return None;
        }

        self.sum += sample;
        self.count += 1;

        if self.count < self.window {
            return None;
        }

        let mean = self.sum / (self.count as f32);
        self.sum = Vector3::zeros();
        self.count = 0;
        self.phase = Phase::Converged;
        Some(mean)
    }

    /// Whether the bias estimate has been emitted
    pub fn is_converged(&self) -> bool {
        self.phase == Phase::Converged
    }

    /// Samples collected so far in the current window
    pub fn sample_count(&self) -> usize {
        self.count
    }

    /// Restart accumulation from scratch
    ///
    /// Only an explicit request re-arms a converged calibrator.
    pub fn rearm(&mut self) {
        self.sum = Vector3::zeros();
        self.count = 0;
        self.phase = Phase::Accumulating;
    }
}

impl Default for GyroCalibrator {
    fn default() -> Self {
        Self::new(CALIBRATION_WINDOW)
    }
}

//! Mock devices for host testing
//!
//! Scripted stand-ins for the hardware traits so the reading path, the
//! calibrator, and the monitor can be exercised without a board.

use heapless::Deque;
use nalgebra::Vector3;

use super::traits::{ImuError, InertialSensor, RawInertialSample};
use crate::state::ButtonMask;

/// Mock 6-axis sensor
///
/// Returns queued readings in order, then falls back to a constant reading.
pub struct MockImu {
    queued: Deque<RawInertialSample, 64>,
    fallback: RawInertialSample,
    failing: bool,
}

impl MockImu {
    /// Always return the same reading
    pub fn constant(reading: RawInertialSample) -> Self {
        Self {
            queued: Deque::new(),
            fallback: reading,
            failing: false,
        }
    }

    /// Return the given readings in order, then repeat the last one
    pub fn sequence(readings: &[RawInertialSample]) -> Self {
        let mut queued = Deque::new();
        for &reading in readings {
            let _ = queued.push_back(reading);
        }
        let fallback = readings.last().copied().unwrap_or(RawInertialSample {
            gyro_dps: Vector3::zeros(),
            accel_g: Vector3::new(0.0, 0.0, 1.0),
        });
        Self {
            queued,
            fallback,
            failing: false,
        }
    }

    /// Make every read fail with a bus error
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl InertialSensor for MockImu {
    async fn read_raw(&mut self) -> Result<RawInertialSample, ImuError> {
        if self.failing {
            return Err(ImuError::Bus);
        }
        Ok(self.queued.pop_front().unwrap_or(self.fallback))
    }
}

/// Mock button source
///
/// Replays a scripted sequence of pressed-masks, then holds the last state.
pub struct MockButtons {
    script: Deque<ButtonMask, 64>,
    held: ButtonMask,
}

impl MockButtons {
    /// Script the masks returned by successive polls
    pub fn script(masks: &[ButtonMask]) -> Self {
        let mut script = Deque::new();
        for &mask in masks {
            let _ = script.push_back(mask);
        }
        Self {
            script,
            held: masks.last().copied().unwrap_or(ButtonMask::empty()),
        }
    }
}

impl crate::devices::traits::ButtonInput for MockButtons {
    fn poll(&mut self) -> ButtonMask {
        match self.script.pop_front() {
            Some(mask) => mask,
            None => self.held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::traits::ButtonInput;
    use embassy_futures::block_on;

    #[test]
    fn test_sequence_then_fallback() {
        let first = RawInertialSample {
            gyro_dps: Vector3::new(1.0, 0.0, 0.0),
            accel_g: Vector3::new(0.0, 0.0, 1.0),
        };
        let second = RawInertialSample {
            gyro_dps: Vector3::new(2.0, 0.0, 0.0),
            accel_g: Vector3::new(0.0, 0.0, 1.0),
        };
        let mut imu = MockImu::sequence(&[first, second]);

        assert_eq!(block_on(imu.read_raw()).unwrap(), first);
        assert_eq!(block_on(imu.read_raw()).unwrap(), second);
        assert_eq!(block_on(imu.read_raw()).unwrap(), second);
    }

    #[test]
    fn test_button_script_holds_last_state() {
        let mut buttons = MockButtons::script(&[ButtonMask::empty(), ButtonMask::PRIMARY]);
        assert_eq!(buttons.poll(), ButtonMask::empty());
        assert_eq!(buttons.poll(), ButtonMask::PRIMARY);
        assert_eq!(buttons.poll(), ButtonMask::PRIMARY);
    }
}

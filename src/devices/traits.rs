//! Device-independent sensor interfaces
//!
//! These traits are the boundary between the fusion/telemetry core and the
//! hardware: register maps, bus setup, and debouncing live behind them.

use nalgebra::Vector3;

/// IMU access failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum ImuError {
    /// Bus transaction failed
    Bus,
    /// Sensor returned implausible data
    InvalidData,
    /// Driver not initialized
    NotInitialized,
}

/// One raw 6-axis reading, in the sensor's native units
///
/// Bias correction and unit conversion happen later, in the reading path —
/// the calibrator works on these raw values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawInertialSample {
    /// Angular rate (degrees per second, body frame)
    pub gyro_dps: Vector3<f32>,

    /// Acceleration (g, body frame)
    pub accel_g: Vector3<f32>,
}

/// 6-axis inertial sensor
///
/// `read_raw` must be fast relative to the 5 ms sampling budget; the task
/// calls it once per period.
#[allow(async_fn_in_trait)]
pub trait InertialSensor {
    /// Read the latest gyro/accel pair
    async fn read_raw(&mut self) -> Result<RawInertialSample, ImuError>;
}

/// Discrete button source
///
/// Returns the currently pressed set; edge detection is done by the monitor,
/// debouncing by the hardware.
pub trait ButtonInput {
    /// Sample the pressed-button mask
    fn poll(&mut self) -> crate::state::ButtonMask;
}

//! Sensor and input devices
//!
//! The core consumes hardware through two narrow traits: an inertial sensor
//! that yields raw gyro/accel pairs and a button source that reports the
//! currently pressed set. Mock implementations cover host tests; the MPU-6886
//! driver covers the handheld itself.

pub mod button;
pub mod imu;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "pico2_w")]
pub mod mpu6886;

pub use button::{run_button_task, ButtonMonitor};
pub use imu::{run_sampling_task, ImuReader};
pub use traits::{ButtonInput, ImuError, InertialSensor, RawInertialSample};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockButtons, MockImu};

#[cfg(feature = "pico2_w")]
pub use mpu6886::Mpu6886;

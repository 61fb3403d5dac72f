//! Orientation estimation
//!
//! Fuses gyroscope and accelerometer readings into a unit quaternion using
//! the Mahony complementary filter, projects it to Euler angles for the local
//! display, and estimates the gyroscope bias while the device rests at boot.

pub mod calibration;
pub mod euler;
pub mod mahony;

pub use calibration::{GyroCalibrator, CALIBRATION_WINDOW};
pub use euler::EulerAngles;
pub use mahony::{inv_sqrt, FilterState, FusionConfig, MahonyFilter};

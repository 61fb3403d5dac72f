//! Quaternion to Euler-angle projection
//!
//! Display-side only: the projected angles are never transmitted. Yaw gets a
//! fixed magnetic-declination correction so the on-screen heading reads true
//! north at the deployment site.

use libm::{asinf, atan2f};
use nalgebra::Quaternion;

/// Attitude as pitch/roll/yaw in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    /// Rotation about the Y axis (degrees)
    pub pitch_deg: f32,

    /// Rotation about the X axis (degrees)
    pub roll_deg: f32,

    /// Heading (degrees, declination-corrected)
    pub yaw_deg: f32,
}

impl EulerAngles {
    /// Project a unit quaternion to Euler angles
    ///
    /// `declination_deg` is the local magnetic declination, added to yaw.
    /// Pure function; no side effects.
    pub fn from_quaternion(q: &Quaternion<f32>, declination_deg: f32) -> Self {
        let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);

        let pitch = asinf(-2.0 * q1 * q3 + 2.0 * q0 * q2);
        let roll = atan2f(
            2.0 * q2 * q3 + 2.0 * q0 * q1,
            -2.0 * q1 * q1 - 2.0 * q2 * q2 + 1.0,
        );
        let yaw = atan2f(
            2.0 * (q1 * q2 + q0 * q3),
            q0 * q0 + q1 * q1 - q2 * q2 - q3 * q3,
        );

        Self {
            pitch_deg: pitch.to_degrees(),
            roll_deg: roll.to_degrees(),
            yaw_deg: yaw.to_degrees() + declination_deg,
        }
    }
}

//! Mahony complementary filter
//!
//! Estimates device attitude as a unit quaternion from body-frame angular
//! rate and linear acceleration. Acceleration supplies the gravity reference
//! that corrects gyro drift; only its direction is used, never its magnitude.
//!
//! The sample period is baked into the integration constants — callers must
//! invoke [`MahonyFilter::update`] at `sample_freq_hz` for the implicit `dt`
//! to stay valid.

use nalgebra::{Quaternion, Vector3};

/// Default update rate the sampling task runs at (Hz)
pub const SAMPLE_FREQ_HZ: f32 = 200.0;

/// Default proportional gain (2 * Kp)
pub const TWO_KP_DEFAULT: f32 = 2.0;

/// Default integral gain (2 * Ki)
///
/// Zero by default: the filter runs as a pure proportional controller and the
/// integral path stays inert (terms are clamped every update).
pub const TWO_KI_DEFAULT: f32 = 0.0;

/// Default magnetic declination correction applied to yaw (degrees)
pub const DECLINATION_DEG_DEFAULT: f32 = -8.5;

/// Filter gains and timing, fixed at construction
///
/// Deployment-time configuration; there is no runtime reconfiguration path.
#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    /// 2 * proportional gain (Kp)
    pub two_kp: f32,

    /// 2 * integral gain (Ki); zero disables the integral path
    pub two_ki: f32,

    /// Update rate the caller commits to (Hz)
    pub sample_freq_hz: f32,

    /// Local magnetic declination added to yaw (degrees)
    pub declination_deg: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            two_kp: TWO_KP_DEFAULT,
            two_ki: TWO_KI_DEFAULT,
            sample_freq_hz: SAMPLE_FREQ_HZ,
            declination_deg: DECLINATION_DEG_DEFAULT,
        }
    }
}

/// Mutable filter state, owned by one [`MahonyFilter`]
///
/// Invariant: the quaternion stays unit-norm (within numerical tolerance)
/// after every update.
#[derive(Debug, Clone, Copy)]
pub struct FilterState {
    /// Attitude quaternion (scalar-first: w, i, j, k)
    quat: Quaternion<f32>,

    /// Accumulated integral error terms, scaled by Ki
    integral_fb: Vector3<f32>,
}

impl FilterState {
    /// Identity attitude, zero integral feedback
    pub fn new() -> Self {
        Self {
            quat: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            integral_fb: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Mahony AHRS filter
///
/// `update` is a deterministic function of the current state and the inputs:
/// identical sequences always produce identical quaternions.
pub struct MahonyFilter {
    config: FusionConfig,
    state: FilterState,
}

impl MahonyFilter {
    /// Create a filter at the identity attitude
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            state: FilterState::new(),
        }
    }

    /// Current attitude quaternion (unit, scalar-first)
    pub fn quaternion(&self) -> Quaternion<f32> {
        self.state.quat
    }

    /// Filter configuration
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Reset to the identity attitude and clear integral feedback
    pub fn reset(&mut self) {
        self.state = FilterState::new();
    }

    /// Advance the filter by one sample period
    ///
    /// `gyro` is the body-frame angular rate in rad/s; `accel` is the
    /// body-frame acceleration in any consistent unit (only the direction is
    /// used). A zero acceleration vector skips the gravity correction for
    /// this cycle so its normalization cannot divide by zero.
    pub fn update(&mut self, gyro: Vector3<f32>, accel: Vector3<f32>) {
        let (mut gx, mut gy, mut gz) = (gyro.x, gyro.y, gyro.z);
        let q = self.state.quat;
        let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);

        if !(accel.x == 0.0 && accel.y == 0.0 && accel.z == 0.0) {
            // Normalise the accelerometer measurement
            let recip_norm =
                inv_sqrt(accel.x * accel.x + accel.y * accel.y + accel.z * accel.z);
            let ax = accel.x * recip_norm;
            let ay = accel.y * recip_norm;
            let az = accel.z * recip_norm;

            // Estimated direction of gravity (half magnitude)
            let half_vx = q1 * q3 - q0 * q2;
            let half_vy = q0 * q1 + q2 * q3;
            let half_vz = q0 * q0 - 0.5 + q3 * q3;

            // Error is the cross product between estimated and measured gravity
            let half_ex = ay * half_vz - az * half_vy;
            let half_ey = az * half_vx - ax * half_vz;
            let half_ez = ax * half_vy - ay * half_vx;

            if self.config.two_ki > 0.0 {
                let ki_dt = self.config.two_ki * (1.0 / self.config.sample_freq_hz);
                self.state.integral_fb.x += ki_dt * half_ex;
                self.state.integral_fb.y += ki_dt * half_ey;
                self.state.integral_fb.z += ki_dt * half_ez;
                gx += self.state.integral_fb.x;
                gy += self.state.integral_fb.y;
                gz += self.state.integral_fb.z;
            } else {
                // Prevent integral windup
                self.state.integral_fb = Vector3::zeros();
            }

            gx += self.config.two_kp * half_ex;
            gy += self.config.two_kp * half_ey;
            gz += self.config.two_kp * half_ez;
        }

        // Integrate rate of change of the quaternion (first order)
        let half_dt = 0.5 * (1.0 / self.config.sample_freq_hz);
        gx *= half_dt;
        gy *= half_dt;
        gz *= half_dt;
        let n0 = q0 + (-q1 * gx - q2 * gy - q3 * gz);
        let n1 = q1 + (q0 * gx + q2 * gz - q3 * gy);
        let n2 = q2 + (q0 * gy - q1 * gz + q3 * gx);
        let n3 = q3 + (q0 * gz + q1 * gy - q2 * gx);

        // Renormalise
        let recip_norm = inv_sqrt(n0 * n0 + n1 * n1 + n2 * n2 + n3 * n3);
        self.state.quat = Quaternion::new(
            n0 * recip_norm,
            n1 * recip_norm,
            n2 * recip_norm,
            n3 * recip_norm,
        );
    }
}

/// Fast inverse square root
///
/// Bit-pattern seed plus a single Newton-Raphson refinement; relative error
/// stays below 0.2% over the magnitudes the filter sees. The exact two-step
/// structure is kept so the filter's numerical behavior matches the receiver
/// host's expectations.
pub fn inv_sqrt(x: f32) -> f32 {
    let half_x = 0.5 * x;
    let i = 0x5f37_59df_u32.wrapping_sub(x.to_bits() >> 1);
    let y = f32::from_bits(i);
    y * (1.5 - half_x * y * y)
}

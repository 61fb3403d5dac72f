//! IMU reading path and sampling task
//!
//! [`ImuReader`] turns raw sensor output into fused samples: subtract the
//! installed gyro bias, convert to rad/s, run the Mahony update, and stamp
//! the result. The sampling task drives it at 200 Hz, feeding the calibrator
//! first when no persisted bias was found at boot.

use embassy_time::Instant;
use nalgebra::Vector3;

use super::traits::{ImuError, InertialSensor, RawInertialSample};
use crate::core::scheduler::{Pacer, TaskMetadata};
use crate::fusion::{EulerAngles, FusionConfig, GyroCalibrator, MahonyFilter};
use crate::state::{ImuSample, SampleStore};

const SAMPLING_TASK: TaskMetadata = TaskMetadata {
    name: "imu_sample",
    rate_hz: 200,
    budget_us: 2500,
};

/// Sensor wrapper that applies the gyro bias and runs the fusion filter
pub struct ImuReader<S: InertialSensor> {
    sensor: S,
    filter: MahonyFilter,
    gyro_offset_dps: Vector3<f32>,
}

impl<S: InertialSensor> ImuReader<S> {
    /// Wrap a sensor with a fresh filter and zero bias
    pub fn new(sensor: S, config: FusionConfig) -> Self {
        Self {
            sensor,
            filter: MahonyFilter::new(config),
            gyro_offset_dps: Vector3::zeros(),
        }
    }

    /// Install a gyro bias, subtracted from every subsequent raw sample
    ///
    /// Called with the persisted offset at boot, or with the calibrator's
    /// mean once it converges.
    pub fn set_gyro_offset(&mut self, offset_dps: Vector3<f32>) {
        self.gyro_offset_dps = offset_dps;
    }

    /// Currently installed gyro bias (degrees per second)
    pub fn gyro_offset(&self) -> Vector3<f32> {
        self.gyro_offset_dps
    }

    /// Euler projection of the current attitude, declination-corrected
    ///
    /// Display diagnostics only; never transmitted.
    pub fn euler(&self) -> EulerAngles {
        EulerAngles::from_quaternion(
            &self.filter.quaternion(),
            self.filter.config().declination_deg,
        )
    }

    /// Read one raw sample and advance the filter
    ///
    /// Returns the fused sample plus the raw reading (the calibrator needs
    /// the uncorrected values).
    pub async fn sample(
        &mut self,
        timestamp_ms: u64,
    ) -> Result<(ImuSample, RawInertialSample), ImuError> {
        let raw = self.sensor.read_raw().await?;

        let gyro_rad = (raw.gyro_dps - self.gyro_offset_dps).map(|v| v.to_radians());
        self.filter.update(gyro_rad, raw.accel_g);

        let sample = ImuSample {
            gyro: gyro_rad,
            accel: raw.accel_g,
            quat: self.filter.quaternion(),
            timestamp_ms,
        };
        Ok((sample, raw))
    }
}

/// 200 Hz sampling loop
///
/// With `calibrator = Some(..)` the task starts in the calibration phase:
/// raw gyro samples feed the accumulator and nothing is published until it
/// converges, at which point the mean is installed on the reader, handed to
/// `persist_offset`, and normal operation begins. Pass `None` when a
/// persisted offset was already installed at boot.
pub async fn run_sampling_task<S, P>(
    mut reader: ImuReader<S>,
    mut calibrator: Option<GyroCalibrator>,
    store: &SampleStore,
    mut persist_offset: P,
) -> !
where
    S: InertialSensor,
    P: FnMut(Vector3<f32>),
{
    let mut pacer = Pacer::new(SAMPLING_TASK);
    let mut display_divider: u32 = 0;

    loop {
        pacer.enter();

        let timestamp_ms = Instant::now().as_millis();
        match reader.sample(timestamp_ms).await {
            Ok((sample, raw)) => {
                let converged = match calibrator.as_mut() {
                    Some(cal) => cal.push(raw.gyro_dps),
                    None => None,
                };

                if let Some(offset) = converged {
                    reader.set_gyro_offset(offset);
                    persist_offset(offset);
                    calibrator = None;
                    crate::log_info!(
                        "gyro bias calibrated: ({}, {}, {}) dps",
                        offset.x,
                        offset.y,
                        offset.z
                    );
                } else if calibrator.is_none() && store.publish_imu(sample).await.is_err() {
                    crate::log_debug!("imu store contended, sample dropped");
                }
            }
            Err(_e) => {
                crate::log_warn!("imu read failed, cycle skipped");
            }
        }

        // Once a second, the local attitude readout
        display_divider += 1;
        if display_divider >= SAMPLING_TASK.rate_hz {
            display_divider = 0;
            let euler = reader.euler();
            crate::log_debug!(
                "attitude: pitch {} roll {} yaw {}",
                euler.pitch_deg,
                euler.roll_deg,
                euler.yaw_deg
            );
        }

        pacer.pace().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::MockImu;
    use embassy_futures::block_on;

    #[test]
    fn test_offset_is_subtracted_before_conversion() {
        let sensor = MockImu::constant(RawInertialSample {
            gyro_dps: Vector3::new(10.0, -4.0, 2.0),
            accel_g: Vector3::new(0.0, 0.0, 1.0),
        });
        let mut reader = ImuReader::new(sensor, FusionConfig::default());
        reader.set_gyro_offset(Vector3::new(10.0, -4.0, 2.0));

        let (sample, raw) = block_on(reader.sample(5)).unwrap();

        assert_eq!(sample.gyro, Vector3::zeros());
        assert_eq!(raw.gyro_dps, Vector3::new(10.0, -4.0, 2.0));
        assert_eq!(sample.timestamp_ms, 5);
    }

    #[test]
    fn test_sample_carries_unit_quaternion() {
        let sensor = MockImu::constant(RawInertialSample {
            gyro_dps: Vector3::new(30.0, 0.0, 0.0),
            accel_g: Vector3::new(0.0, 0.0, 1.0),
        });
        let mut reader = ImuReader::new(sensor, FusionConfig::default());

        let mut last = None;
        for i in 0..200 {
            let (sample, _) = block_on(reader.sample(i)).unwrap();
            last = Some(sample);
        }
        let sample = last.unwrap();
        let q = sample.quat;
        let norm = (q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k).sqrt();
        assert!((norm - 1.0).abs() < 2e-3);

        // A second of 30 dps roll must have moved the attitude
        assert!(q.i.abs() > 0.01);
    }

    #[test]
    fn test_euler_readout_uses_configured_declination() {
        let sensor = MockImu::constant(RawInertialSample {
            gyro_dps: Vector3::zeros(),
            accel_g: Vector3::new(0.0, 0.0, 1.0),
        });
        let mut reader = ImuReader::new(sensor, FusionConfig::default());
        for i in 0..100 {
            block_on(reader.sample(i)).unwrap();
        }

        let euler = reader.euler();
        assert!(euler.pitch_deg.abs() < 0.1);
        assert!(euler.roll_deg.abs() < 0.1);
        assert!((euler.yaw_deg - (-8.5)).abs() < 0.1);
    }

    #[test]
    fn test_read_failure_propagates() {
        let mut sensor = MockImu::constant(RawInertialSample {
            gyro_dps: Vector3::zeros(),
            accel_g: Vector3::new(0.0, 0.0, 1.0),
        });
        sensor.set_failing(true);
        let mut reader = ImuReader::new(sensor, FusionConfig::default());

        assert_eq!(block_on(reader.sample(0)), Err(ImuError::Bus));
    }
}

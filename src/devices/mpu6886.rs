//! MPU-6886 I2C driver
//!
//! Minimal driver for the handheld's 6-axis IMU: configure the ranges the
//! fusion filter expects and burst-read accel + gyro each sample. Runs the
//! internal sample-rate divider at 200 Hz to match the sampling task.

use embassy_rp::i2c::{Async, I2c, Instance};
use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::I2c as AsyncI2c;
use nalgebra::Vector3;

use super::traits::{ImuError, InertialSensor, RawInertialSample};

/// I2C address (AD0 low)
const MPU6886_ADDR: u8 = 0x68;

mod regs {
    pub const SMPLRT_DIV: u8 = 0x19;
    pub const CONFIG: u8 = 0x1A;
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;

    pub const WHO_AM_I_VALUE: u8 = 0x19;
}

/// ±2000 dps full scale
const GYRO_SCALE_DPS: f32 = 2000.0 / 32768.0;

/// ±8 g full scale
const ACCEL_SCALE_G: f32 = 8.0 / 32768.0;

/// MPU-6886 on an async I2C bus
pub struct Mpu6886<'d, T: Instance> {
    i2c: I2c<'d, T, Async>,
    initialized: bool,
}

impl<'d, T: Instance> Mpu6886<'d, T> {
    /// Probe and configure the sensor
    pub async fn new(i2c: I2c<'d, T, Async>) -> Result<Self, ImuError> {
        let mut driver = Self {
            i2c,
            initialized: false,
        };
        driver.init().await?;
        Ok(driver)
    }

    async fn init(&mut self) -> Result<(), ImuError> {
        let whoami = self.read_register(regs::WHO_AM_I).await?;
        if whoami != regs::WHO_AM_I_VALUE {
            crate::log_error!("unexpected WHO_AM_I: {:#x}", whoami);
            return Err(ImuError::NotInitialized);
        }

        // Reset, then wake with the gyro PLL as clock source
        self.write_register(regs::PWR_MGMT_1, 0x80).await?;
        Timer::after(Duration::from_millis(10)).await;
        self.write_register(regs::PWR_MGMT_1, 0x01).await?;
        Timer::after(Duration::from_millis(10)).await;

        // DLPF on, 1 kHz internal rate divided down to 200 Hz
        self.write_register(regs::CONFIG, 0x01).await?;
        self.write_register(regs::SMPLRT_DIV, 0x04).await?;

        // ±2000 dps, ±8 g — the scale constants above must match
        self.write_register(regs::GYRO_CONFIG, 0x18).await?;
        self.write_register(regs::ACCEL_CONFIG, 0x10).await?;

        self.initialized = true;
        crate::log_info!("MPU-6886 initialized");
        Ok(())
    }

    async fn read_register(&mut self, reg: u8) -> Result<u8, ImuError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(MPU6886_ADDR, &[reg], &mut buf)
            .await
            .map_err(|_| ImuError::Bus)?;
        Ok(buf[0])
    }

    async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), ImuError> {
        self.i2c
            .write(MPU6886_ADDR, &[reg, value])
            .await
            .map_err(|_| ImuError::Bus)
    }
}

impl<'d, T: Instance> InertialSensor for Mpu6886<'d, T> {
    async fn read_raw(&mut self) -> Result<RawInertialSample, ImuError> {
        if !self.initialized {
            return Err(ImuError::NotInitialized);
        }

        // Burst read: accel (6), temperature (2), gyro (6)
        let mut buf = [0u8; 14];
        self.i2c
            .write_read(MPU6886_ADDR, &[regs::ACCEL_XOUT_H], &mut buf)
            .await
            .map_err(|_| ImuError::Bus)?;

        let word = |hi: usize| i16::from_be_bytes([buf[hi], buf[hi + 1]]) as f32;

        Ok(RawInertialSample {
            accel_g: Vector3::new(
                word(0) * ACCEL_SCALE_G,
                word(2) * ACCEL_SCALE_G,
                word(4) * ACCEL_SCALE_G,
            ),
            gyro_dps: Vector3::new(
                word(8) * GYRO_SCALE_DPS,
                word(10) * GYRO_SCALE_DPS,
                word(12) * GYRO_SCALE_DPS,
            ),
        })
    }
}

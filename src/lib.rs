#![cfg_attr(not(test), no_std)]

//! tilt_link - Sensor-fusion and telemetry firmware for a motion-sensing handheld
//!
//! Samples a 6-axis IMU at 200 Hz, fuses the readings into an orientation
//! quaternion with a Mahony filter, calibrates the gyro bias at first boot,
//! watches the buttons at 1 kHz, and streams tagged binary frames to a fixed
//! host over UDP.

// Platform abstraction layer (flash, board support)
pub mod platform;

// Sensor and input devices behind narrow traits
pub mod devices;

// Core systems: logging, periodic task pacing
pub mod core;

// Mahony filter, Euler projection, gyro calibration
pub mod fusion;

// Shared state between the periodic tasks
pub mod state;

// Calibration persistence
pub mod settings;

// Frame encoding and the transmitter task
pub mod telemetry;

//! Core infrastructure
//!
//! Logging macros and the periodic task scaffolding shared by every task in
//! the firmware.

pub mod logging;
pub mod scheduler;

//! Pico 2 W platform support
//!
//! Board-specific glue: CYW43439 WiFi bring-up, the UDP telemetry socket,
//! and the flash driver backing calibration persistence.

pub mod flash;
pub mod network;
pub mod udp;

pub use flash::Rp2350Flash;
pub use network::{join_network, NetworkConfig, WifiHardware};
pub use udp::UdpTelemetry;

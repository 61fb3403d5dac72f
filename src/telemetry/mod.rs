//! Session telemetry
//!
//! Encodes the shared state into tagged binary frames and streams them to the
//! receiving host, one frame per datagram, best effort. Loss is silent: there
//! are no acknowledgments, retries, or sequence numbers.

pub mod frame;
pub mod transmitter;
pub mod transport;

pub use frame::{DecodedFrame, Frame, FrameError, FrameKind};
pub use transmitter::{run_telemetry_task, transmit_cycle};
pub use transport::{TelemetryTransport, TransportError};

#[cfg(not(feature = "pico2_w"))]
pub use transport::MockTransport;

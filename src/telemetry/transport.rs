//! Datagram transport abstraction
//!
//! The transmitter only needs "send these bytes as one datagram, best
//! effort". The hardware implementation is a bound UDP socket aimed at the
//! configured host (`platform::rp2350::UdpTelemetry`); the mock records sent
//! frames for inspection in host tests.

use heapless::Vec;

use super::frame::MAX_FRAME_LEN;

/// Transport failure
///
/// Send failures are advisory only — telemetry is fire-and-forget and the
/// schedule carries on regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum TransportError {
    /// The datagram could not be handed to the network stack
    SendFailed,
}

/// One-way datagram sink toward the telemetry host
#[allow(async_fn_in_trait)]
pub trait TelemetryTransport {
    /// Send one frame as a single self-contained datagram
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;
}

/// Recording transport for host tests
#[cfg(not(feature = "pico2_w"))]
pub struct MockTransport {
    /// Frames handed to `send`, in order
    sent: Vec<Vec<u8, MAX_FRAME_LEN>, 32>,
    /// When true every send fails
    failing: bool,
}

#[cfg(not(feature = "pico2_w"))]
impl MockTransport {
    /// Create a transport that accepts every datagram
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            failing: false,
        }
    }

    /// Make subsequent sends fail (unreachable-destination simulation)
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Frames sent so far
    pub fn sent(&self) -> &[Vec<u8, MAX_FRAME_LEN>] {
        &self.sent
    }

    /// Drop the recorded frames
    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

#[cfg(not(feature = "pico2_w"))]
impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(feature = "pico2_w"))]
impl TelemetryTransport for MockTransport {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if self.failing {
            return Err(TransportError::SendFailed);
        }
        let mut copy = Vec::new();
        copy.extend_from_slice(frame)
            .map_err(|_| TransportError::SendFailed)?;
        self.sent.push(copy).map_err(|_| TransportError::SendFailed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_mock_records_frames_in_order() {
        let mut transport = MockTransport::new();
        block_on(transport.send(&[0x01, 0xAA])).unwrap();
        block_on(transport.send(&[0x02, 0xBB])).unwrap();

        assert_eq!(transport.sent().len(), 2);
        assert_eq!(transport.sent()[0].as_slice(), &[0x01, 0xAA]);
        assert_eq!(transport.sent()[1].as_slice(), &[0x02, 0xBB]);
    }

    #[test]
    fn test_mock_failure_mode() {
        let mut transport = MockTransport::new();
        transport.set_failing(true);
        assert_eq!(
            block_on(transport.send(&[0x01])),
            Err(TransportError::SendFailed)
        );
        assert!(transport.sent().is_empty());
    }
}

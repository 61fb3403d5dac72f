//! UDP telemetry socket
//!
//! A bound socket aimed at the fixed telemetry destination. Each frame goes
//! out as one datagram; there is no acknowledgment and no retry.

use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};

use crate::telemetry::{TelemetryTransport, TransportError};

/// UDP transport toward the telemetry host
pub struct UdpTelemetry<'a> {
    socket: UdpSocket<'a>,
    destination: IpEndpoint,
}

impl<'a> UdpTelemetry<'a> {
    /// Bind a socket and aim it at `destination`
    ///
    /// The buffers only need to cover a handful of in-flight frames; frames
    /// are small and sends complete quickly.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stack: Stack<'a>,
        local_port: u16,
        destination: IpEndpoint,
        rx_meta: &'a mut [PacketMetadata],
        rx_buffer: &'a mut [u8],
        tx_meta: &'a mut [PacketMetadata],
        tx_buffer: &'a mut [u8],
    ) -> Self {
        let mut socket = UdpSocket::new(stack, rx_meta, rx_buffer, tx_meta, tx_buffer);
        if socket.bind(local_port).is_err() {
            crate::log_error!("failed to bind UDP socket to port {}", local_port);
        } else {
            crate::log_info!("UDP socket bound to port {}", local_port);
        }
        Self {
            socket,
            destination,
        }
    }
}

impl TelemetryTransport for UdpTelemetry<'_> {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.socket
            .send_to(frame, self.destination)
            .await
            .map_err(|_| TransportError::SendFailed)
    }
}

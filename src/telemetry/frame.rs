//! Binary telemetry frames
//!
//! A frame is a one-byte kind tag followed by the payload verbatim. Floats
//! and integers are encoded little-endian — byte-identical to the ARM
//! target's native layout, which is what the receiving host expects. This is
//! a compatibility requirement, not a portable format.
//!
//! Payloads:
//! - IMU: the four quaternion components as `f32` (16 bytes)
//! - BUTTON: timestamp `u64` plus the button bitmask byte (9 bytes)

use heapless::Vec;
use nalgebra::Quaternion;

use crate::state::{ButtonEvent, ButtonMask, ImuSample};

/// Largest frame: IMU tag plus four floats
pub const MAX_FRAME_LEN: usize = 1 + 16;

const IMU_PAYLOAD_LEN: usize = 16;
const BUTTON_PAYLOAD_LEN: usize = 9;

/// Frame kind tag, the first byte on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum FrameKind {
    /// Quaternion sample
    Imu,
    /// Button edge
    Button,
}

impl FrameKind {
    /// Wire value of the tag
    pub const fn tag(self) -> u8 {
        match self {
            FrameKind::Imu => 0x01,
            FrameKind::Button => 0x02,
        }
    }

    /// Parse a wire tag
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(FrameKind::Imu),
            0x02 => Some(FrameKind::Button),
            _ => None,
        }
    }
}

/// Decode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Zero-length buffer
    Empty,
    /// Tag byte not a known kind
    UnknownKind(u8),
    /// Payload length does not match the kind
    Length { kind: FrameKind, len: usize },
}

/// Decoded frame contents
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedFrame {
    /// Quaternion sample (scalar-first)
    Imu { quat: Quaternion<f32> },
    /// Button edge
    Button {
        timestamp_ms: u64,
        buttons: ButtonMask,
    },
}

/// One encoded frame, sent as a single datagram
pub struct Frame {
    buf: Vec<u8, MAX_FRAME_LEN>,
}

impl Frame {
    /// Encode an IMU sample: tag ++ q0..q3 little-endian
    pub fn imu(sample: &ImuSample) -> Self {
        let mut buf = Vec::new();
        let _ = buf.push(FrameKind::Imu.tag());
        for component in [
            sample.quat.w,
            sample.quat.i,
            sample.quat.j,
            sample.quat.k,
        ] {
            let _ = buf.extend_from_slice(&component.to_le_bytes());
        }
        Self { buf }
    }

    /// Encode a button event: tag ++ timestamp ++ mask
    pub fn button(event: &ButtonEvent) -> Self {
        let mut buf = Vec::new();
        let _ = buf.push(FrameKind::Button.tag());
        let _ = buf.extend_from_slice(&event.timestamp_ms.to_le_bytes());
        let _ = buf.push(event.buttons.bits());
        Self { buf }
    }

    /// Wire bytes, tag first
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Total frame length (tag plus payload)
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// A frame always carries at least its tag
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Decode a received frame back into its contents
    pub fn decode(bytes: &[u8]) -> Result<DecodedFrame, FrameError> {
        let (&tag, payload) = bytes.split_first().ok_or(FrameError::Empty)?;
        let kind = FrameKind::from_tag(tag).ok_or(FrameError::UnknownKind(tag))?;

        match kind {
            FrameKind::Imu => {
                if payload.len() != IMU_PAYLOAD_LEN {
                    return Err(FrameError::Length {
                        kind,
                        len: payload.len(),
                    });
                }
                let mut components = [0.0_f32; 4];
                for (i, chunk) in payload.chunks_exact(4).enumerate() {
                    components[i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                }
                Ok(DecodedFrame::Imu {
                    quat: Quaternion::new(
                        components[0],
                        components[1],
                        components[2],
                        components[3],
                    ),
                })
            }
            FrameKind::Button => {
                if payload.len() != BUTTON_PAYLOAD_LEN {
                    return Err(FrameError::Length {
                        kind,
                        len: payload.len(),
                    });
                }
                let mut ts = [0u8; 8];
                ts.copy_from_slice(&payload[..8]);
                Ok(DecodedFrame::Button {
                    timestamp_ms: u64::from_le_bytes(ts),
                    buttons: ButtonMask::from_bits_truncate(payload[8]),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn sample() -> ImuSample {
        ImuSample {
            gyro: Vector3::new(0.01, -0.02, 0.03),
            accel: Vector3::new(0.0, 0.1, 0.99),
            quat: Quaternion::new(0.7071, 0.0, 0.7071, 0.0),
            timestamp_ms: 123_456,
        }
    }

    #[test]
    fn test_imu_frame_layout() {
        let frame = Frame::imu(&sample());
        let bytes = frame.as_bytes();

        assert_eq!(bytes.len(), 17);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..5], &0.7071_f32.to_le_bytes());
        assert_eq!(&bytes[5..9], &0.0_f32.to_le_bytes());
    }

    #[test]
    fn test_imu_round_trip() {
        let sample = sample();
        let frame = Frame::imu(&sample);

        match Frame::decode(frame.as_bytes()).unwrap() {
            DecodedFrame::Imu { quat } => assert_eq!(quat, sample.quat),
            other => panic!("wrong kind: {:?}", other),
        }

        // Re-encoding the decoded contents yields identical bytes
        let again = Frame::imu(&sample);
        assert_eq!(frame.as_bytes(), again.as_bytes());
    }

    #[test]
    fn test_button_round_trip() {
        let event = ButtonEvent {
            timestamp_ms: 0xDEAD_BEEF_0042,
            buttons: ButtonMask::PRIMARY | ButtonMask::SECONDARY,
            dirty: true,
        };
        let frame = Frame::button(&event);
        assert_eq!(frame.len(), 10);
        assert_eq!(frame.as_bytes()[0], 0x02);

        match Frame::decode(frame.as_bytes()).unwrap() {
            DecodedFrame::Button {
                timestamp_ms,
                buttons,
            } => {
                assert_eq!(timestamp_ms, event.timestamp_ms);
                assert_eq!(buttons, event.buttons);
            }
            other => panic!("wrong kind: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert_eq!(Frame::decode(&[]), Err(FrameError::Empty));
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        assert_eq!(Frame::decode(&[0x7F, 0, 0]), Err(FrameError::UnknownKind(0x7F)));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let frame = Frame::imu(&sample());
        let truncated = &frame.as_bytes()[..10];
        assert!(matches!(
            Frame::decode(truncated),
            Err(FrameError::Length {
                kind: FrameKind::Imu,
                len: 9
            })
        ));
    }

    #[test]
    fn test_tag_round_trip() {
        for kind in [FrameKind::Imu, FrameKind::Button] {
            assert_eq!(FrameKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(FrameKind::from_tag(0x00), None);
    }
}

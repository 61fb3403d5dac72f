//! Calibration persistence
//!
//! The gyro bias measured at first boot is stored in a dedicated flash block
//! so later boots skip the calibration phase. The block carries a magic tag,
//! a format version, the three offsets, and a CRC32; anything that fails
//! validation reads as "no stored calibration" and the device calibrates
//! again.
//!
//! Block layout:
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Magic: [u8; 4] = b"TILT"           │  Offset: 0
//! ├────────────────────────────────────┤
//! │ Version: u32 = 1                   │  Offset: 4
//! ├────────────────────────────────────┤
//! │ Gyro offset x, y, z: 3 × f32       │  Offset: 8
//! ├────────────────────────────────────┤
//! │ CRC32 (ISO HDLC) of bytes 0..20    │  Offset: 20
//! └────────────────────────────────────┘
//! ```

use nalgebra::Vector3;

use crate::platform::traits::FlashInterface;
use crate::platform::Result;

/// Flash address of the settings block (first block past the firmware)
const SETTINGS_BLOCK_ADDR: u32 = 0x0004_0000;

/// Erase granularity of the backing flash
const SETTINGS_ERASE_LEN: u32 = 4096;

/// Magic tag identifying a settings block
const SETTINGS_MAGIC: [u8; 4] = *b"TILT";

/// Settings format version
const SETTINGS_VERSION: u32 = 1;

/// Encoded block length
const BLOCK_LEN: usize = 24;

/// Persisted calibration values
///
/// `load` and `save` each wrap one complete open/commit scope around the
/// flash access; nothing holds the flash between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSettings {
    /// Gyro bias to install at boot (degrees per second)
    pub gyro_offset: Vector3<f32>,
}

impl CalibrationSettings {
    /// Read the stored calibration
    ///
    /// `Ok(None)` when no valid block exists (missing, corrupt, or from a
    /// different format version) — the caller should run calibration.
    pub fn load<F: FlashInterface>(flash: &mut F) -> Result<Option<Self>> {
        let mut buf = [0u8; BLOCK_LEN];
        flash.read(SETTINGS_BLOCK_ADDR, &mut buf)?;
        Ok(Self::decode(&buf))
    }

    /// Persist the calibration, replacing any previous block
    pub fn save<F: FlashInterface>(&self, flash: &mut F) -> Result<()> {
        let buf = self.encode();
        flash.erase(SETTINGS_BLOCK_ADDR, SETTINGS_ERASE_LEN)?;
        flash.write(SETTINGS_BLOCK_ADDR, &buf)?;
        Ok(())
    }

    fn encode(&self) -> [u8; BLOCK_LEN] {
        let mut buf = [0u8; BLOCK_LEN];
        buf[0..4].copy_from_slice(&SETTINGS_MAGIC);
        buf[4..8].copy_from_slice(&SETTINGS_VERSION.to_le_bytes());
        buf[8..12].copy_from_slice(&self.gyro_offset.x.to_le_bytes());
        buf[12..16].copy_from_slice(&self.gyro_offset.y.to_le_bytes());
        buf[16..20].copy_from_slice(&self.gyro_offset.z.to_le_bytes());

        let crc = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC).checksum(&buf[0..20]);
        buf[20..24].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    fn decode(buf: &[u8; BLOCK_LEN]) -> Option<Self> {
        if buf[0..4] != SETTINGS_MAGIC {
            return None;
        }

        let version = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        if version != SETTINGS_VERSION {
            return None;
        }

        let stored_crc = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);
        let calculated = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC).checksum(&buf[0..20]);
        if stored_crc != calculated {
            return None;
        }

        let field = |at: usize| f32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        Some(Self {
            gyro_offset: Vector3::new(field(8), field(12), field(16)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;

    #[test]
    fn test_round_trip() {
        let mut flash = MockFlash::new();
        let settings = CalibrationSettings {
            gyro_offset: Vector3::new(0.42, -1.7, 0.003),
        };

        settings.save(&mut flash).unwrap();
        let loaded = CalibrationSettings::load(&mut flash).unwrap();

        assert_eq!(loaded, Some(settings));
    }

    #[test]
    fn test_blank_flash_reads_as_uncalibrated() {
        let mut flash = MockFlash::new();
        assert_eq!(CalibrationSettings::load(&mut flash).unwrap(), None);
    }

    #[test]
    fn test_corrupt_block_reads_as_uncalibrated() {
        let mut flash = MockFlash::new();
        let settings = CalibrationSettings {
            gyro_offset: Vector3::new(1.0, 2.0, 3.0),
        };
        settings.save(&mut flash).unwrap();

        // Flip a payload byte: the CRC check must reject the block
        flash.corrupt(SETTINGS_BLOCK_ADDR + 9);
        assert_eq!(CalibrationSettings::load(&mut flash).unwrap(), None);
    }

    #[test]
    fn test_save_replaces_previous_block() {
        let mut flash = MockFlash::new();
        CalibrationSettings {
            gyro_offset: Vector3::new(1.0, 1.0, 1.0),
        }
        .save(&mut flash)
        .unwrap();
        let newer = CalibrationSettings {
            gyro_offset: Vector3::new(-0.5, 0.25, 0.125),
        };
        newer.save(&mut flash).unwrap();

        assert_eq!(CalibrationSettings::load(&mut flash).unwrap(), Some(newer));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut flash = MockFlash::new();
        let settings = CalibrationSettings {
            gyro_offset: Vector3::new(1.0, 2.0, 3.0),
        };
        let mut buf = settings.encode();
        buf[4] = 0xFE; // bogus version
        let crc = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC).checksum(&buf[0..20]);
        buf[20..24].copy_from_slice(&crc.to_le_bytes());

        flash.erase(SETTINGS_BLOCK_ADDR, SETTINGS_ERASE_LEN).unwrap();
        flash.write(SETTINGS_BLOCK_ADDR, &buf).unwrap();

        assert_eq!(CalibrationSettings::load(&mut flash).unwrap(), None);
    }
}

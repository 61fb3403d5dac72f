//! RP2350 Flash driver
//!
//! Blocking flash access for the settings block. Operations stall XIP for
//! their duration (100 ms+ for an erase), which is acceptable here: the only
//! writer runs once, right after calibration converges.

use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use crate::platform::error::FlashError;
use crate::platform::traits::FlashInterface;
use crate::platform::Result;

/// Total flash capacity of the Pico 2 W
pub const FLASH_CAPACITY: usize = 4 * 1024 * 1024;

/// Protected firmware region (first 256 KB)
const FIRMWARE_SIZE: u32 = 0x40000;

/// On-board QSPI flash
pub struct Rp2350Flash<'d> {
    inner: Flash<'d, FLASH, Blocking, FLASH_CAPACITY>,
}

impl<'d> Rp2350Flash<'d> {
    /// Take ownership of the flash peripheral
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            inner: Flash::new_blocking(flash),
        }
    }
}

impl FlashInterface for Rp2350Flash<'_> {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        self.inner
            .blocking_read(address, buf)
            .map_err(|_| FlashError::ReadFailed.into())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if address < FIRMWARE_SIZE {
            return Err(FlashError::InvalidAddress.into());
        }
        self.inner
            .blocking_write(address, data)
            .map_err(|_| FlashError::WriteFailed.into())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if address < FIRMWARE_SIZE {
            return Err(FlashError::InvalidAddress.into());
        }
        self.inner
            .blocking_erase(address, address + size)
            .map_err(|_| FlashError::EraseFailed.into())
    }
}

//! FocalTech FT5x06 capacitive touch controller (polled over I²C).

use embedded_hal::i2c::I2c;

use standby_watch::ui::input::{decode_touch, TOUCH_FRAME_LEN, TOUCH_STATUS_REG};
use standby_watch::{Error, Result};

#[derive(Copy, Clone, Debug)]
#[repr(u8)]
enum Register {
    DeviceMode = 0x00,
    Threshold = 0x80,
    InterruptMode = 0xA4,
    VendorId = 0xA8,
}

/// Touch detection threshold (controller default is 0x80; lower is more sensitive).
const THRESHOLD: u8 = 0x28;

pub struct Ft5x06<I> {
    address: u8,
    i2c: I,
    frame: [u8; TOUCH_FRAME_LEN],
}

impl<I: I2c> Ft5x06<I> {
    pub fn new(address: u8, i2c: I) -> Self {
        Self {
            address,
            i2c,
            frame: [0; TOUCH_FRAME_LEN],
        }
    }

    /// Put the controller in normal operating mode.
    pub fn init(&mut self) -> Result<()> {
        let vendor = self.read_register(Register::VendorId)?;
        defmt::info!("FT5x06 vendor id 0x{:02x}", vendor);
        self.write_register(Register::DeviceMode, 0x00)?;
        self.write_register(Register::Threshold, THRESHOLD)?;
        // Polling mode: INT stays asserted while touched
        self.write_register(Register::InterruptMode, 0x00)?;
        Ok(())
    }

    /// Current raw (portrait) touch point, if the panel is touched.
    pub fn read(&mut self) -> Result<Option<(u16, u16)>> {
        self.i2c
            .write_read(self.address, &[TOUCH_STATUS_REG], &mut self.frame)
            .map_err(|_| Error::Touch)?;
        Ok(decode_touch(&self.frame))
    }

    fn read_register(&mut self, register: Register) -> Result<u8> {
        let mut rx = [0_u8; 1];
        self.i2c
            .write_read(self.address, &[register as u8], &mut rx)
            .map_err(|_| Error::Touch)?;
        Ok(rx[0])
    }

    fn write_register(&mut self, register: Register, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[register as u8, value])
            .map_err(|_| Error::Touch)
    }
}

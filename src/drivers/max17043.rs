//! MAX17043 single-cell LiPo fuel gauge.
//!
//! Two read-only registers are used, both big-endian 16-bit:
//!
//! - VCELL (0x02): 12-bit cell voltage in the upper bits, 1.25 mV/LSB.
//! - SOC   (0x04): high byte = whole percent, low byte = 1/256 percent.
//!
//! The gauge updates VCELL every 500 ms and SOC on its own ModelGauge
//! schedule, so a value may be up to one sample interval stale.

use embedded_hal::i2c::{Error as _, I2c};

use crate::error::GaugeError;

/// Fixed 7-bit bus address.
pub const MAX17043_ADDR: u8 = 0x36;

pub const REG_VCELL: u8 = 0x02;
pub const REG_SOC: u8 = 0x04;

const VCELL_VOLTS_PER_LSB: f32 = 0.001_25;

pub struct Max17043<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Max17043<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Cell voltage in volts.
    pub fn cell_voltage(&mut self) -> Result<f32, GaugeError> {
        let [msb, lsb] = self.read_word(REG_VCELL)?;
        let raw = (u16::from(msb) << 4) | (u16::from(lsb) >> 4);
        Ok(f32::from(raw) * VCELL_VOLTS_PER_LSB)
    }

    /// State of charge in percent.
    pub fn state_of_charge(&mut self) -> Result<f32, GaugeError> {
        let [msb, lsb] = self.read_word(REG_SOC)?;
        Ok(f32::from(msb) + f32::from(lsb) / 256.0)
    }

    fn read_word(&mut self, reg: u8) -> Result<[u8; 2], GaugeError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(MAX17043_ADDR, &[reg], &mut buf)
            .map_err(|e| GaugeError::Bus(e.kind()))?;
        Ok(buf)
    }
}

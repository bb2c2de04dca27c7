//! ADXL362 ultra-low-power 3-axis accelerometer, register-level driver.
//!
//! Talks to the part over any [`embedded_hal::spi::SpiDevice`] (chip
//! select is owned by the device implementation).  Every register access
//! is a single transaction:
//!
//! ```text
//!  write:  [0x0A, addr, data0, data1, ...]
//!  read:   [0x0B, addr] then clock out N bytes
//! ```
//!
//! Only the subset needed for activity/inactivity wake is implemented:
//! soft reset, STATUS, and the threshold / timer / control registers.

use embedded_hal::spi::{Error as _, Operation, SpiDevice};
use serde::Serialize;

use crate::config::SensorThresholds;
use crate::error::SensorError;

// ── SPI commands ──────────────────────────────────────────────

const CMD_WRITE: u8 = 0x0A;
const CMD_READ: u8 = 0x0B;

// ── Register map ──────────────────────────────────────────────

pub const REG_DEVID_AD: u8 = 0x00;
pub const REG_STATUS: u8 = 0x0B;
pub const REG_SOFT_RESET: u8 = 0x1F;
pub const REG_THRESH_ACT_L: u8 = 0x20;
pub const REG_THRESH_INACT_L: u8 = 0x23;
pub const REG_TIME_INACT_L: u8 = 0x25;
pub const REG_ACT_INACT_CTL: u8 = 0x27;
pub const REG_INTMAP1: u8 = 0x2A;
pub const REG_FILTER_CTL: u8 = 0x2C;
pub const REG_POWER_CTL: u8 = 0x2D;

/// Analog Devices ID in DEVID_AD.
pub const DEVID_AD_VALUE: u8 = 0xAD;
/// Writing ASCII 'R' to SOFT_RESET resets the part.
pub const SOFT_RESET_KEY: u8 = 0x52;

// ── STATUS bits ───────────────────────────────────────────────

/// Set while the part is in the "awake" (moving) half of the loop.
pub const STATUS_AWAKE: u8 = 0x40;

/// Thresholds are 11-bit unsigned.
pub const THRESHOLD_MAX: u16 = 0x07FF;

// ───────────────────────────────────────────────────────────────
// Field encodings
// ───────────────────────────────────────────────────────────────

/// Measurement range, FILTER_CTL bits 7:6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Range {
    G2,
    G4,
    G8,
}

impl Range {
    const fn bits(self) -> u8 {
        match self {
            Self::G2 => 0b00 << 6,
            Self::G4 => 0b01 << 6,
            Self::G8 => 0b10 << 6,
        }
    }
}

/// Output data rate, FILTER_CTL bits 2:0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputDataRate {
    Hz12_5,
    Hz25,
    Hz50,
    Hz100,
    Hz200,
    Hz400,
}

impl OutputDataRate {
    const fn bits(self) -> u8 {
        match self {
            Self::Hz12_5 => 0b000,
            Self::Hz25 => 0b001,
            Self::Hz50 => 0b010,
            Self::Hz100 => 0b011,
            Self::Hz200 => 0b100,
            Self::Hz400 => 0b101,
        }
    }
}

/// Activity/inactivity linking, ACT_INACT_CTL bits 5:4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkMode {
    /// Activity and inactivity detected independently.
    Default,
    /// Each event must be acknowledged by reading STATUS.
    Linked,
    /// Autonomous toggling between awake and asleep, no host service.
    Loop,
}

impl LinkMode {
    const fn bits(self) -> u8 {
        match self {
            Self::Default => 0b00 << 4,
            Self::Linked => 0b01 << 4,
            Self::Loop => 0b11 << 4,
        }
    }
}

/// Register image produced by a [`SensorThresholds`] set.
///
/// Computing it separately from the bus writes keeps `configure()`
/// deterministic: the same thresholds always yield the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterImage {
    pub filter_ctl: u8,
    pub thresh_act: [u8; 2],
    pub thresh_inact: [u8; 2],
    pub time_inact: [u8; 2],
    pub act_inact_ctl: u8,
    pub intmap1: u8,
    pub power_ctl: u8,
}

impl RegisterImage {
    pub fn from_thresholds(t: &SensorThresholds) -> Self {
        let filter_ctl = t.range.bits() | (u8::from(t.half_bandwidth) << 4) | t.odr.bits();

        let act_inact_ctl = t.link_mode.bits()
            | (u8::from(t.inactivity_referenced) << 3)
            | (u8::from(t.inactivity_enabled) << 2)
            | (u8::from(t.activity_referenced) << 1)
            | u8::from(t.activity_enabled);

        // MEASURE = 0b10 (measurement mode), AUTOSLEEP = bit 2.
        let power_ctl = (u8::from(t.autosleep) << 2) | 0b10;

        Self {
            filter_ctl,
            thresh_act: split_threshold(t.activity_threshold),
            thresh_inact: split_threshold(t.inactivity_threshold),
            time_inact: t.inactivity_samples.to_le_bytes(),
            act_inact_ctl,
            intmap1: t.interrupt_map,
            power_ctl,
        }
    }
}

/// 11-bit threshold → (L, H) register pair.  Out-of-range values saturate.
fn split_threshold(value: u16) -> [u8; 2] {
    let v = value.min(THRESHOLD_MAX);
    [(v & 0xFF) as u8, ((v >> 8) & 0x07) as u8]
}

// ───────────────────────────────────────────────────────────────
// Driver
// ───────────────────────────────────────────────────────────────

pub struct Adxl362<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Adxl362<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Give the bus device back (e.g. to share it after teardown).
    pub fn release(self) -> SPI {
        self.spi
    }

    pub fn bus_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Read DEVID_AD and check it against the ADXL362 signature.
    pub fn verify_id(&mut self) -> Result<(), SensorError> {
        let id = self.device_id()?;
        if id == DEVID_AD_VALUE {
            Ok(())
        } else {
            Err(SensorError::UnknownDevice(id))
        }
    }

    pub fn device_id(&mut self) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.read_regs(REG_DEVID_AD, &mut buf)?;
        Ok(buf[0])
    }

    /// Fire-and-forget soft reset.  The part needs ~0.5 ms before it
    /// answers again; poll [`read_status`](Self::read_status).
    pub fn soft_reset(&mut self) -> Result<(), SensorError> {
        self.write_regs(REG_SOFT_RESET, &[SOFT_RESET_KEY])
    }

    pub fn read_status(&mut self) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.read_regs(REG_STATUS, &mut buf)?;
        Ok(buf[0])
    }

    /// Apply the complete activity/inactivity configuration.
    ///
    /// POWER_CTL is written last: the part starts measuring the moment the
    /// MEASURE bits are set, so every threshold must already be in place.
    pub fn configure(&mut self, thresholds: &SensorThresholds) -> Result<(), SensorError> {
        let img = RegisterImage::from_thresholds(thresholds);

        self.write_regs(REG_FILTER_CTL, &[img.filter_ctl])?;
        self.write_regs(REG_THRESH_ACT_L, &img.thresh_act)?;
        self.write_regs(REG_THRESH_INACT_L, &img.thresh_inact)?;
        self.write_regs(REG_TIME_INACT_L, &img.time_inact)?;
        self.write_regs(REG_ACT_INACT_CTL, &[img.act_inact_ctl])?;
        self.write_regs(REG_INTMAP1, &[img.intmap1])?;
        self.write_regs(REG_POWER_CTL, &[img.power_ctl])?;
        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────

    fn write_regs(&mut self, addr: u8, data: &[u8]) -> Result<(), SensorError> {
        self.spi
            .transaction(&mut [Operation::Write(&[CMD_WRITE, addr]), Operation::Write(data)])
            .map_err(|e| SensorError::Bus(e.kind()))
    }

    fn read_regs(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.spi
            .transaction(&mut [Operation::Write(&[CMD_READ, addr]), Operation::Read(buf)])
            .map_err(|e| SensorError::Bus(e.kind()))
    }
}

//! Unified error types for the AccelWake firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! bring-up error handling uniform.  All variants are `Copy` so drivers
//! and adapters can pass them around without allocation.
//!
//! Note that the wake/sleep FSM itself never sees these: the board adapter
//! absorbs sensor and gauge failures, and publish failures are reported as
//! events only.

use core::fmt;

use embedded_hal::{i2c, spi};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The accelerometer could not be reached or identified.
    Sensor(SensorError),
    /// The fuel gauge could not be read.
    Gauge(GaugeError),
    /// The cloud publisher refused an event.
    Publish(PublishError),
    /// A start-up check (configuration, peripheral bring-up) failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Gauge(e) => write!(f, "gauge: {e}"),
            Self::Publish(e) => write!(f, "publish: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Accelerometer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// SPI transaction failed.
    Bus(spi::ErrorKind),
    /// DEVID_AD returned something other than the ADXL362 signature.
    UnknownDevice(u8),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "SPI bus error ({kind})"),
            Self::UnknownDevice(id) => write!(f, "unexpected device id 0x{id:02X}"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Fuel gauge errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeError {
    /// I2C transaction failed.
    Bus(i2c::ErrorKind),
}

impl fmt::Display for GaugeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "I2C bus error ({kind})"),
        }
    }
}

impl From<GaugeError> for Error {
    fn from(e: GaugeError) -> Self {
        Self::Gauge(e)
    }
}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// Called while the cloud session is down.
    NotConnected,
    /// Payload does not fit the fixed-size event buffer.
    PayloadTooLong,
    /// The transport refused to enqueue the message.
    Rejected,
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "cloud not connected"),
            Self::PayloadTooLong => write!(f, "payload too long"),
            Self::Rejected => write!(f, "publish rejected by transport"),
        }
    }
}

impl From<PublishError> for Error {
    fn from(e: PublishError) -> Self {
        Self::Publish(e)
    }
}

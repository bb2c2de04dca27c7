//! GPIO / peripheral pin assignments for the AccelWake board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// ADXL362 accelerometer (SPI2 / FSPI)
// ---------------------------------------------------------------------------

/// SPI clock.
pub const ACCEL_SCK_GPIO: i32 = 12;
/// Controller out → ADXL362 MOSI.
pub const ACCEL_MOSI_GPIO: i32 = 11;
/// ADXL362 MISO → controller in.
pub const ACCEL_MISO_GPIO: i32 = 13;
/// Chip select (active LOW).
pub const ACCEL_CS_GPIO: i32 = 10;
/// INT1: the AWAKE status bit is routed here.  RTC-capable so it can wake
/// the SoC from light sleep.
pub const ACCEL_INT1_GPIO: i32 = 4;

/// SPI clock for the accelerometer.  The ADXL362 tolerates up to 8 MHz;
/// 1 MHz keeps edges clean on the breakout wiring.
pub const ACCEL_SPI_BAUD_HZ: u32 = 1_000_000;

// ---------------------------------------------------------------------------
// MAX17043 fuel gauge (I2C0)
// ---------------------------------------------------------------------------

pub const GAUGE_SDA_GPIO: i32 = 8;
pub const GAUGE_SCL_GPIO: i32 = 9;
pub const GAUGE_I2C_BAUD_HZ: u32 = 100_000;

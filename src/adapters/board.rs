//! Hardware adapter: bridges real peripherals to the domain port traits.
//!
//! [`DeviceBoard`] owns the accelerometer and fuel-gauge drivers plus the
//! cloud, sleep and clock adapters, and exposes all of them as one
//! [`Board`](crate::app::ports::Board).  This is the only place driver
//! `Result`s are absorbed: the FSM never sees a bus error.
//!
//! | Port         | Backed by                      | On driver error            |
//! |--------------|--------------------------------|----------------------------|
//! | SensorPort   | `Adxl362` over SPI             | not ready / no activity    |
//! | PowerPort    | `Max17043` over I2C            | last good reading          |
//! | PublishPort  | `CloudPublisher`               | `PublishError` returned    |
//! | SleepPort    | `SleepAdapter`                 | —                          |
//! | ClockPort    | `Esp32TimeAdapter`             | —                          |

use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;
use log::{info, warn};

use crate::adapters::cloud::CloudPublisher;
use crate::adapters::sleep::SleepAdapter;
use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{
    ClockPort, PowerPort, PublishPort, PublishRequest, SensorPort, SleepPort, WakeCause,
};
use crate::config::{SensorThresholds, WakeSource};
use crate::drivers::adxl362::{Adxl362, STATUS_AWAKE};
use crate::drivers::max17043::Max17043;
use crate::error::PublishError;

/// Concrete adapter that combines all hardware behind port traits.
pub struct DeviceBoard<SPI, I2C> {
    accel: Adxl362<SPI>,
    gauge: Max17043<I2C>,
    cloud: CloudPublisher,
    sleep: SleepAdapter,
    clock: Esp32TimeAdapter,
    last_voltage: f32,
    last_soc: f32,
}

impl<SPI: SpiDevice, I2C: I2c> DeviceBoard<SPI, I2C> {
    /// Assemble the board.  The accelerometer's device ID is checked but a
    /// failed ID check only warns: a silent sensor shows up later as a stalled
    /// reset wait.
    pub fn new(
        spi: SPI,
        i2c: I2C,
        cloud: CloudPublisher,
        sleep: SleepAdapter,
        clock: Esp32TimeAdapter,
    ) -> Self {
        let mut accel = Adxl362::new(spi);
        match accel.verify_id() {
            Ok(()) => info!("Board: ADXL362 present"),
            Err(e) => warn!("Board: accelerometer ID check failed ({}), continuing", e),
        }

        Self {
            accel,
            gauge: Max17043::new(i2c),
            cloud,
            sleep,
            clock,
            last_voltage: 0.0,
            last_soc: 0.0,
        }
    }

    #[cfg(test)]
    pub(crate) fn cloud_mut(&mut self) -> &mut CloudPublisher {
        &mut self.cloud
    }

    #[cfg(test)]
    pub(crate) fn accel_bus(&mut self) -> &mut SPI {
        self.accel.bus_mut()
    }

    #[cfg(test)]
    pub(crate) fn gauge_bus(&mut self) -> &mut I2C {
        self.gauge.bus_mut()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<SPI: SpiDevice, I2C: I2c> SensorPort for DeviceBoard<SPI, I2C> {
    fn reset(&mut self) {
        if let Err(e) = self.accel.soft_reset() {
            warn!("Board: accelerometer reset failed: {}", e);
        }
    }

    fn ready(&mut self) -> bool {
        match self.accel.read_status() {
            Ok(status) => status != 0,
            Err(e) => {
                warn!("Board: status read failed: {}", e);
                false
            }
        }
    }

    fn configure(&mut self, thresholds: &SensorThresholds) {
        if let Err(e) = self.accel.configure(thresholds) {
            warn!("Board: accelerometer configuration incomplete: {}", e);
        }
    }

    fn wake_signal_present(&mut self) -> bool {
        match self.accel.read_status() {
            Ok(status) => status & STATUS_AWAKE != 0,
            Err(e) => {
                warn!("Board: status read failed, assuming no activity: {}", e);
                false
            }
        }
    }
}

// ── PowerPort implementation ──────────────────────────────────

impl<SPI: SpiDevice, I2C: I2c> PowerPort for DeviceBoard<SPI, I2C> {
    fn cell_voltage(&mut self) -> f32 {
        match self.gauge.cell_voltage() {
            Ok(v) => self.last_voltage = v,
            Err(e) => warn!("Board: VCELL read failed, reusing {:.2} V: {}", self.last_voltage, e),
        }
        self.last_voltage
    }

    fn state_of_charge(&mut self) -> f32 {
        match self.gauge.state_of_charge() {
            Ok(soc) => self.last_soc = soc,
            Err(e) => warn!("Board: SOC read failed, reusing {:.2} %: {}", self.last_soc, e),
        }
        self.last_soc
    }
}

// ── Pass-through ports ────────────────────────────────────────

impl<SPI, I2C> PublishPort for DeviceBoard<SPI, I2C> {
    fn is_connected(&self) -> bool {
        self.cloud.is_connected()
    }

    fn publish(&mut self, request: &PublishRequest<'_>) -> Result<(), PublishError> {
        self.cloud.publish(request)
    }
}

impl<SPI, I2C> SleepPort for DeviceBoard<SPI, I2C> {
    fn suspend_until(&mut self, source: &WakeSource) -> WakeCause {
        self.sleep.suspend_until(source)
    }
}

impl<SPI, I2C> ClockPort for DeviceBoard<SPI, I2C> {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

//! AccelWake Firmware: Main Entry Point
//!
//! Hexagonal architecture with a polled FSM and light-sleep suspension.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  DeviceBoard ─ Adxl362 (SPI) · Max17043 (I2C)                  │
//! │              ─ CloudPublisher (MQTT) · SleepAdapter · Esp32Time │
//! │  LogEventSink                                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          WakeController (pure logic, 6-state FSM)       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::spi::config::{Config as SpiConfig, DriverConfig as SpiDriverConfig};
use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use accelwake::adapters::board::DeviceBoard;
use accelwake::adapters::cloud::CloudPublisher;
use accelwake::adapters::log_sink::LogEventSink;
use accelwake::adapters::sleep::SleepAdapter;
use accelwake::adapters::time::Esp32TimeAdapter;
use accelwake::app::ports::ClockPort;
use accelwake::app::service::WakeController;
use accelwake::config::WakeConfig;
use accelwake::error::Error;
use accelwake::pins;

// ── Build-time endpoints ──────────────────────────────────────

const WIFI_SSID: &str = match option_env!("ACCELWAKE_WIFI_SSID") {
    Some(s) => s,
    None => "accelwake",
};
const WIFI_PASS: &str = match option_env!("ACCELWAKE_WIFI_PASS") {
    Some(s) => s,
    None => "",
};
const MQTT_URL: &str = match option_env!("ACCELWAKE_MQTT_URL") {
    Some(s) => s,
    None => "mqtt://broker.local:1883",
};
const DEVICE_ID: &str = match option_env!("ACCELWAKE_DEVICE_ID") {
    Some(s) => s,
    None => "accelwake-0",
};
const TOPIC_PREFIX: &str = match option_env!("ACCELWAKE_TOPIC_PREFIX") {
    Some(s) => s,
    None => "accelwake",
};

/// Minimum spacing between Wi-Fi reconnect attempts.
const WIFI_RETRY_MS: u64 = 5_000;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AccelWake v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = WakeConfig::default();
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config dump failed: {}", e),
    }
    config.validate().map_err(Error::Init)?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // SAFETY: each GPIO number in `pins` is claimed exactly once, here.
    let (sck, mosi, miso, cs, sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::ACCEL_SCK_GPIO),
            AnyIOPin::new(pins::ACCEL_MOSI_GPIO),
            AnyIOPin::new(pins::ACCEL_MISO_GPIO),
            AnyIOPin::new(pins::ACCEL_CS_GPIO),
            AnyIOPin::new(pins::GAUGE_SDA_GPIO),
            AnyIOPin::new(pins::GAUGE_SCL_GPIO),
        )
    };

    let spi_bus = SpiDriver::new(
        peripherals.spi2,
        sck,
        mosi,
        Some(miso),
        &SpiDriverConfig::new(),
    )?;
    let accel_spi = SpiDeviceDriver::new(
        spi_bus,
        Some(cs),
        &SpiConfig::new().baudrate(Hertz(pins::ACCEL_SPI_BAUD_HZ)),
    )?;
    let gauge_i2c = I2cDriver::new(
        peripherals.i2c0,
        sda,
        scl,
        &I2cConfig::new().baudrate(Hertz(pins::GAUGE_I2C_BAUD_HZ)),
    )?;

    // ── 4. Network ────────────────────────────────────────────
    let mut wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID
            .try_into()
            .map_err(|()| anyhow!("SSID longer than 32 bytes"))?,
        password: WIFI_PASS
            .try_into()
            .map_err(|()| anyhow!("password longer than 64 bytes"))?,
        auth_method: if WIFI_PASS.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;
    wifi.start()?;
    if let Err(e) = wifi.connect() {
        warn!("WiFi: initial connect failed ({}), will retry", e);
    }

    let cloud = CloudPublisher::connect(MQTT_URL, DEVICE_ID, TOPIC_PREFIX)?;

    // ── 5. Board + controller ─────────────────────────────────
    let mut board = DeviceBoard::new(
        accel_spi,
        gauge_i2c,
        cloud,
        SleepAdapter::new(),
        Esp32TimeAdapter::new(),
    );
    let mut sink = LogEventSink::new();
    let mut app = WakeController::new(config);
    app.start(&board, &mut sink);

    info!("System ready. Entering tick loop.");

    // ── 6. Tick loop ──────────────────────────────────────────
    let tick_ms = config.timing.tick_interval_ms;
    let mut last_wifi_attempt_ms = board.now_ms();

    loop {
        app.tick(&mut board, &mut sink);

        // Light sleep drops the association; rejoin in the background.
        let now = board.now_ms();
        if !wifi.is_connected().unwrap_or(false)
            && now.saturating_sub(last_wifi_attempt_ms) >= WIFI_RETRY_MS
        {
            last_wifi_attempt_ms = now;
            if let Err(e) = wifi.connect() {
                warn!("WiFi: reconnect failed: {}", e);
            }
        }

        FreeRtos::delay_ms(tick_ms);
    }
}

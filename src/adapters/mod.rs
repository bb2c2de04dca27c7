//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                   |
//! |------------|---------------------|-------------------------------|
//! | `board`    | SensorPort          | ADXL362 over SPI              |
//! |            | PowerPort           | MAX17043 over I2C             |
//! |            | (delegates the rest)|                               |
//! | `cloud`    | PublishPort         | MQTT broker                   |
//! | `sleep`    | SleepPort           | ESP32 light sleep (EXT0+timer)|
//! | `time`     | ClockPort           | ESP32 system timer            |
//! | `log_sink` | EventSink           | Serial log output             |

pub mod board;
pub mod cloud;
pub mod log_sink;
pub mod sleep;
pub mod time;

//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured wake events to the
//! ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::WakeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`WakeEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &WakeEvent) {
        match event {
            WakeEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            WakeEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            WakeEvent::SensorConfigured => {
                info!("SENSOR | configured, INT1 <- AWAKE");
            }
            WakeEvent::SensorStalled { waited_ms } => {
                warn!("SENSOR | no reset completion after {} ms", waited_ms);
            }
            WakeEvent::Published { payload } => {
                info!("PUBLISH | sent \"{}\"", payload);
            }
            WakeEvent::PublishFailed(e) => {
                warn!("PUBLISH | failed: {}", e);
            }
            WakeEvent::PublishDropped { waited_ms } => {
                warn!("PUBLISH | dropped after {} ms offline", waited_ms);
            }
            WakeEvent::Woke { cause, reason } => {
                info!("WAKE | cause={:?} reason={:?}", cause, reason);
            }
        }
    }
}

//! Port traits: the hexagonal boundary between the wake FSM and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ WakeController (domain)
//! ```
//!
//! Driven adapters (accelerometer, fuel gauge, cloud link, sleep controller,
//! clock, event sinks) implement these traits.  The
//! [`WakeController`](super::service::WakeController) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! The collaborators are passive: none of them knows the FSM exists.

use crate::config::{SensorThresholds, Visibility, WakeSource};
use crate::error::PublishError;

// ───────────────────────────────────────────────────────────────
// Sensor port (SensorController)
// ───────────────────────────────────────────────────────────────

/// Motion sensor control.  Adapters absorb bus failures: a failed read is
/// reported as "not ready" / "no activity", a failed write is logged.
pub trait SensorPort {
    /// Issue a soft reset.  Fire-and-forget.
    fn reset(&mut self);

    /// Non-blocking poll: has the sensor come back from reset?
    fn ready(&mut self) -> bool;

    /// Apply the full activity/inactivity configuration in one call.
    /// Applying the same thresholds twice leaves the sensor in the same state.
    fn configure(&mut self, thresholds: &SensorThresholds);

    /// Does the status register report the "awake" (activity) bit?
    fn wake_signal_present(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Power port (PowerMonitor)
// ───────────────────────────────────────────────────────────────

/// Battery gauge reads.  Pure, possibly stale by one gauge sample.
pub trait PowerPort {
    /// Cell voltage in volts.
    fn cell_voltage(&mut self) -> f32;

    /// State of charge in percent.
    fn state_of_charge(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Publish port (Publisher)
// ───────────────────────────────────────────────────────────────

/// One outbound cloud event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishRequest<'a> {
    pub label: &'a str,
    pub payload: &'a str,
    pub ttl_secs: u32,
    pub visibility: Visibility,
}

/// Cloud connectivity and best-effort publishing.
///
/// `publish` only enqueues; delivery happens after the call returns and is
/// not guaranteed.  The cloud side rate-limits to roughly one event per
/// second, which one publish per wake cycle never approaches.
pub trait PublishPort {
    fn is_connected(&self) -> bool;

    fn publish(&mut self, request: &PublishRequest<'_>) -> Result<(), PublishError>;
}

// ───────────────────────────────────────────────────────────────
// Sleep port (platform suspend)
// ───────────────────────────────────────────────────────────────

/// Why the platform resumed from suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCause {
    /// The configured pin edge fired.
    Pin,
    /// The maximum duration elapsed.
    Timer,
    /// Anything else the platform reports (debug UART, spurious).
    Other,
}

/// Process-wide low-power suspension.
pub trait SleepPort {
    /// Block the whole process until the pin edge or the duration cap,
    /// whichever comes first.
    fn suspend_until(&mut self, source: &WakeSource) -> WakeCause;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Board: everything the FSM touches
// ───────────────────────────────────────────────────────────────

/// The full set of collaborators one FSM tick may call.
///
/// Bundling them behind one bound avoids threading five separate `&mut`
/// borrows through every state handler.
pub trait Board: SensorPort + PowerPort + PublishPort + SleepPort + ClockPort {}

impl<T> Board for T where T: SensorPort + PowerPort + PublishPort + SleepPort + ClockPort {}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`WakeEvent`](super::events::WakeEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::WakeEvent);
}

//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the current time, the state-entry clock, the pending wake
//! reason, configuration, and the queue of outbound events.  Hardware is
//! not in here; handlers receive the board as a separate argument.

use log::warn;

use crate::app::events::WakeEvent;
use crate::config::WakeConfig;

/// Events a single tick may queue before the controller drains them.
pub const OUTBOX_CAP: usize = 4;

// ---------------------------------------------------------------------------
// StateClock
// ---------------------------------------------------------------------------

/// Timestamp (monotonic ms) recorded when the current state was entered.
/// Every elapsed-time guard is measured against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateClock {
    entered_ms: u64,
}

impl StateClock {
    pub fn mark(&mut self, now_ms: u64) {
        self.entered_ms = now_ms;
    }

    pub fn entered_ms(&self) -> u64 {
        self.entered_ms
    }

    /// Milliseconds since entry.  Saturates if the clock ever steps backwards.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.entered_ms)
    }
}

// ---------------------------------------------------------------------------
// WakeReason
// ---------------------------------------------------------------------------

/// Why the last suspension ended, as seen by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The accelerometer reported the AWAKE bit: the device moved.
    Activity,
    /// No activity bit: the battery-report timer ran out.
    Timeout,
}

impl WakeReason {
    pub fn is_activity(self) -> bool {
        self == Self::Activity
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Time of the current tick, sampled by the controller before dispatch.
    pub now_ms: u64,
    /// Entry time of the current state.  Stamped by the engine on transition.
    pub clock: StateClock,

    // -- Cycle state --
    /// Set on sleep exit, taken by the next publish.
    pub wake_reason: Option<WakeReason>,
    /// Completed sleep exits since boot.
    pub cycles: u32,
    /// The stall warning for the current reset has been raised.
    pub reset_stall_reported: bool,

    // -- Configuration --
    pub config: WakeConfig,

    // -- Outputs --
    /// Events for the controller to forward to the sink.
    pub outbox: heapless::Vec<WakeEvent, OUTBOX_CAP>,
}

impl FsmContext {
    pub fn new(config: WakeConfig) -> Self {
        Self {
            now_ms: 0,
            clock: StateClock::default(),
            wake_reason: None,
            cycles: 0,
            reset_stall_reported: false,
            config,
            outbox: heapless::Vec::new(),
        }
    }

    /// Milliseconds spent in the current state as of this tick.
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed_ms(self.now_ms)
    }

    /// Queue an event for the sink.
    pub fn post(&mut self, event: WakeEvent) {
        if let Err(dropped) = self.outbox.push(event) {
            warn!("FSM outbox full, dropping {:?}", dropped);
        }
    }
}

//! Outbound application events.
//!
//! The [`WakeController`](super::service::WakeController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  State handlers
//! queue them in the FSM context; the controller drains the queue after
//! every tick, then reports the transition itself.

use crate::error::PublishError;
use crate::fsm::StateId;
use crate::fsm::context::WakeReason;

use super::ports::WakeCause;
use super::telemetry::Payload;

/// Structured events emitted by the wake core.
#[derive(Debug, Clone, PartialEq)]
pub enum WakeEvent {
    /// The controller has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The sensor answered after reset and received its configuration.
    SensorConfigured,

    /// The sensor has not answered a reset for `waited_ms`.  Raised once per reset.
    SensorStalled { waited_ms: u64 },

    /// A battery/motion report was handed to the publisher.
    Published { payload: Payload },

    /// The publisher refused the report.  The cycle continues regardless.
    PublishFailed(PublishError),

    /// Connectivity never arrived; the report was dropped.
    PublishDropped { waited_ms: u64 },

    /// Suspension ended.
    Woke { cause: WakeCause, reason: WakeReason },
}

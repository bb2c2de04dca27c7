//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.  Update handlers are generic over the [`Board`] so the
//! same table drives real hardware and test doubles.
//!
//! ```text
//!  RESETTING ──[reset issued]──▶ AWAITING_RESET ──[status ≠ 0 / configure]──▶ BOOT_SETTLE
//!                                                                              │ [10 s]
//!                                                                              ▼
//!   ┌──[resume / read AWAKE]── SLEEPING ◀──[60 s, no cloud]── PUBLISHING ◀─────┘
//!   │                             ▲                              │ [connected / publish]
//!   │                             └────────[4 s]──── PUBLISH_SETTLE ◀┘
//!   └──────────────────────────────────────────────────▶ PUBLISHING
//! ```

use log::{info, warn};

use super::context::{FsmContext, WakeReason};
use super::{StateDescriptor, StateId};
use crate::app::events::WakeEvent;
use crate::app::ports::{Board, PublishRequest};
use crate::app::telemetry::BatteryReport;
use crate::error::PublishError;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table for a given board type.  Called once at startup.
pub fn build_state_table<B: Board>() -> [StateDescriptor<B>; StateId::COUNT] {
    [
        // Index 0: Resetting
        StateDescriptor {
            id: StateId::Resetting,
            name: "Resetting",
            on_enter: None,
            on_exit: None,
            on_update: resetting_update::<B>,
        },
        // Index 1: AwaitingResetComplete
        StateDescriptor {
            id: StateId::AwaitingResetComplete,
            name: "AwaitingResetComplete",
            on_enter: Some(awaiting_reset_enter),
            on_exit: None,
            on_update: awaiting_reset_update::<B>,
        },
        // Index 2: AwaitingBootSettle
        StateDescriptor {
            id: StateId::AwaitingBootSettle,
            name: "AwaitingBootSettle",
            on_enter: Some(boot_settle_enter),
            on_exit: None,
            on_update: boot_settle_update::<B>,
        },
        // Index 3: Publishing
        StateDescriptor {
            id: StateId::Publishing,
            name: "Publishing",
            on_enter: Some(publishing_enter),
            on_exit: Some(publishing_exit),
            on_update: publishing_update::<B>,
        },
        // Index 4: AwaitingPublishSettle
        StateDescriptor {
            id: StateId::AwaitingPublishSettle,
            name: "AwaitingPublishSettle",
            on_enter: None,
            on_exit: None,
            on_update: publish_settle_update::<B>,
        },
        // Index 5: Sleeping
        StateDescriptor {
            id: StateId::Sleeping,
            name: "Sleeping",
            on_enter: Some(sleeping_enter),
            on_exit: None,
            on_update: sleeping_update::<B>,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  RESETTING
// ═══════════════════════════════════════════════════════════════════════════

fn resetting_update<B: Board>(_ctx: &mut FsmContext, board: &mut B) -> Option<StateId> {
    info!("RESETTING: soft-resetting accelerometer");
    board.reset();
    Some(StateId::AwaitingResetComplete)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING RESET COMPLETE: polled without a deadline
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_reset_enter(ctx: &mut FsmContext) {
    ctx.reset_stall_reported = false;
}

fn awaiting_reset_update<B: Board>(ctx: &mut FsmContext, board: &mut B) -> Option<StateId> {
    if board.ready() {
        board.configure(&ctx.config.sensor);
        info!(
            "AWAITING_RESET: sensor up after {} ms, activity/inactivity configured",
            ctx.elapsed_ms()
        );
        ctx.post(WakeEvent::SensorConfigured);
        return Some(StateId::AwaitingBootSettle);
    }

    // Keep polling; only make the stall visible.
    let waited = ctx.elapsed_ms();
    if !ctx.reset_stall_reported && waited >= ctx.config.timing.reset_stall_warn_ms {
        warn!("AWAITING_RESET: sensor silent for {} ms, still polling", waited);
        ctx.reset_stall_reported = true;
        ctx.post(WakeEvent::SensorStalled { waited_ms: waited });
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING BOOT SETTLE
// ═══════════════════════════════════════════════════════════════════════════

fn boot_settle_enter(ctx: &mut FsmContext) {
    info!(
        "BOOT_SETTLE: staying awake {} ms before first report",
        ctx.config.timing.boot_settle_ms
    );
}

fn boot_settle_update<B: Board>(ctx: &mut FsmContext, _board: &mut B) -> Option<StateId> {
    if ctx.elapsed_ms() >= ctx.config.timing.boot_settle_ms {
        return Some(StateId::Publishing);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  PUBLISHING: bounded wait for connectivity
// ═══════════════════════════════════════════════════════════════════════════

fn publishing_enter(ctx: &mut FsmContext) {
    info!(
        "PUBLISHING: waiting up to {} ms for cloud connection",
        ctx.config.timing.max_publish_wait_ms
    );
}

fn publishing_exit(ctx: &mut FsmContext) {
    // A dropped report must not leak its flag into the next cycle.
    ctx.wake_reason = None;
}

fn publishing_update<B: Board>(ctx: &mut FsmContext, board: &mut B) -> Option<StateId> {
    if board.is_connected() {
        // The flag stays put until a report actually leaves; exit clears it.
        let report = BatteryReport {
            motion: ctx.wake_reason.is_some_and(WakeReason::is_activity),
            cell_voltage: board.cell_voltage(),
            state_of_charge: board.state_of_charge(),
        };
        let settings = ctx.config.publish;

        match report.payload() {
            Ok(payload) => {
                let result = board.publish(&PublishRequest {
                    label: settings.event_name,
                    payload: payload.as_str(),
                    ttl_secs: settings.ttl_secs,
                    visibility: settings.visibility,
                });
                match result {
                    Ok(()) => {
                        info!("PUBLISHING: {} <- \"{}\"", settings.event_name, payload);
                        ctx.post(WakeEvent::Published { payload });
                        return Some(StateId::AwaitingPublishSettle);
                    }
                    // Session dropped since `is_connected()`: same as not yet online.
                    Err(PublishError::NotConnected) => {
                        info!("PUBLISHING: session dropped before send, still waiting");
                    }
                    Err(e) => {
                        warn!("PUBLISHING: publish failed ({}), not retrying", e);
                        ctx.post(WakeEvent::PublishFailed(e));
                        return Some(StateId::AwaitingPublishSettle);
                    }
                }
            }
            Err(e) => {
                warn!("PUBLISHING: cannot encode {:?} ({})", report, e);
                ctx.post(WakeEvent::PublishFailed(e));
                return Some(StateId::AwaitingPublishSettle);
            }
        }
    }

    let waited = ctx.elapsed_ms();
    if waited >= ctx.config.timing.max_publish_wait_ms {
        warn!("PUBLISHING: no connection after {} ms, dropping report", waited);
        ctx.post(WakeEvent::PublishDropped { waited_ms: waited });
        return Some(StateId::Sleeping);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING PUBLISH SETTLE
// ═══════════════════════════════════════════════════════════════════════════

fn publish_settle_update<B: Board>(ctx: &mut FsmContext, _board: &mut B) -> Option<StateId> {
    if ctx.elapsed_ms() >= ctx.config.timing.publish_settle_ms {
        return Some(StateId::Sleeping);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLEEPING: the only blocking state
// ═══════════════════════════════════════════════════════════════════════════

fn sleeping_enter(ctx: &mut FsmContext) {
    let src = &ctx.config.wake;
    info!(
        "SLEEPING: suspend until GPIO{} {:?} or {} s",
        src.pin, src.edge, src.max_duration_secs
    );
}

fn sleeping_update<B: Board>(ctx: &mut FsmContext, board: &mut B) -> Option<StateId> {
    let source = ctx.config.wake;
    let cause = board.suspend_until(&source);

    // Time moved on while suspended; Publishing's window starts now.
    ctx.now_ms = board.now_ms();

    let reason = if board.wake_signal_present() {
        WakeReason::Activity
    } else {
        WakeReason::Timeout
    };
    ctx.wake_reason = Some(reason);
    ctx.cycles = ctx.cycles.wrapping_add(1);

    info!("WAKE: cause={:?} reason={:?} cycle={}", cause, reason, ctx.cycles);
    ctx.post(WakeEvent::Woke { cause, reason });
    Some(StateId::Publishing)
}

//! Application service: the hexagonal core.
//!
//! [`WakeController`] owns the FSM and its shared context.  All I/O flows
//! through the [`Board`] port bundle injected at call sites, so the whole
//! wake cycle is testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐
//!    PowerPort ──▶ │      WakeController       │ ──▶ EventSink
//!  PublishPort ◀── │  FSM · StateClock · cycle │
//!    SleepPort ◀── └──────────────────────────┘
//!    ClockPort ──▶
//! ```

use log::info;

use crate::config::WakeConfig;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::events::WakeEvent;
use super::ports::{Board, EventSink};

// ───────────────────────────────────────────────────────────────
// WakeController
// ───────────────────────────────────────────────────────────────

/// Drives the reset → configure → settle → publish → sleep cycle.
pub struct WakeController<B: Board> {
    fsm: Fsm<B>,
    ctx: FsmContext,
    tick_count: u64,
}

impl<B: Board> WakeController<B> {
    /// Construct the controller in `Resetting`.
    ///
    /// Does **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(config: WakeConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Resetting),
            ctx: FsmContext::new(config),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Stamp the initial state's entry time and announce the start.
    pub fn start(&mut self, board: &B, sink: &mut impl EventSink) {
        self.ctx.now_ms = board.now_ms();
        self.fsm.start(&mut self.ctx);
        sink.emit(&WakeEvent::Started(self.fsm.current_state()));
        info!(
            "WakeController started in {:?} at {} ms",
            self.fsm.current_state(),
            self.ctx.now_ms
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one scheduler tick: sample the clock, run the current state's
    /// handler, then forward whatever it queued.
    ///
    /// Returns only after the handler does; in `Sleeping` that means after
    /// the platform resumes.
    pub fn tick(&mut self, board: &mut B, sink: &mut impl EventSink) {
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        self.ctx.now_ms = board.now_ms();
        self.fsm.tick(&mut self.ctx, board);

        for event in self.ctx.outbox.iter() {
            sink.emit(event);
        }
        self.ctx.outbox.clear();

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&WakeEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Total scheduler ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Completed sleep exits since startup.
    pub fn cycles(&self) -> u32 {
        self.ctx.cycles
    }

    /// Monotonic time at which the current state was entered.
    pub fn state_entered_ms(&self) -> u64 {
        self.ctx.clock.entered_ms()
    }
}

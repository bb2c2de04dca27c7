//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  StateTable<B>                                                         │
//! │  ┌───────────────────────┬──────────┬──────────┬─────────────────────┐ │
//! │  │ StateId               │ on_enter │ on_exit  │ on_update           │ │
//! │  ├───────────────────────┼──────────┼──────────┼─────────────────────┤ │
//! │  │ Resetting             │    -     │    -     │ fn(ctx,b)->Option<> │ │
//! │  │ AwaitingResetComplete │ fn(ctx)  │    -     │ fn(ctx,b)->Option<> │ │
//! │  │ AwaitingBootSettle    │ fn(ctx)  │    -     │ fn(ctx,b)->Option<> │ │
//! │  │ Publishing            │ fn(ctx)  │ fn(ctx)  │ fn(ctx,b)->Option<> │ │
//! │  │ AwaitingPublishSettle │    -     │    -     │ fn(ctx,b)->Option<> │ │
//! │  │ Sleeping              │ fn(ctx)  │    -     │ fn(ctx,b)->Option<> │ │
//! │  └───────────────────────┴──────────┴──────────┴─────────────────────┘ │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state with the
//! shared [`FsmContext`] and the board.  If it returns `Some(next_id)`, the
//! engine runs `on_exit` for the current state, stamps the state clock with
//! `ctx.now_ms`, then runs `on_enter` for the next.  Enter/exit actions only
//! see the context; anything that touches hardware lives in `on_update`.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all wake-cycle states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Resetting = 0,
    AwaitingResetComplete = 1,
    AwaitingBootSettle = 2,
    Publishing = 3,
    AwaitingPublishSettle = 4,
    Sleeping = 5,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 6;
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn<B> = fn(&mut FsmContext, &mut B) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor<B> {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn<B>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm<B> {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor<B>; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl<B> Fsm<B> {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor<B>; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Stamp the entry time and run the initial `on_enter`.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        ctx.clock.mark(ctx.now_ms);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.  The caller sets `ctx.now_ms` first.
    pub fn tick(&mut self, ctx: &mut FsmContext, board: &mut B) {
        let next = (self.table[self.current].on_update)(ctx, board);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Jump straight to `next`, running exit/enter actions.  No-op if
    /// already there.
    #[cfg(test)]
    pub(crate) fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        self.table[self.current].id
    }

    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        ctx.clock.mark(ctx.now_ms);

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

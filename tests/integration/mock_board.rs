//! Mock board for integration tests.
//!
//! Implements every port on a manual clock and records each collaborator
//! call, so tests can assert on the full call history without real SPI,
//! I2C, radio or sleep hardware.

use std::collections::VecDeque;

use accelwake::app::events::WakeEvent;
use accelwake::app::ports::{
    ClockPort, EventSink, PowerPort, PublishPort, PublishRequest, SensorPort, SleepPort, WakeCause,
};
use accelwake::app::service::WakeController;
use accelwake::config::{Edge, SensorThresholds, Visibility, WakeConfig, WakeSource};
use accelwake::error::PublishError;
use accelwake::fsm::StateId;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reset,
    Configure(SensorThresholds),
    Publish {
        label: String,
        payload: String,
        ttl_secs: u32,
        visibility: Visibility,
    },
    Suspend {
        pin: i32,
        edge: Edge,
        max_duration_secs: u32,
    },
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub now_ms: u64,
    pub calls: Vec<Call>,
    /// The sensor answers this long after a reset.
    pub reset_latency_ms: u64,
    reset_at_ms: Option<u64>,
    /// Connectivity comes up at this time (`None` = never).
    pub connect_at_ms: Option<u64>,
    pub publish_result: Result<(), PublishError>,
    /// Queued (cause, time asleep) pairs; an empty queue means the timer fires.
    pub wake_plan: VecDeque<(WakeCause, u64)>,
    pub awake_bit: bool,
    pub voltage: f32,
    pub soc: f32,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            calls: Vec::new(),
            reset_latency_ms: 50,
            reset_at_ms: None,
            connect_at_ms: Some(0),
            publish_result: Ok(()),
            wake_plan: VecDeque::new(),
            awake_bit: false,
            voltage: 3.9,
            soc: 88.25,
        }
    }

    pub fn offline() -> Self {
        Self {
            connect_at_ms: None,
            ..Self::new()
        }
    }

    pub fn plan_wake(&mut self, cause: WakeCause, after_ms: u64) {
        self.wake_plan.push_back((cause, after_ms));
    }

    pub fn payloads(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Publish { payload, .. } => Some(payload.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn suspensions(&self) -> usize {
        self.count(|c| matches!(c, Call::Suspend { .. }))
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockBoard {
    fn reset(&mut self) {
        self.calls.push(Call::Reset);
        self.reset_at_ms = Some(self.now_ms);
    }

    fn ready(&mut self) -> bool {
        self.reset_at_ms
            .is_some_and(|at| self.now_ms >= at + self.reset_latency_ms)
    }

    fn configure(&mut self, thresholds: &SensorThresholds) {
        self.calls.push(Call::Configure(*thresholds));
    }

    fn wake_signal_present(&mut self) -> bool {
        self.awake_bit
    }
}

impl PowerPort for MockBoard {
    fn cell_voltage(&mut self) -> f32 {
        self.voltage
    }

    fn state_of_charge(&mut self) -> f32 {
        self.soc
    }
}

impl PublishPort for MockBoard {
    fn is_connected(&self) -> bool {
        self.connect_at_ms.is_some_and(|at| self.now_ms >= at)
    }

    fn publish(&mut self, request: &PublishRequest<'_>) -> Result<(), PublishError> {
        self.calls.push(Call::Publish {
            label: request.label.to_string(),
            payload: request.payload.to_string(),
            ttl_secs: request.ttl_secs,
            visibility: request.visibility,
        });
        self.publish_result
    }
}

impl SleepPort for MockBoard {
    fn suspend_until(&mut self, source: &WakeSource) -> WakeCause {
        self.calls.push(Call::Suspend {
            pin: source.pin,
            edge: source.edge,
            max_duration_secs: source.max_duration_secs,
        });
        let (cause, slept_ms) = self
            .wake_plan
            .pop_front()
            .unwrap_or((WakeCause::Timer, u64::from(source.max_duration_secs) * 1_000));
        self.now_ms += slept_ms;
        self.awake_bit = cause == WakeCause::Pin;
        cause
    }
}

impl ClockPort for MockBoard {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<WakeEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `StateChanged` as `(from, to)`.
    pub fn transitions(&self) -> Vec<(StateId, StateId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                WakeEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &WakeEvent) {
        self.events.push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

pub struct Rig {
    pub app: WakeController<MockBoard>,
    pub board: MockBoard,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn start(board: MockBoard) -> Self {
        let mut app = WakeController::new(WakeConfig::default());
        let mut sink = RecordingSink::new();
        app.start(&board, &mut sink);
        Self { app, board, sink }
    }

    /// Advance the clock by `dt_ms`, then tick once.
    pub fn step(&mut self, dt_ms: u64) {
        self.board.now_ms += dt_ms;
        self.app.tick(&mut self.board, &mut self.sink);
    }

    /// Tick every `dt_ms` until `state` is current.  Panics after `max_ticks`.
    pub fn run_until(&mut self, state: StateId, dt_ms: u64, max_ticks: usize) {
        for _ in 0..max_ticks {
            if self.app.state() == state {
                return;
            }
            self.step(dt_ms);
        }
        assert_eq!(self.app.state(), state, "did not reach {:?}", state);
    }
}

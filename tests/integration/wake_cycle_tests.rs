//! End-to-end wake-cycle tests: WakeController → FSM → mock collaborators.
//!
//! The scheduler ticks every 20 ms; the mock board's clock only moves when
//! the test steps it (or when the board "sleeps").

use accelwake::app::events::WakeEvent;
use accelwake::app::ports::WakeCause;
use accelwake::config::{Edge, SensorThresholds, Visibility};
use accelwake::error::PublishError;
use accelwake::fsm::StateId;
use accelwake::fsm::context::WakeReason;

use crate::mock_board::{Call, MockBoard, Rig};

const TICK_MS: u64 = 20;
const FOUR_HOURS_MS: u64 = 4 * 60 * 60 * 1_000;

// ── Boot → first report → sleep ───────────────────────────────

#[test]
fn boot_reset_settle_publish_sleep() {
    let mut rig = Rig::start(MockBoard::new());
    assert_eq!(rig.app.state(), StateId::Resetting);

    // Reset at t=20, sensor answers 50 ms later; first poll at or after that is t=80.
    rig.run_until(StateId::AwaitingBootSettle, TICK_MS, 100);
    assert_eq!(rig.board.now_ms, 80);
    assert_eq!(rig.app.state_entered_ms(), 80);

    rig.run_until(StateId::Publishing, TICK_MS, 1_000);
    assert_eq!(rig.app.state_entered_ms(), 80 + 10_000);

    rig.run_until(StateId::AwaitingPublishSettle, TICK_MS, 10);
    let settle_entry = rig.app.state_entered_ms();
    assert_eq!(settle_entry, 10_100);

    rig.run_until(StateId::Sleeping, TICK_MS, 1_000);
    assert_eq!(rig.app.state_entered_ms(), settle_entry + 4_000);

    assert_eq!(
        rig.board.calls,
        vec![
            Call::Reset,
            Call::Configure(SensorThresholds::default()),
            Call::Publish {
                label: "accel".into(),
                payload: "0,3.90,88.25".into(),
                ttl_secs: 60,
                visibility: Visibility::Private,
            },
        ]
    );
    assert_eq!(
        rig.sink.transitions(),
        vec![
            (StateId::Resetting, StateId::AwaitingResetComplete),
            (StateId::AwaitingResetComplete, StateId::AwaitingBootSettle),
            (StateId::AwaitingBootSettle, StateId::Publishing),
            (StateId::Publishing, StateId::AwaitingPublishSettle),
            (StateId::AwaitingPublishSettle, StateId::Sleeping),
        ]
    );
    assert_eq!(rig.sink.events[0], WakeEvent::Started(StateId::Resetting));
}

// ── Motion wake ───────────────────────────────────────────────

#[test]
fn pin_wake_publishes_motion_flag() {
    let mut rig = Rig::start(MockBoard::new());
    rig.run_until(StateId::Sleeping, TICK_MS, 2_000);

    rig.board.plan_wake(WakeCause::Pin, 30 * 60 * 1_000);
    rig.step(TICK_MS);

    assert_eq!(rig.app.state(), StateId::Publishing);
    assert_eq!(
        rig.board.calls.last(),
        Some(&Call::Suspend {
            pin: 4,
            edge: Edge::Rising,
            max_duration_secs: 14_400,
        })
    );
    assert!(rig.sink.events.contains(&WakeEvent::Woke {
        cause: WakeCause::Pin,
        reason: WakeReason::Activity,
    }));
    assert_eq!(rig.app.cycles(), 1);

    rig.step(TICK_MS);
    assert_eq!(rig.board.payloads(), vec!["0,3.90,88.25", "1,3.90,88.25"]);
    assert_eq!(rig.app.state(), StateId::AwaitingPublishSettle);
}

#[test]
fn timer_wake_publishes_battery_report() {
    let mut rig = Rig::start(MockBoard::new());
    rig.run_until(StateId::Sleeping, TICK_MS, 2_000);
    let slept_at = rig.board.now_ms + TICK_MS;

    rig.step(TICK_MS);
    assert_eq!(rig.board.now_ms, slept_at + FOUR_HOURS_MS);
    assert_eq!(rig.app.state_entered_ms(), slept_at + FOUR_HOURS_MS);

    rig.step(TICK_MS);
    assert_eq!(rig.board.payloads().last(), Some(&"0,3.90,88.25"));
}

#[test]
fn wake_flag_follows_each_cycle() {
    let mut rig = Rig::start(MockBoard::new());
    rig.run_until(StateId::Sleeping, TICK_MS, 2_000);

    for cause in [WakeCause::Pin, WakeCause::Timer, WakeCause::Timer, WakeCause::Pin] {
        rig.board.plan_wake(cause, 1_000);
        rig.step(TICK_MS);
        rig.run_until(StateId::Sleeping, TICK_MS, 1_000);
    }

    assert_eq!(
        rig.board.payloads(),
        vec![
            "0,3.90,88.25",
            "1,3.90,88.25",
            "0,3.90,88.25",
            "0,3.90,88.25",
            "1,3.90,88.25",
        ]
    );
    assert_eq!(rig.app.cycles(), 4);
    assert_eq!(rig.board.suspensions(), 4);
}

// ── Connectivity never arrives ────────────────────────────────

#[test]
fn offline_publish_window_drops_report() {
    let mut rig = Rig::start(MockBoard::offline());
    rig.run_until(StateId::Publishing, TICK_MS, 1_000);
    let entered = rig.app.state_entered_ms();

    for _ in 0..(61_000 / TICK_MS) {
        if rig.app.state() != StateId::Publishing {
            break;
        }
        rig.step(TICK_MS);
    }

    assert_eq!(rig.app.state(), StateId::Sleeping);
    assert_eq!(rig.board.now_ms - entered, 60_000);
    assert!(rig.board.payloads().is_empty());
    assert!(
        rig.sink
            .events
            .contains(&WakeEvent::PublishDropped { waited_ms: 60_000 })
    );
    assert_eq!(
        rig.sink.transitions().last(),
        Some(&(StateId::Publishing, StateId::Sleeping))
    );
}

#[test]
fn late_connectivity_still_publishes_once() {
    let mut board = MockBoard::new();
    board.connect_at_ms = Some(40_000);
    let mut rig = Rig::start(board);

    rig.run_until(StateId::AwaitingPublishSettle, TICK_MS, 5_000);
    assert_eq!(rig.board.now_ms, 40_000);
    assert_eq!(rig.board.payloads().len(), 1);
}

// ── Collaborator failures ─────────────────────────────────────

#[test]
fn rejected_publish_is_not_retried() {
    let mut board = MockBoard::new();
    board.publish_result = Err(PublishError::Rejected);
    let mut rig = Rig::start(board);

    rig.run_until(StateId::Sleeping, TICK_MS, 2_000);
    assert_eq!(rig.board.payloads().len(), 1);
    assert!(
        rig.sink
            .events
            .contains(&WakeEvent::PublishFailed(PublishError::Rejected))
    );
}

#[test]
fn unresponsive_sensor_keeps_polling() {
    let mut board = MockBoard::new();
    board.reset_latency_ms = u64::MAX / 2;
    let mut rig = Rig::start(board);

    for _ in 0..5_000 {
        rig.step(TICK_MS);
    }

    assert_eq!(rig.app.state(), StateId::AwaitingResetComplete);
    assert_eq!(rig.board.calls, vec![Call::Reset]);
    let stalls = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, WakeEvent::SensorStalled { .. }))
        .count();
    assert_eq!(stalls, 1);
}

#[test]
fn sensor_is_configured_once_per_boot() {
    let mut rig = Rig::start(MockBoard::new());
    rig.run_until(StateId::Sleeping, TICK_MS, 2_000);
    for _ in 0..3 {
        rig.step(TICK_MS);
        rig.run_until(StateId::Sleeping, TICK_MS, 1_000);
    }

    assert_eq!(rig.board.count(|c| matches!(c, Call::Reset)), 1);
    assert_eq!(rig.board.count(|c| matches!(c, Call::Configure(_))), 1);
}

//! System configuration parameters
//!
//! Every threshold and timing window of the wake/sleep cycle.  These are
//! fixed at build time: there is no runtime configuration path and nothing
//! is persisted.  The structs exist so the values travel as one typed
//! bundle and can be dumped at boot.

use serde::Serialize;

use crate::drivers::adxl362::{LinkMode, OutputDataRate, Range, STATUS_AWAKE, THRESHOLD_MAX};
use crate::pins;

/// Accelerometer activity/inactivity setup, applied in one `configure()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorThresholds {
    pub range: Range,
    pub half_bandwidth: bool,
    pub odr: OutputDataRate,
    /// Activity threshold (raw 11-bit code, ~1 mg/LSB at ±2 g).
    pub activity_threshold: u16,
    /// Inactivity threshold (raw 11-bit code).
    pub inactivity_threshold: u16,
    /// Samples below the inactivity threshold before the part goes back to sleep.
    pub inactivity_samples: u16,
    pub link_mode: LinkMode,
    pub activity_enabled: bool,
    /// Referenced mode subtracts the resting gravity vector.
    pub activity_referenced: bool,
    pub inactivity_enabled: bool,
    pub inactivity_referenced: bool,
    /// STATUS bits routed to INT1.
    pub interrupt_map: u8,
    pub autosleep: bool,
}

impl Default for SensorThresholds {
    fn default() -> Self {
        Self {
            range: Range::G2,
            half_bandwidth: false,
            odr: OutputDataRate::Hz50,
            activity_threshold: 250,
            inactivity_threshold: 150,
            // 250 samples at 50 Hz = 5 s without motion
            inactivity_samples: 250,
            link_mode: LinkMode::Loop,
            activity_enabled: true,
            activity_referenced: true,
            inactivity_enabled: true,
            inactivity_referenced: true,
            interrupt_map: STATUS_AWAKE,
            autosleep: true,
        }
    }
}

/// Deadlines of the wake cycle, in milliseconds unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WakeTiming {
    /// Stay up this long after sensor configuration before the first publish.
    pub boot_settle_ms: u64,
    /// Give up on connectivity after this long in Publishing.
    pub max_publish_wait_ms: u64,
    /// Let a publish drain before suspending.
    pub publish_settle_ms: u64,
    /// Warn once if the sensor has not answered a reset after this long.
    pub reset_stall_warn_ms: u64,
    /// Scheduler period for `tick()`.
    pub tick_interval_ms: u32,
}

impl Default for WakeTiming {
    fn default() -> Self {
        Self {
            boot_settle_ms: 10_000,
            max_publish_wait_ms: 60_000,
            publish_settle_ms: 4_000,
            reset_stall_warn_ms: 5_000,
            tick_interval_ms: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Private,
    Public,
}

/// Event metadata attached to every publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublishSettings {
    pub event_name: &'static str,
    pub ttl_secs: u32,
    pub visibility: Visibility,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            event_name: "accel",
            ttl_secs: 60,
            visibility: Visibility::Private,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Edge {
    Rising,
    Falling,
}

/// What ends a suspension: a pin edge or the battery-report timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WakeSource {
    pub pin: i32,
    pub edge: Edge,
    /// Upper bound on one suspension; doubles as the battery-report interval.
    pub max_duration_secs: u32,
}

impl Default for WakeSource {
    fn default() -> Self {
        Self {
            pin: pins::ACCEL_INT1_GPIO,
            edge: Edge::Rising,
            max_duration_secs: 4 * 60 * 60,
        }
    }
}

/// Complete configuration bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WakeConfig {
    pub sensor: SensorThresholds,
    pub timing: WakeTiming,
    pub publish: PublishSettings,
    pub wake: WakeSource,
}

impl WakeConfig {
    /// Check that the bundle is internally consistent.
    pub fn validate(&self) -> Result<(), &'static str> {
        let s = &self.sensor;
        if s.activity_threshold > THRESHOLD_MAX || s.inactivity_threshold > THRESHOLD_MAX {
            return Err("activity/inactivity thresholds are 11-bit");
        }
        if s.activity_enabled
            && s.inactivity_enabled
            && s.inactivity_threshold >= s.activity_threshold
        {
            return Err("inactivity threshold must be below activity threshold");
        }
        if s.interrupt_map == 0 {
            return Err("no STATUS bit routed to INT1, motion cannot wake the device");
        }

        let t = &self.timing;
        if t.tick_interval_ms == 0 {
            return Err("tick interval must be non-zero");
        }
        let tick = u64::from(t.tick_interval_ms);
        if tick >= t.boot_settle_ms
            || tick >= t.publish_settle_ms
            || tick >= t.max_publish_wait_ms
        {
            return Err("tick interval must be shorter than every settle window");
        }

        if self.wake.max_duration_secs == 0 {
            return Err("battery report interval must be non-zero");
        }
        if self.publish.event_name.is_empty() {
            return Err("event name must not be empty");
        }
        Ok(())
    }
}

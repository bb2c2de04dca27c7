//! Platform suspension adapter.
//!
//! Implements [`SleepPort`].  On the device this is ESP32 light sleep: the
//! CPU halts, RAM and peripherals keep their state, and the call returns
//! in place when either wake source fires.  Execution therefore resumes
//! in `Sleeping`'s update handler, exactly where it suspended.
//!
//! The EXT0 wake source is level-triggered.  An edge is built from two
//! level waits: if the pin already sits at the active level on entry, the
//! adapter first sleeps until it returns to idle, then re-arms for the
//! active level with whatever remains of the timeout.  Only a fresh edge
//! ends the suspension with [`WakeCause::Pin`].
//!
//! ## cfg gating
//!
//! - **`feature = "espidf"`**: `esp_sleep_*` and RTC GPIO calls from ESP-IDF.
//! - **otherwise**: a simulated pin and clock driven by the test.

use log::info;

use crate::app::ports::{SleepPort, WakeCause};
use crate::config::{Edge, WakeSource};

/// Pin level that counts as "edge arrived".
fn active_level(edge: Edge) -> u32 {
    match edge {
        Edge::Rising => 1,
        Edge::Falling => 0,
    }
}

pub struct SleepAdapter {
    suspensions: u32,
    #[cfg(not(feature = "espidf"))]
    sim: Simulation,
}

/// Host stand-in for the INT1 pad and the sleep timer.
#[cfg(not(feature = "espidf"))]
struct Simulation {
    level: u32,
    next_cause: WakeCause,
    clear_after_us: Option<u64>,
    uptime_us: u64,
    armed: Vec<u32>,
}

impl Default for SleepAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepAdapter {
    pub fn new() -> Self {
        Self {
            suspensions: 0,
            #[cfg(not(feature = "espidf"))]
            sim: Simulation {
                level: 0,
                next_cause: WakeCause::Timer,
                clear_after_us: Some(0),
                uptime_us: 0,
                armed: Vec::new(),
            },
        }
    }

    /// Number of completed suspensions.
    pub fn suspensions(&self) -> u32 {
        self.suspensions
    }

    /// Sleep until `source`'s edge or its timeout, whichever comes first.
    fn wait_for_edge(&mut self, source: &WakeSource) -> WakeCause {
        let active = active_level(source.edge);
        let budget_us = u64::from(source.max_duration_secs) * 1_000_000;
        let started_us = self.uptime_us();

        if self.pin_level(source.pin) == active {
            info!(
                "Sleep: GPIO{} already at {}, waiting for it to clear",
                source.pin, active
            );
            match self.light_sleep(source, active ^ 1, budget_us) {
                WakeCause::Pin => {}
                other => return other,
            }
            info!("Sleep: GPIO{} cleared, re-armed for {:?} edge", source.pin, source.edge);
        }

        let spent_us = self.uptime_us().saturating_sub(started_us);
        let remaining_us = budget_us.saturating_sub(spent_us);
        if remaining_us == 0 {
            return WakeCause::Timer;
        }
        self.light_sleep(source, active, remaining_us)
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(feature = "espidf")]
    fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time is always safe to call after boot.
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        us.max(0) as u64
    }

    #[cfg(feature = "espidf")]
    fn pin_level(&mut self, pin: i32) -> u32 {
        use esp_idf_svc::sys::{
            esp, rtc_gpio_get_level, rtc_gpio_init, rtc_gpio_mode_t_RTC_GPIO_MODE_INPUT_ONLY,
            rtc_gpio_set_direction,
        };
        use log::warn;

        let setup = esp!(unsafe { rtc_gpio_init(pin) }).and_then(|()| {
            esp!(unsafe { rtc_gpio_set_direction(pin, rtc_gpio_mode_t_RTC_GPIO_MODE_INPUT_ONLY) })
        });
        if let Err(e) = setup {
            warn!("Sleep: GPIO{} not readable ({}), assuming idle", pin, e);
            return 0;
        }
        unsafe { rtc_gpio_get_level(pin) }
    }

    #[cfg(feature = "espidf")]
    #[allow(non_upper_case_globals)]
    fn light_sleep(&mut self, source: &WakeSource, level: u32, timeout_us: u64) -> WakeCause {
        use esp_idf_svc::sys::{
            esp, esp_light_sleep_start, esp_sleep_enable_ext0_wakeup,
            esp_sleep_enable_timer_wakeup, esp_sleep_get_wakeup_cause,
            esp_sleep_source_t_ESP_SLEEP_WAKEUP_EXT0, esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER,
        };
        use log::warn;

        if let Err(e) = esp!(unsafe { esp_sleep_enable_timer_wakeup(timeout_us) }) {
            warn!("Sleep: timer wake setup failed: {}", e);
        }
        if let Err(e) = esp!(unsafe { esp_sleep_enable_ext0_wakeup(source.pin, level as i32) }) {
            warn!("Sleep: GPIO{} wake setup failed: {}", source.pin, e);
        }
        if let Err(e) = esp!(unsafe { esp_light_sleep_start() }) {
            warn!("Sleep: light sleep rejected: {}", e);
            return WakeCause::Other;
        }

        match unsafe { esp_sleep_get_wakeup_cause() } {
            esp_sleep_source_t_ESP_SLEEP_WAKEUP_EXT0 => WakeCause::Pin,
            esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER => WakeCause::Timer,
            _ => WakeCause::Other,
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn uptime_us(&self) -> u64 {
        self.sim.uptime_us
    }

    #[cfg(not(feature = "espidf"))]
    fn pin_level(&mut self, _pin: i32) -> u32 {
        self.sim.level
    }

    #[cfg(not(feature = "espidf"))]
    fn light_sleep(&mut self, source: &WakeSource, level: u32, timeout_us: u64) -> WakeCause {
        info!(
            "Sleep(sim): GPIO{} level {} or {} us",
            source.pin, level, timeout_us
        );
        let sim = &mut self.sim;
        sim.armed.push(level);

        // Level-triggered: an already-matching pad fires at once.
        if sim.level == level {
            return WakeCause::Pin;
        }

        if level != active_level(source.edge) {
            return match sim.clear_after_us {
                Some(after) if after < timeout_us => {
                    sim.uptime_us += after;
                    sim.level = level;
                    WakeCause::Pin
                }
                _ => {
                    sim.uptime_us += timeout_us;
                    WakeCause::Timer
                }
            };
        }

        match core::mem::replace(&mut sim.next_cause, WakeCause::Timer) {
            WakeCause::Pin => {
                sim.level = level;
                WakeCause::Pin
            }
            other => {
                sim.uptime_us += timeout_us;
                other
            }
        }
    }
}

/// Simulation controls.
#[cfg(not(feature = "espidf"))]
impl SleepAdapter {
    /// How the next armed wait ends.  `Pin` also drives the pad active.
    pub fn set_next_cause(&mut self, cause: WakeCause) {
        self.sim.next_cause = cause;
    }

    pub fn set_pin_level(&mut self, level: u32) {
        self.sim.level = level;
    }

    /// How long an active pad takes to return to idle; `None` never clears.
    pub fn set_clear_after_us(&mut self, after: Option<u64>) {
        self.sim.clear_after_us = after;
    }

    /// Every level armed on the wake pin, in order.
    pub fn armed_levels(&self) -> &[u32] {
        &self.sim.armed
    }

    pub fn sim_uptime_us(&self) -> u64 {
        self.sim.uptime_us
    }
}

impl SleepPort for SleepAdapter {
    fn suspend_until(&mut self, source: &WakeSource) -> WakeCause {
        let cause = self.wait_for_edge(source);
        self.suspensions = self.suspensions.wrapping_add(1);
        info!("Sleep: resumed ({:?}), suspension #{}", cause, self.suspensions);
        cause
    }
}

//! Battery / motion report and its wire payload.
//!
//! The payload is three comma-separated fields:
//!
//! ```text
//!   <motion 0|1>,<cell volts, 2 dp>,<state of charge %, 2 dp>
//!   1,3.85,76.50
//! ```

use core::fmt::Write as _;

use crate::error::PublishError;

/// Fixed-capacity payload buffer (cloud events cap the data field anyway).
pub const PAYLOAD_CAP: usize = 32;

pub type Payload = heapless::String<PAYLOAD_CAP>;

/// One report, sampled just before publishing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryReport {
    /// `true` when this wake was caused by motion, `false` for timer/boot reports.
    pub motion: bool,
    pub cell_voltage: f32,
    pub state_of_charge: f32,
}

impl BatteryReport {
    pub fn payload(&self) -> Result<Payload, PublishError> {
        let mut out = Payload::new();
        write!(
            out,
            "{},{:.2},{:.2}",
            u8::from(self.motion),
            self.cell_voltage,
            self.state_of_charge
        )
        .map_err(|_| PublishError::PayloadTooLong)?;
        Ok(out)
    }
}

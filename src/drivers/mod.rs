//! Bus-level peripheral drivers.

pub mod adxl362;
pub mod max17043;

#[cfg(test)]
pub(crate) mod testing;

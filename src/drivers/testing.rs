//! Register-file fakes for the bus drivers (test builds only).
//!
//! `FakeAdxl362` decodes the ADXL362 SPI command framing against a 64-byte
//! register array; `FakeMax17043` serves big-endian words over I2C.  Both can
//! be told to fail their next transaction.

use embedded_hal::{i2c, spi};

use super::adxl362::{
    DEVID_AD_VALUE, REG_DEVID_AD, REG_SOFT_RESET, REG_STATUS, SOFT_RESET_KEY, STATUS_AWAKE,
};

const CMD_WRITE: u8 = 0x0A;
const CMD_READ: u8 = 0x0B;

#[derive(Debug)]
pub struct FakeBusError;

impl spi::Error for FakeBusError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl i2c::Error for FakeBusError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

// ───────────────────────────────────────────────────────────────
// ADXL362
// ───────────────────────────────────────────────────────────────

pub struct FakeAdxl362 {
    regs: [u8; 64],
    ready_after_polls: u32,
    polls_until_ready: u32,
    writes: Vec<u8>,
    fail_next: bool,
}

impl FakeAdxl362 {
    pub fn new() -> Self {
        let mut fake = Self {
            regs: [0; 64],
            ready_after_polls: 0,
            polls_until_ready: 0,
            writes: Vec::new(),
            fail_next: false,
        };
        fake.power_on_defaults();
        fake
    }

    fn power_on_defaults(&mut self) {
        self.regs = [0; 64];
        self.regs[REG_DEVID_AD as usize] = DEVID_AD_VALUE;
        self.regs[REG_STATUS as usize] = STATUS_AWAKE;
    }

    /// STATUS reads 0 for this many polls after each soft reset.
    pub fn set_ready_after_polls(&mut self, polls: u32) {
        self.ready_after_polls = polls;
    }

    pub fn set_awake(&mut self, awake: bool) {
        let status = &mut self.regs[REG_STATUS as usize];
        if awake {
            *status |= STATUS_AWAKE;
        } else {
            *status &= !STATUS_AWAKE;
        }
    }

    pub fn set_reg(&mut self, addr: u8, value: u8) {
        self.regs[addr as usize] = value;
    }

    pub fn reg(&self, addr: u8) -> u8 {
        self.regs[addr as usize]
    }

    pub fn registers(&self) -> [u8; 64] {
        self.regs
    }

    /// Start address of every write transaction, in order.
    pub fn write_log(&self) -> &[u8] {
        &self.writes
    }

    pub fn fail_next_transaction(&mut self) {
        self.fail_next = true;
    }

    fn write_reg(&mut self, addr: u8, value: u8) {
        if addr == REG_SOFT_RESET {
            if value == SOFT_RESET_KEY {
                self.power_on_defaults();
                self.polls_until_ready = self.ready_after_polls;
            }
            return;
        }
        if let Some(slot) = self.regs.get_mut(addr as usize) {
            *slot = value;
        }
    }

    fn read_reg(&mut self, addr: u8) -> u8 {
        if addr == REG_STATUS && self.polls_until_ready > 0 {
            self.polls_until_ready -= 1;
            return 0;
        }
        self.regs.get(addr as usize).copied().unwrap_or(0)
    }
}

impl Default for FakeAdxl362 {
    fn default() -> Self {
        Self::new()
    }
}

impl spi::ErrorType for FakeAdxl362 {
    type Error = FakeBusError;
}

impl spi::SpiDevice for FakeAdxl362 {
    fn transaction(
        &mut self,
        operations: &mut [spi::Operation<'_, u8>],
    ) -> Result<(), FakeBusError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(FakeBusError);
        }

        let mut command: Option<u8> = None;
        let mut cursor: u8 = 0;

        for op in operations.iter_mut() {
            match op {
                spi::Operation::Write(bytes) => {
                    let mut data = bytes.iter().copied();
                    if command.is_none() {
                        command = data.next();
                        cursor = data.next().unwrap_or(0);
                        if command == Some(CMD_WRITE) {
                            self.writes.push(cursor);
                        }
                    }
                    if command == Some(CMD_WRITE) {
                        for byte in data {
                            self.write_reg(cursor, byte);
                            cursor = cursor.wrapping_add(1);
                        }
                    }
                }
                spi::Operation::Read(buf) => {
                    if command == Some(CMD_READ) {
                        for byte in buf.iter_mut() {
                            *byte = self.read_reg(cursor);
                            cursor = cursor.wrapping_add(1);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// MAX17043
// ───────────────────────────────────────────────────────────────

pub struct FakeMax17043 {
    regs: [u8; 32],
    fail_next: bool,
}

impl FakeMax17043 {
    pub fn new() -> Self {
        Self {
            regs: [0; 32],
            fail_next: false,
        }
    }

    pub fn set_word(&mut self, reg: u8, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.regs[reg as usize] = hi;
        self.regs[reg as usize + 1] = lo;
    }

    pub fn fail_next_transaction(&mut self) {
        self.fail_next = true;
    }
}

impl Default for FakeMax17043 {
    fn default() -> Self {
        Self::new()
    }
}

impl i2c::ErrorType for FakeMax17043 {
    type Error = FakeBusError;
}

impl i2c::I2c for FakeMax17043 {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), FakeBusError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(FakeBusError);
        }

        let mut pointer = 0usize;
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => {
                    if let Some(&reg) = bytes.first() {
                        pointer = reg as usize;
                    }
                }
                i2c::Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.regs.get(pointer).copied().unwrap_or(0);
                        pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

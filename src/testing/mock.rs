extern crate std;

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal_async::i2c::{
    ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress,
};

use crate::delivery::NotifyTransport;
use crate::drivers::bus::RegisterBus;
use crate::drivers::imu::{RawSample, SampleSource, Vector3};
use crate::error::{BusError, DriverError, TransportError};
use crate::telemetry::WIRE_FRAME_LEN;

/// Register file that records every write.
#[derive(Clone, Debug)]
pub(crate) struct MockBus {
    regs: [u8; 256],
    writes: Vec<(u8, u8)>,
    attempted: Vec<u8>,
    failing: Vec<u8>,
    fail_reads: bool,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            regs: [0u8; 256],
            writes: Vec::new(),
            attempted: Vec::new(),
            failing: Vec::new(),
            fail_reads: false,
        }
    }
}

impl MockBus {
    pub(crate) fn with_reg(mut self, reg: u8, value: u8) -> Self {
        self.regs[reg as usize] = value;
        self
    }

    pub(crate) fn with_block(mut self, reg: u8, data: &[u8]) -> Self {
        for (offset, value) in data.iter().enumerate() {
            self.regs[reg.wrapping_add(offset as u8) as usize] = *value;
        }
        self
    }

    /// Writes to `reg` NACK and leave the register untouched.
    pub(crate) fn failing_writes_to(mut self, reg: u8) -> Self {
        self.failing.push(reg);
        self
    }

    pub(crate) fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Writes that succeeded.
    pub(crate) fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Registers every write was aimed at, successful or not.
    pub(crate) fn attempted_writes(&self) -> &[u8] {
        &self.attempted
    }
}

impl RegisterBus for MockBus {
    async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), BusError> {
        self.attempted.push(reg);
        if self.failing.contains(&reg) {
            return Err(BusError::Nack);
        }
        self.regs[reg as usize] = value;
        self.writes.push((reg, value));
        Ok(())
    }

    async fn read_register(&mut self, reg: u8) -> Result<u8, BusError> {
        if self.fail_reads {
            return Err(BusError::Nack);
        }
        Ok(self.regs[reg as usize])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockI2cError;

impl embedded_hal_async::i2c::Error for MockI2cError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)
    }
}

/// I2C controller that records writes and answers reads from a canned buffer.
#[derive(Default, Debug)]
pub(crate) struct MockI2c {
    writes: Vec<(u8, Vec<u8>)>,
    read_data: Vec<u8>,
    write_reads: usize,
    nack: bool,
}

impl MockI2c {
    pub(crate) fn nacking(mut self) -> Self {
        self.nack = true;
        self
    }

    pub(crate) fn set_read_data(&mut self, data: &[u8]) {
        self.read_data = data.to_vec();
    }

    pub(crate) fn writes(&self) -> &[(u8, Vec<u8>)] {
        &self.writes
    }

    pub(crate) fn write_reads(&self) -> usize {
        self.write_reads
    }

    fn fill(&self, read: &mut [u8]) {
        for (i, slot) in read.iter_mut().enumerate() {
            *slot = self.read_data.get(i).copied().unwrap_or(0);
        }
    }
}

impl ErrorType for MockI2c {
    type Error = MockI2cError;
}

impl I2c<SevenBitAddress> for MockI2c {
    async fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        if self.nack {
            return Err(MockI2cError);
        }
        self.writes.push((address, write.to_vec()));
        Ok(())
    }

    async fn write_read(
        &mut self,
        _address: u8,
        _write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        if self.nack {
            return Err(MockI2cError);
        }
        self.write_reads += 1;
        self.fill(read);
        Ok(())
    }

    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.nack {
            return Err(MockI2cError);
        }
        for op in operations.iter_mut() {
            match op {
                Operation::Write(data) => self.writes.push((address, data.to_vec())),
                Operation::Read(buf) => self.fill(buf),
            }
        }
        Ok(())
    }
}

/// Notification sink that can refuse the first few sends.
#[derive(Default, Debug)]
pub(crate) struct MockTransport {
    sent: Vec<[u8; WIRE_FRAME_LEN]>,
    attempts: usize,
    busy_remaining: usize,
}

impl MockTransport {
    pub(crate) fn busy_for(mut self, sends: usize) -> Self {
        self.busy_remaining = sends;
        self
    }

    pub(crate) fn sent(&self) -> &[[u8; WIRE_FRAME_LEN]] {
        &self.sent
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts
    }
}

impl NotifyTransport for MockTransport {
    fn send_notification(&mut self, payload: &[u8; WIRE_FRAME_LEN]) -> Result<(), TransportError> {
        self.attempts += 1;
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            return Err(TransportError::Busy);
        }
        self.sent.push(*payload);
        Ok(())
    }
}

#[derive(Default, Debug)]
pub(crate) struct MockPin {
    history: Vec<bool>,
}

impl MockPin {
    pub(crate) fn history(&self) -> &[bool] {
        &self.history
    }
}

impl embedded_hal::digital::v2::OutputPin for MockPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.history.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.history.push(true);
        Ok(())
    }
}

/// Sample source replaying queued results, then a resting sensor.
#[derive(Default, Debug)]
pub(crate) struct ScriptedSource {
    script: VecDeque<Result<RawSample, DriverError>>,
    fetches: usize,
    next_index: u32,
}

impl ScriptedSource {
    pub(crate) fn resting(index: u32) -> RawSample {
        RawSample {
            accel: Vector3::new(0.0, 0.0, 9.8),
            gyro: Vector3::default(),
            temperature: 25.0,
            index,
        }
    }

    pub(crate) fn then_err(mut self, err: DriverError) -> Self {
        self.script.push_back(Err(err));
        self
    }

    pub(crate) fn then_ok(mut self, sample: RawSample) -> Self {
        self.script.push_back(Ok(sample));
        self
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches
    }
}

impl SampleSource for ScriptedSource {
    async fn fetch_sample(&mut self) -> Result<RawSample, DriverError> {
        self.fetches += 1;
        let result = match self.script.pop_front() {
            Some(scripted) => scripted,
            None => Ok(Self::resting(self.next_index + 1)),
        };
        if result.is_ok() {
            self.next_index += 1;
        }
        result
    }
}

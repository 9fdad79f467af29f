//! Register-level bus access.

use embedded_hal_async::i2c::{Error, ErrorKind, I2c};

use crate::error::BusError;

/// 8-bit register access at a fixed device address.
#[allow(async_fn_in_trait)]
pub trait RegisterBus {
    async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), BusError>;

    async fn read_register(&mut self, reg: u8) -> Result<u8, BusError>;

    /// Reads consecutive registers starting at `reg`.
    ///
    /// Falls back to one read per register; buses with address
    /// auto-increment should override this with a single transfer.
    async fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        for (offset, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_register(reg.wrapping_add(offset as u8)).await?;
        }
        Ok(())
    }
}

/// [`RegisterBus`] over any async I2C controller.
pub struct I2cRegisterBus<I> {
    i2c: I,
    addr: u8,
}

impl<I: I2c> I2cRegisterBus<I> {
    pub fn new(i2c: I, addr: u8) -> Self {
        Self { i2c, addr }
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

fn bus_error<E: Error>(e: E) -> BusError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => BusError::Nack,
        ErrorKind::Bus | ErrorKind::ArbitrationLoss => BusError::Bus,
        _ => BusError::Other,
    }
}

impl<I: I2c> RegisterBus for I2cRegisterBus<I> {
    async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), BusError> {
        self.i2c.write(self.addr, &[reg, value]).await.map_err(bus_error)
    }

    async fn read_register(&mut self, reg: u8) -> Result<u8, BusError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .await
            .map_err(bus_error)?;
        Ok(buf[0])
    }

    async fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c
            .write_read(self.addr, &[reg], buf)
            .await
            .map_err(bus_error)
    }
}

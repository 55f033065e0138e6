// pn532-ndef/src/bus/mod.rs

//! Byte-level bus abstraction the transport is built on.
//!
//! The core never assumes a specific bus technology; it only needs the
//! operations below. `MockBus` provides an in-memory fake for tests, and
//! the optional `i2c` feature adds a Linux I2C implementation.

use crate::Result;

pub mod mock;
pub use mock::MockBus;

#[cfg(feature = "i2c")]
pub mod i2c;
#[cfg(feature = "i2c")]
pub use i2c::I2cBus;

/// Bus trait abstracts raw byte I/O away from the frame protocol.
pub trait Bus {
    /// Bring the bus itself up (open the device, probe the address).
    fn init(&mut self) -> Result<()>;

    /// Wake the chip after power-up or a long idle period.
    fn wakeup(&mut self) -> Result<()>;

    /// Poll the chip's "response ready" indication without consuming data.
    fn ready(&mut self) -> Result<bool>;

    /// Read exactly `buf.len()` bytes from the chip.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write all of `data` to the chip.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
}

// pn532-ndef/src/bus/i2c.rs

//! Linux I2C bus backend. On I2C the PN532 prefixes every read with a
//! status byte whose bit 0 signals "response ready"; this backend consumes
//! that byte so the transport above stays bus-agnostic.

use std::thread;
use std::time::Duration;

use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;

use crate::bus::Bus;
use crate::constants::I2C_ADDRESS;
use crate::{Error, Result};

/// PN532 attached to a Linux I2C character device (e.g. `/dev/i2c-1`).
pub struct I2cBus {
    dev: LinuxI2CDevice,
}

impl I2cBus {
    /// Open the given I2C device at the PN532 default address.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_address(path, I2C_ADDRESS)
    }

    /// Open the given I2C device at a custom address.
    pub fn open_with_address(path: &str, address: u8) -> Result<Self> {
        let dev = LinuxI2CDevice::new(path, u16::from(address))
            .map_err(|e| Error::BusIo(e.to_string()))?;
        Ok(Self { dev })
    }
}

impl Bus for I2cBus {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn wakeup(&mut self) -> Result<()> {
        // The chip needs time to leave low-power mode after power-up.
        thread::sleep(Duration::from_millis(500));
        Ok(())
    }

    fn ready(&mut self) -> Result<bool> {
        let mut status = [0u8; 1];
        self.dev
            .read(&mut status)
            .map_err(|e| Error::BusIo(e.to_string()))?;
        Ok(status[0] & 1 == 1)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        // One status byte precedes the frame data on every I2C read.
        let mut raw = vec![0u8; buf.len() + 1];
        self.dev
            .read(&mut raw)
            .map_err(|e| Error::BusIo(e.to_string()))?;
        buf.copy_from_slice(&raw[1..]);
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.dev
            .write(data)
            .map_err(|e| Error::BusIo(e.to_string()))
    }
}

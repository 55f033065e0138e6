// pn532-ndef/src/bus/mock.rs

use std::collections::VecDeque;

use crate::bus::Bus;
use crate::constants::ACK_FRAME;
use crate::{Error, Result};

/// Mock bus for unit tests. It records written frames and serves reads from
/// a queued byte stream, so tests can script entire wire conversations.
#[derive(Debug, Default)]
pub struct MockBus {
    /// Every buffer passed to `write_all`, in order.
    pub written: Vec<Vec<u8>>,
    stream: VecDeque<u8>,
    not_ready_polls: usize,
    read_failures: usize,
    write_failures: usize,
    init_called: bool,
    wakeup_called: bool,
}

impl MockBus {
    /// Create an empty mock with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes to be served by subsequent reads.
    pub fn queue_bytes(&mut self, bytes: &[u8]) {
        self.stream.extend(bytes.iter().copied());
    }

    /// Queue the chip's fixed 6-byte acknowledge pattern.
    pub fn queue_ack(&mut self) {
        self.queue_bytes(&ACK_FRAME);
    }

    /// Queue a full response frame for `command`: the payload is framed with
    /// preamble, length, checksums and the chip->host direction byte, and the
    /// echoed command byte is `command + 1`.
    pub fn queue_response(&mut self, command: u8, data: &[u8]) {
        let mut payload = Vec::with_capacity(2 + data.len());
        payload.push(crate::constants::PN532_TO_HOST);
        payload.push(command.wrapping_add(1));
        payload.extend_from_slice(data);
        let frame = crate::transport::frame::encode_raw(&payload)
            .expect("mock response payload too large");
        self.queue_bytes(&frame);
    }

    /// Make the next `n` ready polls report "not ready" even if data is
    /// queued (simulates a slow chip for timeout tests).
    pub fn set_not_ready_polls(&mut self, n: usize) {
        self.not_ready_polls = n;
    }

    /// Make the next `n` reads fail with a bus error.
    pub fn set_read_failures(&mut self, n: usize) {
        self.read_failures = n;
    }

    /// Make the next `n` writes fail with a bus error.
    pub fn set_write_failures(&mut self, n: usize) {
        self.write_failures = n;
    }

    /// Bytes still queued and unread.
    pub fn remaining(&self) -> usize {
        self.stream.len()
    }

    /// Whether `init` has been called.
    pub fn init_called(&self) -> bool {
        self.init_called
    }

    /// Whether `wakeup` has been called.
    pub fn wakeup_called(&self) -> bool {
        self.wakeup_called
    }
}

impl Bus for MockBus {
    fn init(&mut self) -> Result<()> {
        self.init_called = true;
        Ok(())
    }

    fn wakeup(&mut self) -> Result<()> {
        self.wakeup_called = true;
        Ok(())
    }

    fn ready(&mut self) -> Result<bool> {
        if self.not_ready_polls > 0 {
            self.not_ready_polls -= 1;
            return Ok(false);
        }
        Ok(!self.stream.is_empty())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.read_failures > 0 {
            self.read_failures -= 1;
            return Err(Error::BusIo("mock read failure".to_string()));
        }
        if self.stream.len() < buf.len() {
            return Err(Error::BusIo("mock stream exhausted".to_string()));
        }
        for slot in buf.iter_mut() {
            *slot = self.stream.pop_front().unwrap_or_default();
        }
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if self.write_failures > 0 {
            self.write_failures -= 1;
            return Err(Error::BusIo("mock write failure".to_string()));
        }
        self.written.push(data.to_vec());
        Ok(())
    }
}

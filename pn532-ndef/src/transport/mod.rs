// pn532-ndef/src/transport/mod.rs

//! Frame transport: builds outbound command frames, waits for the chip's
//! acknowledge pattern, then polls for and validates the response frame.
//!
//! Blocking and single-threaded by design: suspension happens only in the
//! ACK-wait and response-wait loops, each bounded by an explicit timeout
//! (0 means wait indefinitely for responses; ACK waits always use the short
//! fixed bound). The frame assembly buffer is reused across calls, so two
//! operations must never be interleaved on one instance.

pub mod checksum;
pub mod frame;

pub use checksum::{dcs, lcs};

use std::thread;

use crate::bus::Bus;
use crate::constants::{
    ACK_FRAME, ACK_WAIT_MS, PN532_TO_HOST, PREAMBLE, READY_POLL_INTERVAL_MS, STARTCODE1,
    STARTCODE2,
};
use crate::diag::{Level, SharedSink, diag};
use crate::utils::ms;
use crate::{Error, Result};

/// Blocking frame transport over an abstract byte bus.
pub struct Transport {
    bus: Box<dyn Bus>,
    diag: SharedSink,
    frame_buf: Vec<u8>,
    last_command: u8,
}

impl Transport {
    /// Create a transport over the given bus with default diagnostics.
    pub fn new(bus: Box<dyn Bus>) -> Self {
        Self::with_diagnostics(bus, crate::diag::default_sink())
    }

    /// Create a transport with an injected diagnostics sink.
    pub fn with_diagnostics(bus: Box<dyn Bus>, diag: SharedSink) -> Self {
        Self {
            bus,
            diag,
            frame_buf: Vec::new(),
            last_command: 0,
        }
    }

    /// Bring the bus up and wake the chip.
    pub fn init(&mut self) -> Result<()> {
        self.bus.init()?;
        self.bus.wakeup()
    }

    /// The first header byte of the most recent send; the chip echoes this
    /// plus one in its response.
    pub fn last_command(&self) -> u8 {
        self.last_command
    }

    /// Emit one command frame carrying `header` then `body`, and wait for
    /// the chip's acknowledge pattern.
    pub fn send(&mut self, header: &[u8], body: &[u8]) -> Result<()> {
        let command = *header.first().ok_or(Error::InvalidLength {
            expected: 1,
            actual: 0,
        })?;
        self.last_command = command;

        self.frame_buf.clear();
        frame::encode_into(&mut self.frame_buf, header, body)?;

        diag!(
            self.diag,
            Level::Debug,
            "sending command {command:#04x} ({} byte frame)",
            self.frame_buf.len()
        );
        self.bus.write_all(&self.frame_buf)?;
        self.wait_ack()
    }

    fn wait_ack(&mut self) -> Result<()> {
        let mut waited = 0u64;
        while !self.bus.ready()? {
            thread::sleep(ms(READY_POLL_INTERVAL_MS));
            waited += READY_POLL_INTERVAL_MS;
            if waited > ACK_WAIT_MS {
                diag!(self.diag, Level::Warn, "ack wait timeout");
                return Err(Error::AckTimeout(ACK_WAIT_MS));
            }
        }

        let mut ack = [0u8; ACK_FRAME.len()];
        self.bus.read_exact(&mut ack)?;
        if ack != ACK_FRAME {
            diag!(self.diag, Level::Error, "invalid ack pattern");
            return Err(Error::AckTimeout(ACK_WAIT_MS));
        }
        Ok(())
    }

    /// Wait for and validate one response frame, returning the payload after
    /// the direction byte and the echoed command byte. Payloads longer than
    /// `max_len` are rejected before being read into the caller's hands.
    /// A `timeout_ms` of 0 waits indefinitely.
    pub fn receive(&mut self, max_len: usize, timeout_ms: u64) -> Result<Vec<u8>> {
        self.wait_ready(timeout_ms)?;

        let mut head = [0u8; 5];
        self.bus.read_exact(&mut head)?;
        if head[0] != PREAMBLE || head[1] != STARTCODE1 || head[2] != STARTCODE2 {
            return Err(Error::InvalidFrame("invalid frame header".into()));
        }

        let len = head[3];
        if len.wrapping_add(head[4]) != 0 {
            return Err(Error::ChecksumMismatch {
                expected: lcs(len),
                actual: head[4],
            });
        }
        if len < 2 {
            return Err(Error::InvalidFrame("declared length too short".into()));
        }

        // payload (direction + echoed command + data), then DCS + postamble
        let mut rest = vec![0u8; len as usize + 2];
        self.bus.read_exact(&mut rest)?;

        let tfi = rest[0];
        let echo = rest[1];
        if tfi != PN532_TO_HOST {
            return Err(Error::InvalidFrame("wrong direction byte".into()));
        }
        let expected_echo = self.last_command.wrapping_add(1);
        if echo != expected_echo {
            return Err(Error::UnexpectedResponse {
                expected: expected_echo,
                actual: echo,
            });
        }

        let data_len = len as usize - 2;
        if data_len > max_len {
            return Err(Error::BufferTooSmall {
                required: data_len,
                capacity: max_len,
            });
        }

        let payload = &rest[..len as usize];
        let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        let dcs_byte = rest[len as usize];
        if sum.wrapping_add(dcs_byte) != 0 {
            diag!(
                self.diag,
                Level::Error,
                "checksum mismatch (sum={sum:#04x}, chk={dcs_byte:#04x})"
            );
            return Err(Error::ChecksumMismatch {
                expected: dcs(payload),
                actual: dcs_byte,
            });
        }
        // trailing postamble byte in `rest` is discarded

        diag!(
            self.diag,
            Level::Debug,
            "response {echo:#04x}, {data_len} data bytes"
        );
        Ok(rest[2..len as usize].to_vec())
    }

    fn wait_ready(&mut self, timeout_ms: u64) -> Result<()> {
        let mut waited = 0u64;
        while !self.bus.ready()? {
            thread::sleep(ms(READY_POLL_INTERVAL_MS));
            waited += READY_POLL_INTERVAL_MS;
            if timeout_ms != 0 && waited > timeout_ms {
                diag!(self.diag, Level::Warn, "response wait timeout");
                return Err(Error::ResponseTimeout(timeout_ms));
            }
        }
        Ok(())
    }
}

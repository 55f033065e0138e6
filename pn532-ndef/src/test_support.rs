//! Test support helpers intended for use by unit and integration tests.
//!
//! These centralize common MockBus seeding so tests across the crate and
//! the tests/ directory can script identical wire conversations.
#![allow(dead_code)]
#![allow(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::{Bus, MockBus};
use crate::constants::{
    CMD_GET_FIRMWARE_VERSION, CMD_IN_DATA_EXCHANGE, CMD_IN_LIST_PASSIVE_TARGET,
    CMD_SAM_CONFIGURATION,
};
use crate::reader::Reader;
use crate::Result;

/// Queue one full exchange for `command`: the ACK to the outbound frame,
/// then a response frame carrying `data` after the echoed command byte.
pub fn seed_exchange(bus: &mut MockBus, command: u8, data: &[u8]) {
    bus.queue_ack();
    bus.queue_response(command, data);
}

/// InListPassiveTarget response for a single ISO14443A target with the
/// given UID (ATQA 0x0004, SAK 0x08).
pub fn inlist_response(uid: &[u8]) -> Vec<u8> {
    let mut resp = vec![0x01, 0x01, 0x00, 0x04, 0x08, uid.len() as u8];
    resp.extend_from_slice(uid);
    resp
}

/// Seed a successful target detection for `uid`.
pub fn seed_target_detection(bus: &mut MockBus, uid: &[u8]) {
    seed_exchange(bus, CMD_IN_LIST_PASSIVE_TARGET, &inlist_response(uid));
}

/// Seed the exchanges `Reader::begin` performs: firmware version probe and
/// SAM configuration.
pub fn seed_begin(bus: &mut MockBus) {
    seed_exchange(bus, CMD_GET_FIRMWARE_VERSION, &[0x32, 0x01, 0x06, 0x07]);
    seed_exchange(bus, CMD_SAM_CONFIGURATION, &[]);
}

/// Seed one successful InDataExchange with `payload` following the zero
/// status byte.
pub fn seed_data_exchange(bus: &mut MockBus, payload: &[u8]) {
    let mut data = vec![0x00];
    data.extend_from_slice(payload);
    seed_exchange(bus, CMD_IN_DATA_EXCHANGE, &data);
}

/// Seed a successful MIFARE authentication (empty success payload).
pub fn seed_auth_ok(bus: &mut MockBus) {
    seed_data_exchange(bus, &[]);
}

/// Seed one 16-byte block read.
pub fn seed_block_read(bus: &mut MockBus, block: &[u8; 16]) {
    seed_data_exchange(bus, block);
}

/// Seed one 4-byte page read (the chip pads reads to 16 bytes).
pub fn seed_page_read(bus: &mut MockBus, page: &[u8; 4]) {
    let mut padded = [0u8; 16];
    padded[..4].copy_from_slice(page);
    seed_data_exchange(bus, &padded);
}

/// Seed one successful write acknowledgement.
pub fn seed_write_ok(bus: &mut MockBus) {
    seed_data_exchange(bus, &[]);
}

/// Build a reader over a pre-seeded mock bus.
pub fn reader_with(bus: MockBus) -> Reader {
    Reader::new(Box::new(bus))
}

/// Bus wrapper delegating into a shared MockBus, so a test can keep a
/// handle to the mock after the driver has taken ownership of the bus.
pub struct SharedBus {
    inner: Rc<RefCell<MockBus>>,
}

impl SharedBus {
    pub fn new(inner: Rc<RefCell<MockBus>>) -> Self {
        Self { inner }
    }
}

impl Bus for SharedBus {
    fn init(&mut self) -> Result<()> {
        self.inner.borrow_mut().init()
    }

    fn wakeup(&mut self) -> Result<()> {
        self.inner.borrow_mut().wakeup()
    }

    fn ready(&mut self) -> Result<bool> {
        self.inner.borrow_mut().ready()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.borrow_mut().read_exact(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.inner.borrow_mut().write_all(data)
    }
}

/// Decode the frames recorded by a mock and return the InDataExchange
/// payloads (after the command byte and target number).
pub fn exchanged_payloads(mock: &MockBus) -> Vec<Vec<u8>> {
    mock.written
        .iter()
        .filter_map(|raw| crate::transport::frame::decode(raw).ok())
        .filter(|(_, data)| data.first() == Some(&CMD_IN_DATA_EXCHANGE))
        .map(|(_, data)| data[2..].to_vec())
        .collect()
}

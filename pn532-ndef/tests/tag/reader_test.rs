#[path = "../common/mod.rs"]
mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use common::fixtures;
use pn532_ndef::bus::MockBus;
use pn532_ndef::diag::MemorySink;
use pn532_ndef::reader::Reader;
use pn532_ndef::test_support::{
    exchanged_payloads, seed_auth_ok, seed_begin, seed_block_read, seed_page_read,
    seed_target_detection, seed_write_ok, SharedBus,
};
use pn532_ndef::{Error, TagType};

#[test]
fn begin_detect_and_read_classic_end_to_end() {
    let message = fixtures::uri_message();
    let image = fixtures::card_image(&message, 16);
    let blocks = fixtures::image_blocks(&image);

    let mut bus = MockBus::new();
    seed_begin(&mut bus);
    seed_target_detection(&mut bus, fixtures::classic_uid().as_bytes());
    seed_auth_ok(&mut bus);
    seed_block_read(&mut bus, &blocks[0]);
    seed_auth_ok(&mut bus);
    seed_block_read(&mut bus, &blocks[0]);
    seed_block_read(&mut bus, &blocks[1]);

    let mut reader = Reader::new(Box::new(bus));
    reader.begin().unwrap();

    let uid = reader.tag_available(100).unwrap();
    assert_eq!(uid, fixtures::classic_uid());
    assert_eq!(reader.tag_type(), TagType::MifareClassic);

    let tag = reader.read_tag().unwrap();
    assert_eq!(tag.message(), Some(&message));
}

#[test]
fn dispatch_by_uid_length_reaches_ultralight_engine() {
    let mut bus = MockBus::new();
    seed_target_detection(&mut bus, fixtures::type2_uid().as_bytes());
    seed_page_read(&mut bus, &[0xFF; 4]); // unformatted probe

    let mut reader = Reader::new(Box::new(bus));
    reader.tag_available(100).unwrap();
    assert_eq!(reader.tag_type(), TagType::Type2);

    let tag = reader.read_tag().unwrap();
    assert_eq!(tag.tag_type(), TagType::Type2);
    assert!(!tag.has_message());
}

#[test]
fn erase_writes_single_empty_record_message() {
    let inner = Rc::new(RefCell::new(MockBus::new()));
    {
        let mut bus = inner.borrow_mut();
        seed_target_detection(&mut bus, fixtures::classic_uid().as_bytes());
        seed_auth_ok(&mut bus);
        seed_write_ok(&mut bus); // one block is enough for the empty message
    }

    let mut reader = Reader::new(Box::new(SharedBus::new(inner.clone())));
    reader.tag_available(100).unwrap();
    reader.erase_tag().unwrap();

    let payloads = exchanged_payloads(&inner.borrow());
    let write = payloads
        .iter()
        .find(|p| p.first() == Some(&0xA0))
        .unwrap();
    assert_eq!(write[1], 4);
    // TLV wrapper around the canonical empty message: 03 03 D0 00 00 FE
    assert_eq!(&write[2..8], &[0x03, 0x03, 0xD0, 0x00, 0x00, 0xFE]);
    assert!(write[8..18].iter().all(|&b| b == 0));
}

#[test]
fn detection_failure_leaves_no_selected_tag() {
    let mut bus = MockBus::new();
    bus.queue_ack();
    bus.queue_response(
        pn532_ndef::constants::CMD_IN_LIST_PASSIVE_TARGET,
        &[0x00], // no targets
    );

    let mut reader = Reader::new(Box::new(bus));
    match reader.tag_available(100) {
        Err(Error::TagNotFound) => {}
        other => panic!("expected TagNotFound, got {:?}", other),
    }
    assert!(reader.uid().is_none());
    assert_eq!(reader.tag_type(), TagType::Unknown);
}

#[test]
fn release_forgets_the_selected_tag() {
    let mut bus = MockBus::new();
    seed_target_detection(&mut bus, fixtures::classic_uid().as_bytes());
    bus.queue_ack();
    bus.queue_response(pn532_ndef::constants::CMD_IN_RELEASE, &[0x00]);

    let mut reader = Reader::new(Box::new(bus));
    reader.tag_available(100).unwrap();
    assert!(reader.uid().is_some());

    reader.release().unwrap();
    assert!(reader.uid().is_none());
    assert!(matches!(reader.read_tag(), Err(Error::TagNotFound)));
}

#[test]
fn diagnostics_flow_through_injected_sink() {
    let mut bus = MockBus::new();
    seed_begin(&mut bus);

    let sink = Arc::new(MemorySink::new());
    let mut reader = Reader::with_diagnostics(Box::new(bus), sink.clone());
    reader.begin().unwrap();

    assert!(sink.contains("found chip PN532"));
    assert!(sink.contains("configuring SAM"));
}

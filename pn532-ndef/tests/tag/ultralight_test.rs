#[path = "../common/mod.rs"]
mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use common::fixtures;
use pn532_ndef::bus::MockBus;
use pn532_ndef::controller::Controller;
use pn532_ndef::diag::MemorySink;
use pn532_ndef::ndef::Tnf;
use pn532_ndef::tag::MifareUltralight;
use pn532_ndef::test_support::{exchanged_payloads, seed_page_read, seed_write_ok, SharedBus};
use pn532_ndef::{Error, TagType};

/// Capability container page with the given data-area capacity in bytes.
fn cc_page(capacity: usize) -> [u8; 4] {
    [0xE1, 0x10, (capacity / 8) as u8, 0x00]
}

#[test]
fn unformatted_tag_reads_as_tag_without_message() {
    let mut bus = MockBus::new();
    // page 4 erased to 0xFF; nothing further is seeded, so any extra read
    // would fail the test
    seed_page_read(&mut bus, &[0xFF; 4]);

    let sink = Arc::new(MemorySink::new());
    let mut controller = Controller::with_diagnostics(Box::new(bus), sink.clone());
    let tag = MifareUltralight::new(&mut controller)
        .read_tag(&fixtures::type2_uid())
        .unwrap();

    assert_eq!(tag.tag_type(), TagType::Type2);
    assert!(!tag.has_message());
    assert!(sink.contains("not formatted"));
}

#[test]
fn read_tag_with_tlv_at_offset_zero() {
    let message = fixtures::uri_message();
    let image = fixtures::card_image(&message, 4);
    let pages = fixtures::image_pages(&image);
    assert_eq!(pages.len(), 5);

    let mut bus = MockBus::new();
    seed_page_read(&mut bus, &pages[0]); // unformatted probe
    seed_page_read(&mut bus, &cc_page(48)); // capability container
    seed_page_read(&mut bus, &pages[0]); // tlv probe, page 4
    seed_page_read(&mut bus, &pages[1]); // tlv probe, page 5
    for page in &pages {
        seed_page_read(&mut bus, page); // sequential data walk
    }

    let mut controller = Controller::new(Box::new(bus));
    let uid = fixtures::type2_uid();
    let tag = MifareUltralight::new(&mut controller)
        .read_tag(&uid)
        .unwrap();

    assert_eq!(tag.uid(), &uid);
    assert_eq!(tag.message(), Some(&message));
}

#[test]
fn read_tag_with_tlv_at_offset_five() {
    // lock/CC overlap pushes the TLV five bytes into the data area
    let message = fixtures::text_message("a");
    let encoded = message.encode();
    assert_eq!(encoded.len(), 8);

    let mut image = vec![0u8; 16];
    image[0] = 0x44;
    image[5] = 0x03;
    image[6] = encoded.len() as u8;
    image[7..15].copy_from_slice(&encoded);
    image[15] = 0xFE;
    let pages = fixtures::image_pages(&image);

    let mut bus = MockBus::new();
    seed_page_read(&mut bus, &pages[0]);
    seed_page_read(&mut bus, &cc_page(48));
    seed_page_read(&mut bus, &pages[0]);
    seed_page_read(&mut bus, &pages[1]);
    for page in &pages {
        seed_page_read(&mut bus, page);
    }

    let mut controller = Controller::new(Box::new(bus));
    let tag = MifareUltralight::new(&mut controller)
        .read_tag(&fixtures::type2_uid())
        .unwrap();
    assert_eq!(tag.message(), Some(&message));
}

#[test]
fn empty_ndef_tlv_reads_as_single_empty_record() {
    let mut bus = MockBus::new();
    seed_page_read(&mut bus, &[0x03, 0x00, 0xFE, 0x00]); // not 0xFF-filled
    seed_page_read(&mut bus, &cc_page(48));
    seed_page_read(&mut bus, &[0x03, 0x00, 0xFE, 0x00]);
    seed_page_read(&mut bus, &[0x00; 4]);

    let mut controller = Controller::new(Box::new(bus));
    let tag = MifareUltralight::new(&mut controller)
        .read_tag(&fixtures::type2_uid())
        .unwrap();

    let message = tag.message().unwrap();
    assert_eq!(message.len(), 1);
    assert_eq!(message.record(0).unwrap().tnf(), Tnf::Empty);
}

#[test]
fn write_tag_stores_wrapped_pages() {
    let message = fixtures::uri_message();
    let image = fixtures::card_image(&message, 4);

    let inner = Rc::new(RefCell::new(MockBus::new()));
    {
        let mut bus = inner.borrow_mut();
        seed_page_read(&mut bus, &[0x03, 0x10, 0x00, 0x00]); // formatted
        seed_page_read(&mut bus, &cc_page(48));
        for _ in 0..image.len() / 4 {
            seed_write_ok(&mut bus);
        }
    }

    let mut controller = Controller::new(Box::new(SharedBus::new(inner.clone())));
    MifareUltralight::new(&mut controller)
        .write_tag(&message)
        .unwrap();

    let payloads = exchanged_payloads(&inner.borrow());
    let writes: Vec<_> = payloads
        .iter()
        .filter(|p| p.first() == Some(&0xA2))
        .collect();

    let written_pages: Vec<u8> = writes.iter().map(|p| p[1]).collect();
    assert_eq!(written_pages, vec![4, 5, 6, 7, 8]);
    for (i, write) in writes.iter().enumerate() {
        assert_eq!(&write[2..6], &image[i * 4..(i + 1) * 4]);
    }
}

#[test]
fn write_to_unformatted_tag_fails_fast() {
    let mut bus = MockBus::new();
    seed_page_read(&mut bus, &[0xFF; 4]);

    let mut controller = Controller::new(Box::new(bus));
    match MifareUltralight::new(&mut controller).write_tag(&fixtures::uri_message()) {
        Err(Error::TagUnformatted) => {}
        other => panic!("expected TagUnformatted, got {:?}", other),
    }
}

#[test]
fn write_beyond_capacity_is_rejected() {
    let mut bus = MockBus::new();
    seed_page_read(&mut bus, &[0x03, 0x10, 0x00, 0x00]);
    seed_page_read(&mut bus, &cc_page(16)); // tiny tag

    let mut controller = Controller::new(Box::new(bus));
    // needs a 20-byte buffer, tag reports 16
    match MifareUltralight::new(&mut controller).write_tag(&fixtures::uri_message()) {
        Err(Error::CapacityExceeded {
            needed: 20,
            capacity: 16,
        }) => {}
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }
}

#[test]
fn clean_zeroes_every_data_page() {
    let inner = Rc::new(RefCell::new(MockBus::new()));
    {
        let mut bus = inner.borrow_mut();
        seed_page_read(&mut bus, &cc_page(48));
        for _ in 0..12 {
            seed_write_ok(&mut bus);
        }
    }

    let mut controller = Controller::new(Box::new(SharedBus::new(inner.clone())));
    MifareUltralight::new(&mut controller).clean().unwrap();

    let payloads = exchanged_payloads(&inner.borrow());
    let writes: Vec<_> = payloads
        .iter()
        .filter(|p| p.first() == Some(&0xA2))
        .collect();
    assert_eq!(writes.len(), 12);

    let pages: Vec<u8> = writes.iter().map(|p| p[1]).collect();
    assert_eq!(pages, (4u8..16).collect::<Vec<_>>());
    assert!(writes.iter().all(|p| p[2..6] == [0, 0, 0, 0]));
}

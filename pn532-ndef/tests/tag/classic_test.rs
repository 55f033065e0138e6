#[path = "../common/mod.rs"]
mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::fixtures;
use pn532_ndef::bus::MockBus;
use pn532_ndef::controller::Controller;
use pn532_ndef::ndef::{Message, Tnf};
use pn532_ndef::tag::MifareClassic;
use pn532_ndef::test_support::{
    exchanged_payloads, seed_auth_ok, seed_block_read, seed_write_ok, SharedBus,
};
use pn532_ndef::{Error, TagType};

#[test]
fn read_tag_decodes_two_block_message() {
    let message = fixtures::uri_message();
    let image = fixtures::card_image(&message, 16);
    let blocks = fixtures::image_blocks(&image);
    assert_eq!(blocks.len(), 2);

    let mut bus = MockBus::new();
    // initial authenticate + tlv probe of block 4
    seed_auth_ok(&mut bus);
    seed_block_read(&mut bus, &blocks[0]);
    // sequential walk re-authenticates sector 1 and reads blocks 4 and 5
    seed_auth_ok(&mut bus);
    seed_block_read(&mut bus, &blocks[0]);
    seed_block_read(&mut bus, &blocks[1]);

    let mut controller = Controller::new(Box::new(bus));
    let uid = fixtures::classic_uid();
    let tag = MifareClassic::new(&mut controller).read_tag(&uid).unwrap();

    assert_eq!(tag.tag_type(), TagType::MifareClassic);
    assert_eq!(tag.uid(), &uid);
    assert_eq!(tag.message(), Some(&message));
}

#[test]
fn read_tag_with_null_padding_before_tlv() {
    let message = fixtures::uri_message();
    let encoded = message.encode();

    // two null TLVs, then the message TLV
    let mut image = vec![0u8; 32];
    image[2] = 0x03;
    image[3] = encoded.len() as u8;
    image[4..4 + encoded.len()].copy_from_slice(&encoded);
    image[4 + encoded.len()] = 0xFE;
    let blocks = fixtures::image_blocks(&image);

    let mut bus = MockBus::new();
    seed_auth_ok(&mut bus);
    seed_block_read(&mut bus, &blocks[0]);
    seed_auth_ok(&mut bus);
    seed_block_read(&mut bus, &blocks[0]);
    seed_block_read(&mut bus, &blocks[1]);

    let mut controller = Controller::new(Box::new(bus));
    let tag = MifareClassic::new(&mut controller)
        .read_tag(&fixtures::classic_uid())
        .unwrap();
    assert_eq!(tag.message(), Some(&message));
}

#[test]
fn unknown_tlv_aborts_read() {
    let mut junk = [0u8; 16];
    junk[0] = 0x44;

    let mut bus = MockBus::new();
    seed_auth_ok(&mut bus);
    seed_block_read(&mut bus, &junk);

    let mut controller = Controller::new(Box::new(bus));
    match MifareClassic::new(&mut controller).read_tag(&fixtures::classic_uid()) {
        Err(Error::UnknownTlv(0x44)) => {}
        other => panic!("expected UnknownTlv, got {:?}", other),
    }
}

#[test]
fn empty_ndef_tlv_reads_as_single_empty_record() {
    let mut block = [0u8; 16];
    block[0] = 0x03;
    block[1] = 0x00;
    block[2] = 0xFE;

    let mut bus = MockBus::new();
    seed_auth_ok(&mut bus);
    seed_block_read(&mut bus, &block);

    let mut controller = Controller::new(Box::new(bus));
    let tag = MifareClassic::new(&mut controller)
        .read_tag(&fixtures::classic_uid())
        .unwrap();

    let message = tag.message().unwrap();
    assert_eq!(message.len(), 1);
    assert_eq!(message.record(0).unwrap().tnf(), Tnf::Empty);
}

#[test]
fn failed_authentication_aborts_read() {
    let mut bus = MockBus::new();
    seed_data_exchange_error(&mut bus, 0x14);

    let mut controller = Controller::new(Box::new(bus));
    match MifareClassic::new(&mut controller).read_tag(&fixtures::classic_uid()) {
        Err(Error::AuthenticationFailed {
            block: 4,
            status: 0x14,
        }) => {}
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }
}

fn seed_data_exchange_error(bus: &mut MockBus, status: u8) {
    bus.queue_ack();
    bus.queue_response(pn532_ndef::constants::CMD_IN_DATA_EXCHANGE, &[status]);
}

#[test]
fn write_tag_skips_trailer_blocks() {
    // 63-byte record -> 66 bytes wrapped -> 80-byte buffer -> five blocks
    let mut message = Message::new();
    message
        .add_mime_media_record("text/plain", &[0x61; 50])
        .unwrap();
    let image = fixtures::card_image(&message, 16);
    assert_eq!(image.len(), 80);

    let inner = Rc::new(RefCell::new(MockBus::new()));
    {
        let mut bus = inner.borrow_mut();
        seed_auth_ok(&mut bus); // sector 1
        seed_write_ok(&mut bus); // block 4
        seed_write_ok(&mut bus); // block 5
        seed_write_ok(&mut bus); // block 6
        seed_auth_ok(&mut bus); // sector 2
        seed_write_ok(&mut bus); // block 8
        seed_write_ok(&mut bus); // block 9
    }

    let mut controller = Controller::new(Box::new(SharedBus::new(inner.clone())));
    MifareClassic::new(&mut controller)
        .write_tag(&message, &fixtures::classic_uid())
        .unwrap();

    let payloads = exchanged_payloads(&inner.borrow());
    let writes: Vec<_> = payloads
        .iter()
        .filter(|p| p.first() == Some(&0xA0))
        .collect();
    let written_blocks: Vec<u8> = writes.iter().map(|p| p[1]).collect();
    assert_eq!(written_blocks, vec![4, 5, 6, 8, 9]);

    // block contents follow the wrapped image in order
    for (i, write) in writes.iter().enumerate() {
        assert_eq!(&write[2..18], &image[i * 16..(i + 1) * 16]);
    }

    // two authentications, for sector 1 and sector 2
    let auths = payloads
        .iter()
        .filter(|p| p.first() == Some(&0x60))
        .count();
    assert_eq!(auths, 2);
}

#[test]
fn format_ndef_writes_mad_and_empty_message() {
    let inner = Rc::new(RefCell::new(MockBus::new()));
    {
        let mut bus = inner.borrow_mut();
        // sector 0: authenticate + three MAD blocks
        seed_auth_ok(&mut bus);
        for _ in 0..3 {
            seed_write_ok(&mut bus);
        }
        // data sectors 1..15: authenticate + four blocks each
        for _ in 0..15 {
            seed_auth_ok(&mut bus);
            for _ in 0..4 {
                seed_write_ok(&mut bus);
            }
        }
    }

    let mut controller = Controller::new(Box::new(SharedBus::new(inner.clone())));
    MifareClassic::new(&mut controller)
        .format_ndef(&fixtures::classic_uid())
        .unwrap();

    let payloads = exchanged_payloads(&inner.borrow());
    let writes: Vec<_> = payloads
        .iter()
        .filter(|p| p.first() == Some(&0xA0))
        .collect();

    // MAD trailer carries the public MAD key A
    let mad_trailer = writes.iter().find(|p| p[1] == 3).unwrap();
    assert_eq!(&mad_trailer[2..8], &[0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]);

    // block 4 receives the empty NDEF message
    let block4 = writes.iter().find(|p| p[1] == 4).unwrap();
    assert_eq!(&block4[2..8], &[0x03, 0x03, 0xD0, 0x00, 0x00, 0xFE]);

    // every data sector trailer gets the NDEF key A
    let trailer7 = writes.iter().find(|p| p[1] == 7).unwrap();
    assert_eq!(&trailer7[2..8], &[0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7]);
}

#[test]
fn clean_restores_factory_trailers() {
    let inner = Rc::new(RefCell::new(MockBus::new()));
    {
        let mut bus = inner.borrow_mut();
        // sector 0: authenticate + two data blocks + trailer
        seed_auth_ok(&mut bus);
        for _ in 0..3 {
            seed_write_ok(&mut bus);
        }
        // sectors 1..15: authenticate + three data blocks + trailer
        for _ in 0..15 {
            seed_auth_ok(&mut bus);
            for _ in 0..4 {
                seed_write_ok(&mut bus);
            }
        }
    }

    let mut controller = Controller::new(Box::new(SharedBus::new(inner.clone())));
    MifareClassic::new(&mut controller)
        .clean(&fixtures::classic_uid())
        .unwrap();

    let payloads = exchanged_payloads(&inner.borrow());

    // authentication uses key B for the wipe
    let auths = payloads
        .iter()
        .filter(|p| p.first() == Some(&0x61))
        .count();
    assert_eq!(auths, 16);

    // manufacturer block 0 is never written
    let writes: Vec<_> = payloads
        .iter()
        .filter(|p| p.first() == Some(&0xA0))
        .collect();
    assert!(writes.iter().all(|p| p[1] != 0));

    // trailer of sector 0 restored to factory keys and transport access bits
    let trailer3 = writes.iter().find(|p| p[1] == 3).unwrap();
    assert_eq!(&trailer3[2..8], &[0xFF; 6]);
    assert_eq!(&trailer3[8..12], &[0xFF, 0x07, 0x80, 0x69]);
}

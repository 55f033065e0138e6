//! Drive the full reader stack against a scripted mock bus: initialize the
//! chip, detect a MIFARE Classic tag, and decode the NDEF message on it.
//!
//! Run with `RUST_LOG=debug cargo run --example read_tag` to watch the
//! frame-level diagnostics.

use anyhow::Result;
use pn532_ndef::bus::MockBus;
use pn532_ndef::constants::uri_prefix;
use pn532_ndef::reader::Reader;
use pn532_ndef::tag::tlv;
use pn532_ndef::test_support::{
    seed_auth_ok, seed_begin, seed_block_read, seed_target_detection,
};
use pn532_ndef::{Message, Record, Tnf};

fn main() -> Result<()> {
    env_logger::init();

    let mut message = Message::new();
    message.add_uri_record("https://example.com")?;
    message.add_text_record("hello nfc")?;

    let mut bus = MockBus::new();
    seed_begin(&mut bus);
    seed_target_detection(&mut bus, &[0xDE, 0xAD, 0xBE, 0xEF]);
    script_classic_card(&mut bus, &message);

    let mut reader = Reader::new(Box::new(bus));
    reader.begin()?;

    let uid = reader.tag_available(1000)?;
    println!("tag in field: uid {}", uid.to_hex());

    let tag = reader.read_tag()?;
    match tag.message() {
        Some(message) => {
            println!("{} ndef record(s):", message.len());
            for (i, record) in message.records().iter().enumerate() {
                println!(
                    "  #{i}: tnf {:?}, type {:?}, {} payload byte(s)",
                    record.tnf(),
                    record.type_string(),
                    record.payload().len()
                );
                if let Some(uri) = render_uri(record) {
                    println!("       uri: {uri}");
                }
            }
        }
        None => println!("tag carries no ndef message"),
    }

    Ok(())
}

/// Expand a URI record's abbreviated payload back into the full URI.
fn render_uri(record: &Record) -> Option<String> {
    if record.tnf() != Tnf::WellKnown || record.record_type() != [0x55] {
        return None;
    }
    let payload = record.payload();
    let prefix = uri_prefix(*payload.first()?)?;
    let rest = String::from_utf8_lossy(&payload[1..]);
    Some(format!("{prefix}{rest}"))
}

/// Queue the block reads a MIFARE Classic read sequence will perform for
/// the given message.
fn script_classic_card(bus: &mut MockBus, message: &Message) {
    let encoded = message.encode();
    let mut size = encoded.len() + tlv::header_size(encoded.len()) + 1;
    if size % 16 != 0 {
        size = (size / 16 + 1) * 16;
    }
    let image = tlv::wrap(&encoded, size);

    let blocks: Vec<[u8; 16]> = image
        .chunks(16)
        .map(|c| {
            let mut block = [0u8; 16];
            block[..c.len()].copy_from_slice(c);
            block
        })
        .collect();

    // initial authenticate + tlv probe of block 4
    seed_auth_ok(bus);
    seed_block_read(bus, &blocks[0]);

    // sequential walk: re-authenticate each sector, skip trailer blocks
    let mut block_index = 0;
    let mut current = 4u32;
    while block_index < blocks.len() {
        if current % 4 == 0 {
            seed_auth_ok(bus);
        }
        seed_block_read(bus, &blocks[block_index]);
        block_index += 1;
        current += 1;
        if (current + 1) % 4 == 0 {
            current += 1;
        }
    }
}

use pn532_ndef::ndef::{Message, Record, Tnf};

#[test]
fn short_form_encoded_size_formula() {
    // encoded size = 2 + typeLen + payloadLen + 1 length byte
    let mut record = Record::new(Tnf::WellKnown);
    record.set_type(&[0x55]);
    record.set_payload(&[0u8; 200]);
    assert_eq!(record.encoded_size(), 2 + 1 + 1 + 200);
}

#[test]
fn long_form_adds_three_length_bytes() {
    let mut short = Record::new(Tnf::MimeMedia);
    short.set_type(b"application/octet-stream");
    short.set_payload(&[0u8; 255]);

    let mut long = short.clone();
    long.set_payload(&[0u8; 256]);

    assert_eq!(long.encoded_size(), short.encoded_size() + 1 + 3);
}

#[test]
fn id_contributes_one_length_byte_plus_bytes() {
    let mut record = Record::new(Tnf::WellKnown);
    record.set_type(&[0x54]);
    record.set_payload(b"data");
    let without_id = record.encoded_size();

    record.set_id(b"rec0");
    assert_eq!(record.encoded_size(), without_id + 1 + 4);
}

#[test]
fn long_form_top_length_bytes_are_always_zero() {
    // the encoder caps practical payloads at 65535 bytes by always
    // emitting zero in the top two length bytes
    let mut record = Record::new(Tnf::Unknown);
    record.set_payload(&vec![0xA5; 1000]);

    let mut out = Vec::new();
    record.encode_into(true, true, &mut out);
    assert_eq!(out[2], 0x00);
    assert_eq!(out[3], 0x00);
    assert_eq!(u16::from_be_bytes([out[4], out[5]]), 1000);
}

#[test]
fn long_form_record_roundtrips() {
    let mut message = Message::new();
    let mut record = Record::new(Tnf::MimeMedia);
    record.set_type(b"image/png");
    record.set_payload(&vec![0x42; 700]);
    message.add_record(record).unwrap();

    let decoded = Message::decode(&message.encode()).unwrap();
    assert_eq!(decoded, message);
    assert_eq!(decoded.record(0).unwrap().payload().len(), 700);
}

#[test]
fn type_renders_as_string() {
    let mut record = Record::new(Tnf::MimeMedia);
    record.set_type(b"text/plain");
    assert_eq!(record.type_string(), "text/plain");
}

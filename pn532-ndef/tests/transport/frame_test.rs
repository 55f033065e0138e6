use pn532_ndef::transport::frame;
use pn532_ndef::transport::{dcs, lcs};
use proptest::prelude::*;

#[test]
fn sam_configuration_frame_matches_known_wire_bytes() {
    // SAMConfiguration (normal mode, 1 s timeout, IRQ) as captured from a
    // real chip conversation.
    let expected = hex::decode("0000ff05fbd4140114010200").unwrap();
    let frame = frame::encode(&[0x14, 0x01, 0x14, 0x01], &[]).unwrap();
    assert_eq!(frame, expected);
}

#[test]
fn decode_recovers_header_and_body() {
    let header = [0x4A, 0x01, 0x00];
    let body = [0xAA, 0xBB, 0xCC];
    let frame = frame::encode(&header, &body).unwrap();

    let (dir, data) = frame::decode(&frame).unwrap();
    assert_eq!(dir, 0xD4);
    assert_eq!(&data[..3], &header);
    assert_eq!(&data[3..], &body);
}

proptest! {
    #[test]
    fn roundtrip_identity(header in prop::collection::vec(any::<u8>(), 1..8),
                          body in prop::collection::vec(any::<u8>(), 0..120)) {
        let frame = frame::encode(&header, &body).unwrap();
        let (_, data) = frame::decode(&frame).unwrap();
        let mut expected = header.clone();
        expected.extend_from_slice(&body);
        prop_assert_eq!(data, expected);
    }

    #[test]
    fn checksum_sums_to_zero(payload in prop::collection::vec(any::<u8>(), 1..200)) {
        // direction + payload + checksum is 0 mod 256
        let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        prop_assert_eq!(sum.wrapping_add(dcs(&payload)), 0);
    }

    #[test]
    fn length_checksum_sums_to_zero(len in any::<u8>()) {
        prop_assert_eq!(len.wrapping_add(lcs(len)), 0);
    }

    #[test]
    fn decode_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = frame::decode(&bytes);
    }
}

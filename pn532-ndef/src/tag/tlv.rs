// pn532-ndef/src/tag/tlv.rs

//! TLV wrapper handling for NDEF content in tag memory:
//! `0x03, LEN, message bytes, 0xFE`, with a 0xFF-marked long length form
//! for messages of 255 bytes or more.

use crate::constants::{TLV_NDEF_MESSAGE, TLV_NULL, TLV_TERMINATOR};
use crate::{Error, Result};

/// TLV header size in the short length form.
pub const SHORT_TLV_SIZE: usize = 2;
/// TLV header size in the long length form.
pub const LONG_TLV_SIZE: usize = 4;

/// Scan for the NDEF TLV tag. Null TLVs (0x00) are padding and skipped;
/// anything other than 0x00/0x03 aborts the scan.
pub fn ndef_start_index(data: &[u8]) -> Result<usize> {
    for (i, &byte) in data.iter().enumerate() {
        match byte {
            TLV_NULL => continue,
            TLV_NDEF_MESSAGE => return Ok(i),
            other => return Err(Error::UnknownTlv(other)),
        }
    }
    Err(Error::Decode("no ndef tlv found".to_string()))
}

/// Locate and parse the NDEF TLV header. Returns the message length and the
/// index of the first message byte. Only the low 16 bits of the long form
/// are meaningful.
pub fn parse(data: &[u8]) -> Result<(usize, usize)> {
    let i = ndef_start_index(data)?;

    let first = *data
        .get(i + 1)
        .ok_or_else(|| Error::Decode("truncated tlv header".to_string()))?;

    if first == 0xFF {
        let hi = *data
            .get(i + 2)
            .ok_or_else(|| Error::Decode("truncated tlv header".to_string()))?;
        let lo = *data
            .get(i + 3)
            .ok_or_else(|| Error::Decode("truncated tlv header".to_string()))?;
        let length = usize::from(hi) << 8 | usize::from(lo);
        Ok((length, i + LONG_TLV_SIZE))
    } else {
        Ok((first as usize, i + SHORT_TLV_SIZE))
    }
}

/// TLV header size needed for a message of `message_len` bytes.
pub fn header_size(message_len: usize) -> usize {
    if message_len < 0xFF {
        SHORT_TLV_SIZE
    } else {
        LONG_TLV_SIZE
    }
}

/// Build a zero-padded buffer of `buffer_size` bytes holding the TLV
/// header, the message, and the terminator.
pub fn wrap(message: &[u8], buffer_size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; buffer_size];
    buf[0] = TLV_NDEF_MESSAGE;
    let start = if message.len() < 0xFF {
        buf[1] = message.len() as u8;
        SHORT_TLV_SIZE
    } else {
        buf[1] = 0xFF;
        buf[2] = (message.len() >> 8) as u8;
        buf[3] = message.len() as u8;
        LONG_TLV_SIZE
    };
    buf[start..start + message.len()].copy_from_slice(message);
    buf[start + message.len()] = TLV_TERMINATOR;
    buf
}

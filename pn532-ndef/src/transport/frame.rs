// pn532-ndef/src/transport/frame.rs

use crate::constants::{
    HOST_TO_PN532, POSTAMBLE, PREAMBLE, STARTCODE1, STARTCODE2,
};
use crate::transport::checksum::{dcs, lcs};
use crate::{Error, Result};

/// Wire format:
/// `[Preamble] [Start1] [Start2] [Len] [LCS] [Dir] [data...] [DCS] [Postamble]`
/// where `Len` counts the direction byte plus data, `LCS = (~Len + 1) & 0xFF`
/// and `DCS = (~(Dir + sum(data)) + 1) & 0xFF`.
///
/// Minimal frame length: preamble(3) + len(1) + lcs(1) + dir(1) + dcs(1) +
/// postamble(1).
pub const MIN_FRAME_LEN: usize = 8;

/// Encode a host->chip frame carrying `header` followed by `body` and append
/// it to `out`. The split exists because callers assemble a fixed command
/// header and a variable payload without concatenating them first.
pub fn encode_into(out: &mut Vec<u8>, header: &[u8], body: &[u8]) -> Result<()> {
    let data_len = header.len() + body.len();
    if data_len + 1 > 0xFF {
        return Err(Error::InvalidLength {
            expected: 0xFE,
            actual: data_len,
        });
    }

    let len = (data_len + 1) as u8;
    out.reserve(MIN_FRAME_LEN + data_len);
    out.push(PREAMBLE);
    out.push(STARTCODE1);
    out.push(STARTCODE2);
    out.push(len);
    out.push(lcs(len));
    out.push(HOST_TO_PN532);

    let mut sum = HOST_TO_PN532;
    for &b in header.iter().chain(body.iter()) {
        out.push(b);
        sum = sum.wrapping_add(b);
    }

    out.push(0u8.wrapping_sub(sum));
    out.push(POSTAMBLE);
    Ok(())
}

/// Encode a host->chip frame into a fresh buffer.
pub fn encode(header: &[u8], body: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(&mut out, header, body)?;
    Ok(out)
}

/// Frame an arbitrary payload verbatim, direction byte included. Used to
/// build chip->host frames for fixtures and the mock bus.
pub fn encode_raw(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > 0xFF {
        return Err(Error::InvalidLength {
            expected: 0xFF,
            actual: payload.len(),
        });
    }

    let len = payload.len() as u8;
    let mut out = Vec::with_capacity(MIN_FRAME_LEN - 1 + payload.len());
    out.push(PREAMBLE);
    out.push(STARTCODE1);
    out.push(STARTCODE2);
    out.push(len);
    out.push(lcs(len));
    out.extend_from_slice(payload);
    out.push(dcs(payload));
    out.push(POSTAMBLE);
    Ok(out)
}

/// Decode a full frame, validating preamble, start codes, both checksums and
/// the postamble. Returns the direction byte and the data after it.
pub fn decode(frame: &[u8]) -> Result<(u8, Vec<u8>)> {
    if frame.len() < MIN_FRAME_LEN - 1 {
        return Err(Error::InvalidLength {
            expected: MIN_FRAME_LEN - 1,
            actual: frame.len(),
        });
    }

    if frame[0] != PREAMBLE || frame[1] != STARTCODE1 || frame[2] != STARTCODE2 {
        return Err(Error::InvalidFrame("invalid preamble".into()));
    }

    let len = frame[3];
    let lcs_actual = frame[4];
    if len.wrapping_add(lcs_actual) != 0 {
        return Err(Error::ChecksumMismatch {
            expected: lcs(len),
            actual: lcs_actual,
        });
    }
    if len == 0 {
        return Err(Error::InvalidFrame("empty frame payload".into()));
    }

    let required = 5 + len as usize + 2;
    if frame.len() != required {
        return Err(Error::InvalidLength {
            expected: required,
            actual: frame.len(),
        });
    }

    let payload = &frame[5..5 + len as usize];
    let dcs_actual = frame[5 + len as usize];
    let dcs_expected = dcs(payload);
    if dcs_actual != dcs_expected {
        return Err(Error::ChecksumMismatch {
            expected: dcs_expected,
            actual: dcs_actual,
        });
    }

    if frame[required - 1] != POSTAMBLE {
        return Err(Error::InvalidFrame("invalid postamble".into()));
    }

    Ok((payload[0], payload[1..].to_vec()))
}

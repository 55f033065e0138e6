// pn532-ndef/src/error.rs

use thiserror::Error;

/// Common error type for every layer of the driver.
#[derive(Error, Debug)]
pub enum Error {
    #[error("bus i/o error: {0}")]
    BusIo(String),

    #[error("no ack within {0} ms")]
    AckTimeout(u64),

    #[error("no response within {0} ms")]
    ResponseTimeout(u64),

    #[error("frame format error: {0}")]
    InvalidFrame(String),

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("unexpected response code: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedResponse { expected: u8, actual: u8 },

    #[error("response needs {required} bytes but only {capacity} are available")]
    BufferTooSmall { required: usize, capacity: usize },

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("authentication failed for block {block}: status {status:#04x}")]
    AuthenticationFailed { block: u8, status: u8 },

    #[error("data exchange failed: status {status:#04x}")]
    ExchangeStatus { status: u8 },

    #[error("no target in field")]
    TagNotFound,

    #[error("tag is not ndef formatted")]
    TagUnformatted,

    #[error("message needs {needed} bytes but tag capacity is {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("ndef decode error: {0}")]
    Decode(String),

    #[error("unknown tlv tag {0:#04x}")]
    UnknownTlv(u8),

    #[error("message already holds the maximum number of records")]
    MessageFull,

    #[error("felica error: status=({status1:#04x}, {status2:#04x})")]
    FelicaStatus { status1: u8, status2: u8 },

    #[error("page {0} out of range")]
    PageOutOfRange(u8),

    #[error("unsupported tag type (uid length {0})")]
    UnsupportedTag(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

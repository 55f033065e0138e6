// pn532-ndef/src/prelude.rs

//! Convenience re-exports for the common driver surface.

pub use crate::bus::{Bus, MockBus};
pub use crate::controller::Controller;
pub use crate::diag::{DiagSink, LogSink, MemorySink, NullSink};
pub use crate::ndef::{Message, Record, Tnf};
pub use crate::reader::Reader;
pub use crate::tag::{MifareClassic, MifareUltralight, NfcTag};
pub use crate::{
    BlockData, Error, FirmwareVersion, Idm, KeyType, MifareKey, Pmm, Result, ServiceCode,
    SystemCode, TagType, Uid,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, ms, parse_hex};

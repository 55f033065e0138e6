// pn532-ndef/src/tag/mod.rs

//! Tag memory layout engines: map a linear NDEF byte stream onto a card's
//! physical block/page geometry.

pub mod mifare_classic;
pub mod mifare_ultralight;
pub mod tlv;

pub use mifare_classic::MifareClassic;
pub use mifare_ultralight::MifareUltralight;

use crate::ndef::Message;
use crate::types::{TagType, Uid};

/// A tag that was read from the field: its UID, detected technology, and
/// the NDEF message found on it (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct NfcTag {
    uid: Uid,
    tag_type: TagType,
    message: Option<Message>,
}

impl NfcTag {
    /// A tag with no NDEF content.
    pub fn new(uid: Uid, tag_type: TagType) -> Self {
        Self {
            uid,
            tag_type,
            message: None,
        }
    }

    /// A tag carrying a decoded NDEF message.
    pub fn with_message(uid: Uid, tag_type: TagType, message: Message) -> Self {
        Self {
            uid,
            tag_type,
            message: Some(message),
        }
    }

    /// The tag's UID.
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// The detected technology.
    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    /// The NDEF message, if one was found.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Whether the tag carried an NDEF message.
    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }

    /// Consume the tag, returning its message.
    pub fn into_message(self) -> Option<Message> {
        self.message
    }
}

// pn532-ndef/src/ndef/mod.rs

//! NDEF message and record codec, independent of any tag technology.

pub mod message;
pub mod record;

pub use message::Message;
pub use record::{Record, Tnf};

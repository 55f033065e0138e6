// pn532-ndef/src/reader.rs

//! Technology-agnostic reader facade: detects a tag, dispatches on its UID
//! length to the matching layout engine, and exposes read / write / format /
//! erase / clean operations.

use crate::bus::Bus;
use crate::constants::BAUD_ISO14443A;
use crate::controller::Controller;
use crate::diag::{Level, SharedSink, diag};
use crate::ndef::Message;
use crate::tag::{MifareClassic, MifareUltralight, NfcTag};
use crate::types::{FirmwareVersion, TagType, Uid};
use crate::utils::DEFAULT_COMMAND_TIMEOUT_MS;
use crate::{Error, Result};

/// High-level PN532 reader.
pub struct Reader {
    controller: Controller,
    diag: SharedSink,
    uid: Option<Uid>,
    firmware: Option<FirmwareVersion>,
}

impl Reader {
    /// Create a reader over the given bus with default diagnostics.
    pub fn new(bus: Box<dyn Bus>) -> Self {
        Self::with_diagnostics(bus, crate::diag::default_sink())
    }

    /// Create a reader with an injected diagnostics sink shared by every
    /// layer underneath.
    pub fn with_diagnostics(bus: Box<dyn Bus>, diag: SharedSink) -> Self {
        Self {
            controller: Controller::with_diagnostics(bus, diag.clone()),
            diag,
            uid: None,
            firmware: None,
        }
    }

    /// Initialize the bus, verify the chip responds, and configure the SAM
    /// for tag reading.
    pub fn begin(&mut self) -> Result<()> {
        self.controller.begin()?;

        let fw = self.controller.firmware_version()?;
        diag!(
            self.diag,
            Level::Info,
            "found chip PN5{:02X}, firmware {}.{}",
            fw.ic,
            fw.version,
            fw.revision
        );
        self.firmware = Some(fw);

        self.controller.sam_config()
    }

    /// Firmware version captured by `begin`.
    pub fn firmware_version(&self) -> Option<FirmwareVersion> {
        self.firmware
    }

    /// UID of the currently selected tag, if any.
    pub fn uid(&self) -> Option<&Uid> {
        self.uid.as_ref()
    }

    /// Technology of the currently selected tag.
    pub fn tag_type(&self) -> TagType {
        match &self.uid {
            Some(uid) => TagType::from_uid_len(uid.len()),
            None => TagType::Unknown,
        }
    }

    /// Wait for an ISO14443A tag to enter the field and select it. A
    /// timeout of 0 uses the default command timeout.
    pub fn tag_available(&mut self, timeout_ms: u64) -> Result<Uid> {
        self.uid = None;
        let timeout = if timeout_ms == 0 {
            DEFAULT_COMMAND_TIMEOUT_MS
        } else {
            timeout_ms
        };
        let uid = self
            .controller
            .read_passive_target_id(BAUD_ISO14443A, timeout)?;
        self.uid = Some(uid.clone());
        Ok(uid)
    }

    fn current_uid(&self) -> Result<Uid> {
        self.uid.clone().ok_or(Error::TagNotFound)
    }

    /// Read the selected tag and decode any NDEF message stored on it.
    pub fn read_tag(&mut self) -> Result<NfcTag> {
        let uid = self.current_uid()?;
        match TagType::from_uid_len(uid.len()) {
            TagType::Type2 => {
                diag!(self.diag, Level::Info, "card type mifare ultralight");
                MifareUltralight::new(&mut self.controller).read_tag(&uid)
            }
            TagType::MifareClassic => {
                diag!(self.diag, Level::Info, "card type mifare classic");
                MifareClassic::new(&mut self.controller).read_tag(&uid)
            }
            TagType::Unknown => {
                diag!(
                    self.diag,
                    Level::Warn,
                    "no driver for uid length {}",
                    uid.len()
                );
                Ok(NfcTag::new(uid, TagType::Unknown))
            }
        }
    }

    /// Write an NDEF message to the selected tag.
    pub fn write_tag(&mut self, message: &Message) -> Result<()> {
        let uid = self.current_uid()?;
        match TagType::from_uid_len(uid.len()) {
            TagType::Type2 => MifareUltralight::new(&mut self.controller).write_tag(message),
            TagType::MifareClassic => {
                MifareClassic::new(&mut self.controller).write_tag(message, &uid)
            }
            TagType::Unknown => Err(Error::UnsupportedTag(uid.len())),
        }
    }

    /// NDEF-format a factory-fresh MIFARE Classic card.
    pub fn format_tag(&mut self) -> Result<()> {
        let uid = self.current_uid()?;
        match TagType::from_uid_len(uid.len()) {
            TagType::MifareClassic => MifareClassic::new(&mut self.controller).format_ndef(&uid),
            _ => Err(Error::UnsupportedTag(uid.len())),
        }
    }

    /// Erase the selected tag's content by writing a message holding a
    /// single empty record.
    pub fn erase_tag(&mut self) -> Result<()> {
        let mut message = Message::new();
        message.add_empty_record()?;
        self.write_tag(&message)
    }

    /// Restore the selected tag to its pre-NDEF state: factory keys and
    /// zeroed blocks on Classic, zeroed data pages on Ultralight.
    pub fn clean_tag(&mut self) -> Result<()> {
        let uid = self.current_uid()?;
        match TagType::from_uid_len(uid.len()) {
            TagType::Type2 => MifareUltralight::new(&mut self.controller).clean(),
            TagType::MifareClassic => MifareClassic::new(&mut self.controller).clean(&uid),
            TagType::Unknown => Err(Error::UnsupportedTag(uid.len())),
        }
    }

    /// Release the selected tag and forget its UID.
    pub fn release(&mut self) -> Result<()> {
        self.controller.release(0)?;
        self.uid = None;
        Ok(())
    }

    /// Direct access to the command layer for callers that need the raw
    /// command surface (FeliCa operations, custom exchanges).
    pub fn controller(&mut self) -> &mut Controller {
        &mut self.controller
    }
}

// pn532-ndef/src/tag/mifare_ultralight.rs

//! MIFARE Ultralight / NFC Forum Type 2 layout engine. Data pages are 4
//! bytes and start at page 4; usable capacity comes from the capability
//! container in page 3. The NDEF TLV sits at the start of page 4, or 5
//! bytes in when lock/CC bytes overlap the data area.

use crate::controller::Controller;
use crate::diag::{Level, diag};
use crate::ndef::Message;
use crate::tag::{NfcTag, tlv};
use crate::types::{TagType, Uid};
use crate::{Error, Result};

/// Page size in bytes.
pub const PAGE_SIZE: usize = 4;

/// First data page; pages 0..3 hold the UID, lock bytes and the CC.
const DATA_START_PAGE: u8 = 4;

/// Capability container page.
const CC_PAGE: u8 = 3;

/// Upper bound on the page walk.
const MAX_PAGE: u8 = 63;

/// MIFARE Ultralight engine borrowing the command layer for one operation.
pub struct MifareUltralight<'a> {
    controller: &'a mut Controller,
}

impl<'a> MifareUltralight<'a> {
    /// Borrow the controller for a sequence of Ultralight operations.
    pub fn new(controller: &'a mut Controller) -> Self {
        Self { controller }
    }

    /// Buffer size for a message of `message_length` bytes starting at
    /// `start`: message + TLV overhead rounded up to whole pages.
    pub fn buffer_size(message_length: usize, start: usize) -> usize {
        let mut size = message_length + start + 1; // terminator
        if size % PAGE_SIZE != 0 {
            size = (size / PAGE_SIZE + 1) * PAGE_SIZE;
        }
        size
    }

    /// A factory-fresh tag has page 4 erased to all 0xFF.
    fn is_unformatted(&mut self) -> Result<bool> {
        let page = self.controller.ultralight_read_page(DATA_START_PAGE)?;
        Ok(page == [0xFF; 4])
    }

    /// Usable NDEF capacity in bytes, from the capability container.
    fn tag_capacity(&mut self) -> Result<usize> {
        let cc = self.controller.ultralight_read_page(CC_PAGE)?;
        let capacity = usize::from(cc[2]) * 8;
        diag!(
            self.controller.diag(),
            Level::Debug,
            "tag capacity {capacity} bytes"
        );
        Ok(capacity)
    }

    /// Probe pages 4..5 for the NDEF TLV at offset 0 or offset 5. Returns
    /// the message length and the message's offset into the data area.
    fn find_ndef_message(&mut self) -> Result<(usize, usize)> {
        let mut data = [0u8; 2 * PAGE_SIZE];
        for (n, page) in (DATA_START_PAGE..DATA_START_PAGE + 2).enumerate() {
            let bytes = self.controller.ultralight_read_page(page)?;
            data[n * PAGE_SIZE..(n + 1) * PAGE_SIZE].copy_from_slice(&bytes);
        }

        let (message_length, start) = if data[0] == 0x03 {
            (data[1] as usize, 2)
        } else if data[5] == 0x03 {
            (data[6] as usize, 7)
        } else {
            return Err(Error::Decode("no ndef tlv in data pages".to_string()));
        };

        diag!(
            self.controller.diag(),
            Level::Debug,
            "message length {message_length}, ndef start {start}"
        );
        Ok((message_length, start))
    }

    /// Read the NDEF message stored on the tag. An unformatted tag yields a
    /// tag with no message and no further page reads.
    pub fn read_tag(&mut self, uid: &Uid) -> Result<NfcTag> {
        if self.is_unformatted()? {
            diag!(self.controller.diag(), Level::Warn, "tag is not formatted");
            return Ok(NfcTag::new(uid.clone(), TagType::Type2));
        }

        self.tag_capacity()?;
        let (message_length, start) = self.find_ndef_message()?;

        if message_length == 0 {
            // NDEF TLV present but empty (e.g. 03 00 FE): single empty record
            let mut message = Message::new();
            message.add_empty_record()?;
            return Ok(NfcTag::with_message(uid.clone(), TagType::Type2, message));
        }

        let buffer_size = Self::buffer_size(message_length, start);
        let mut buffer = vec![0u8; buffer_size];
        let mut index = 0;
        let mut page = DATA_START_PAGE;
        while index < buffer.len() {
            let bytes = self.controller.ultralight_read_page(page)?;
            buffer[index..index + PAGE_SIZE].copy_from_slice(&bytes);

            // stop early once enough bytes for the message are in hand
            if index >= message_length + start {
                break;
            }
            index += PAGE_SIZE;
            page += 1;
            if page >= MAX_PAGE {
                break;
            }
        }

        let message = Message::decode(&buffer[start..start + message_length])?;
        Ok(NfcTag::with_message(uid.clone(), TagType::Type2, message))
    }

    /// Write an NDEF message to the tag, page by page from page 4.
    pub fn write_tag(&mut self, message: &Message) -> Result<()> {
        if self.is_unformatted()? {
            diag!(self.controller.diag(), Level::Error, "tag is not formatted");
            return Err(Error::TagUnformatted);
        }

        let capacity = self.tag_capacity()?;
        let encoded = message.encode();
        let start = tlv::header_size(encoded.len());
        let buffer_size = Self::buffer_size(encoded.len(), start);

        if buffer_size > capacity {
            return Err(Error::CapacityExceeded {
                needed: buffer_size,
                capacity,
            });
        }

        let buffer = tlv::wrap(&encoded, buffer_size);
        diag!(
            self.controller.diag(),
            Level::Debug,
            "writing {} encoded bytes ({} pages)",
            encoded.len(),
            buffer.len() / PAGE_SIZE
        );

        let mut page = DATA_START_PAGE;
        for chunk in buffer.chunks_exact(PAGE_SIZE) {
            let mut bytes = [0u8; PAGE_SIZE];
            bytes.copy_from_slice(chunk);
            self.controller.ultralight_write_page(page, &bytes)?;
            page += 1;
        }
        Ok(())
    }

    /// Zero every data page up to the tag's reported capacity. Factory tags
    /// ship with 0xFF, but the OTP/CC bytes are already burnt so zeros are
    /// written instead.
    pub fn clean(&mut self) -> Result<()> {
        let capacity = self.tag_capacity()?;
        let pages = capacity / PAGE_SIZE + usize::from(DATA_START_PAGE);

        for page in usize::from(DATA_START_PAGE)..pages {
            self.controller
                .ultralight_write_page(page as u8, &[0u8; 4])?;
        }
        Ok(())
    }
}

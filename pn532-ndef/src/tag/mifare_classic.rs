// pn532-ndef/src/tag/mifare_classic.rs

//! MIFARE Classic layout engine. Data blocks are 16 bytes; sectors 0..31
//! hold 4 blocks each and sectors from 32 on hold 16. The last block of
//! every sector is the trailer (keys + access bits) and is never used for
//! data. NDEF content lives from block 4 on, with the MAD sector (blocks
//! 0..3) reserved.

use crate::controller::Controller;
use crate::diag::{Level, diag};
use crate::ndef::Message;
use crate::tag::{NfcTag, tlv};
use crate::types::{BlockData, KeyType, MifareKey, TagType, Uid};
use crate::Result;

/// Block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// First NDEF data block; blocks 0..3 hold manufacturer data and the MAD.
const DATA_START_BLOCK: u32 = 4;

/// Block index where the 16-block sectors begin (32 sectors x 4 blocks).
const LONG_SECTOR_START: u32 = 128;

// Canonical MAD sector for an NDEF-formatted 1K card (blocks 1..3).
const MAD_BLOCK_1: [u8; 16] = [
    0x14, 0x01, 0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03,
    0xE1,
];
const MAD_BLOCK_2: [u8; 16] = [
    0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03, 0xE1, 0x03,
    0xE1,
];
const MAD_TRAILER: [u8; 16] = [
    0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0x78, 0x77, 0x88, 0xC1, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF,
];

/// An NDEF TLV with a zero-length empty message, as written into block 4 by
/// the NDEF format operation.
const EMPTY_NDEF_BLOCK: [u8; 16] = [
    0x03, 0x03, 0xD0, 0x00, 0x00, 0xFE, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00,
];

/// Trailer for NDEF data sectors: key A = NDEF data key, NDEF access bits,
/// key B = factory default.
const NDEF_TRAILER: [u8; 16] = [
    0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7, 0x7F, 0x07, 0x88, 0x40, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF,
];

/// Trailer for a factory-reset sector: both keys default, transport access
/// bits.
const FACTORY_TRAILER: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x80, 0x69, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF,
];

/// MIFARE Classic 1K: 16 sectors of 4 blocks.
const SECTORS_1K: u32 = 16;

/// MIFARE Classic engine borrowing the command layer for one operation.
pub struct MifareClassic<'a> {
    controller: &'a mut Controller,
}

impl<'a> MifareClassic<'a> {
    /// Borrow the controller for a sequence of classic operations.
    pub fn new(controller: &'a mut Controller) -> Self {
        Self { controller }
    }

    /// True if `block` is the first block of its sector.
    pub fn is_first_block(block: u32) -> bool {
        if block < LONG_SECTOR_START {
            block % 4 == 0
        } else {
            block % 16 == 0
        }
    }

    /// True if `block` is the last block of its sector (the trailer).
    pub fn is_trailer_block(block: u32) -> bool {
        if block < LONG_SECTOR_START {
            (block + 1) % 4 == 0
        } else {
            (block + 1) % 16 == 0
        }
    }

    /// Trailer block number for a sector.
    pub fn sector_trailer_block(sector: u32) -> u32 {
        if sector < 32 {
            sector * 4 + 3
        } else {
            LONG_SECTOR_START + (sector - 32) * 16 + 15
        }
    }

    /// Bytes needed on the card for a message of `message_length` bytes:
    /// TLV header plus terminator, rounded up to a whole number of blocks.
    pub fn buffer_size(message_length: usize) -> usize {
        let mut size = message_length + tlv::header_size(message_length) + 1;
        if size % BLOCK_SIZE != 0 {
            size = (size / BLOCK_SIZE + 1) * BLOCK_SIZE;
        }
        size
    }

    fn authenticate(&mut self, uid: &Uid, block: u32, key: &MifareKey) -> Result<()> {
        self.controller
            .mifare_authenticate_block(uid, block as u8, KeyType::A, key)
    }

    /// Read the NDEF message stored on the card. Walks blocks sequentially
    /// from block 4, re-authenticating at each sector boundary and skipping
    /// trailer blocks.
    pub fn read_tag(&mut self, uid: &Uid) -> Result<NfcTag> {
        let key = MifareKey::NDEF_DATA;
        let mut current = DATA_START_BLOCK;

        self.authenticate(uid, current, &key)?;
        let first = self.controller.mifare_read_block(current as u8)?;
        let (message_length, start) = tlv::parse(first.as_bytes())?;

        if message_length == 0 {
            // NDEF TLV present but empty: report a single empty record
            let mut message = Message::new();
            message.add_empty_record()?;
            return Ok(NfcTag::with_message(
                uid.clone(),
                TagType::MifareClassic,
                message,
            ));
        }

        let buffer_size = Self::buffer_size(message_length);
        diag!(
            self.controller.diag(),
            Level::Info,
            "reading ndef message: {message_length} bytes, {buffer_size} byte buffer"
        );

        let mut buffer = vec![0u8; buffer_size];
        let mut index = 0;
        while index < buffer_size {
            if Self::is_first_block(current) {
                self.authenticate(uid, current, &key)?;
            }

            let block = self.controller.mifare_read_block(current as u8)?;
            buffer[index..index + BLOCK_SIZE].copy_from_slice(block.as_bytes());
            index += BLOCK_SIZE;
            current += 1;

            if Self::is_trailer_block(current) {
                diag!(
                    self.controller.diag(),
                    Level::Debug,
                    "skipping trailer block {current}"
                );
                current += 1;
            }
        }

        let message = Message::decode(&buffer[start..start + message_length])?;
        Ok(NfcTag::with_message(
            uid.clone(),
            TagType::MifareClassic,
            message,
        ))
    }

    /// Write an NDEF message to the card, starting at block 4.
    pub fn write_tag(&mut self, message: &Message, uid: &Uid) -> Result<()> {
        let encoded = message.encode();
        let buffer = tlv::wrap(&encoded, Self::buffer_size(encoded.len()));
        let key = MifareKey::NDEF_DATA;

        diag!(
            self.controller.diag(),
            Level::Debug,
            "writing {} encoded bytes into {} card bytes",
            encoded.len(),
            buffer.len()
        );

        let mut current = DATA_START_BLOCK;
        let mut index = 0;
        while index < buffer.len() {
            if Self::is_first_block(current) {
                self.authenticate(uid, current, &key)?;
            }

            let block = BlockData::try_from(&buffer[index..index + BLOCK_SIZE])?;
            self.controller.mifare_write_block(current as u8, &block)?;
            index += BLOCK_SIZE;
            current += 1;

            if Self::is_trailer_block(current) {
                current += 1;
            }
        }
        Ok(())
    }

    /// Format a factory-fresh card for NDEF: write the MAD sector, then
    /// give every data sector an empty NDEF TLV (block 4), zeroed data
    /// blocks and the NDEF trailer.
    pub fn format_ndef(&mut self, uid: &Uid) -> Result<()> {
        let factory = MifareKey::FACTORY_DEFAULT;

        self.authenticate(uid, 0, &factory)?;
        self.controller
            .mifare_write_block(1, &BlockData::from_bytes(MAD_BLOCK_1))?;
        self.controller
            .mifare_write_block(2, &BlockData::from_bytes(MAD_BLOCK_2))?;
        self.controller
            .mifare_write_block(3, &BlockData::from_bytes(MAD_TRAILER))?;

        let zeros = BlockData::from_bytes([0u8; 16]);
        for first in (DATA_START_BLOCK..SECTORS_1K * 4).step_by(4) {
            self.authenticate(uid, first, &factory)?;

            let head = if first == DATA_START_BLOCK {
                BlockData::from_bytes(EMPTY_NDEF_BLOCK)
            } else {
                zeros
            };
            self.controller.mifare_write_block(first as u8, &head)?;
            self.controller
                .mifare_write_block(first as u8 + 1, &zeros)?;
            self.controller
                .mifare_write_block(first as u8 + 2, &zeros)?;
            self.controller
                .mifare_write_block(first as u8 + 3, &BlockData::from_bytes(NDEF_TRAILER))?;
        }
        Ok(())
    }

    /// Reset a 1K card to its factory state: zero the data blocks (keeping
    /// the manufacturer block) and restore default keys and access bits in
    /// every trailer.
    pub fn clean(&mut self, uid: &Uid) -> Result<()> {
        let factory = MifareKey::FACTORY_DEFAULT;
        let zeros = BlockData::from_bytes([0u8; 16]);

        for sector in 0..SECTORS_1K {
            let trailer = Self::sector_trailer_block(sector);
            self.controller.mifare_authenticate_block(
                uid,
                trailer as u8,
                KeyType::B,
                &factory,
            )?;

            // sector 0 keeps block 0 (manufacturer data)
            if sector == 0 {
                self.controller
                    .mifare_write_block(trailer as u8 - 2, &zeros)?;
            } else {
                self.controller
                    .mifare_write_block(trailer as u8 - 3, &zeros)?;
                self.controller
                    .mifare_write_block(trailer as u8 - 2, &zeros)?;
            }
            self.controller
                .mifare_write_block(trailer as u8 - 1, &zeros)?;

            self.controller
                .mifare_write_block(trailer as u8, &BlockData::from_bytes(FACTORY_TRAILER))?;
        }
        Ok(())
    }
}

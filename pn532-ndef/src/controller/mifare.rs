// pn532-ndef/src/controller/mifare.rs

//! MIFARE block/page primitives carried inside InDataExchange.

use crate::constants::{
    MIFARE_CMD_AUTH_A, MIFARE_CMD_AUTH_B, MIFARE_CMD_READ, MIFARE_CMD_WRITE,
    MIFARE_CMD_WRITE_ULTRALIGHT,
};
use crate::controller::Controller;
use crate::diag::{Level, diag};
use crate::types::{BlockData, KeyType, MifareKey, Uid};
use crate::{Error, Result};

/// Ultralight pages run 0..63 on the largest supported cards.
const ULTRALIGHT_PAGE_COUNT: u8 = 64;

impl Controller {
    /// Authenticate one MIFARE Classic block. The key and UID are cached so
    /// layout engines can re-authenticate when they cross into a new sector.
    pub fn mifare_authenticate_block(
        &mut self,
        uid: &Uid,
        block: u8,
        key_type: KeyType,
        key: &MifareKey,
    ) -> Result<()> {
        self.set_cached_auth(uid, key);
        let cached_key = *self.cached_key();
        let cached_uid = self.cached_uid().cloned().unwrap_or_else(|| uid.clone());

        let mut data = Vec::with_capacity(2 + 6 + cached_uid.len());
        data.push(match key_type {
            KeyType::A => MIFARE_CMD_AUTH_A,
            KeyType::B => MIFARE_CMD_AUTH_B,
        });
        data.push(block);
        data.extend_from_slice(cached_key.as_bytes());
        data.extend_from_slice(cached_uid.as_bytes());

        match self.exchange(&data) {
            Ok(_) => Ok(()),
            Err(Error::ExchangeStatus { status }) => {
                diag!(
                    self.diag(),
                    Level::Error,
                    "authentication failed for block {block}: {status:#04x}"
                );
                Err(Error::AuthenticationFailed { block, status })
            }
            Err(e) => Err(e),
        }
    }

    /// Read a 16-byte MIFARE Classic block.
    pub fn mifare_read_block(&mut self, block: u8) -> Result<BlockData> {
        diag!(self.diag(), Level::Debug, "reading block {block}");
        let resp = self.exchange(&[MIFARE_CMD_READ, block])?;
        let bytes = resp.get(..16).ok_or(Error::InvalidLength {
            expected: 16,
            actual: resp.len(),
        })?;
        BlockData::try_from(bytes)
    }

    /// Write a 16-byte MIFARE Classic block.
    pub fn mifare_write_block(&mut self, block: u8, data: &BlockData) -> Result<()> {
        let mut cmd = Vec::with_capacity(2 + 16);
        cmd.push(MIFARE_CMD_WRITE);
        cmd.push(block);
        cmd.extend_from_slice(data.as_bytes());
        self.exchange(&cmd)?;
        Ok(())
    }

    /// Read a 4-byte Ultralight page. The chip returns 16 bytes (four
    /// pages); the extra twelve are discarded.
    pub fn ultralight_read_page(&mut self, page: u8) -> Result<[u8; 4]> {
        if page >= ULTRALIGHT_PAGE_COUNT {
            return Err(Error::PageOutOfRange(page));
        }

        let resp = self.exchange(&[MIFARE_CMD_READ, page])?;
        let bytes = resp.get(..4).ok_or(Error::InvalidLength {
            expected: 4,
            actual: resp.len(),
        })?;
        let mut out = [0u8; 4];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Write a 4-byte Ultralight page.
    pub fn ultralight_write_page(&mut self, page: u8, data: &[u8; 4]) -> Result<()> {
        if page >= ULTRALIGHT_PAGE_COUNT {
            return Err(Error::PageOutOfRange(page));
        }

        let mut cmd = Vec::with_capacity(2 + 4);
        cmd.push(MIFARE_CMD_WRITE_ULTRALIGHT);
        cmd.push(page);
        cmd.extend_from_slice(data);
        self.exchange(&cmd)?;
        Ok(())
    }
}

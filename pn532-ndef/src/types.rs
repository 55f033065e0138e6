// pn532-ndef/src/types.rs

use crate::Error;

/// ISO14443A UID. Anti-collision returns 4 bytes (MIFARE Classic) or
/// 7 bytes (Type 2 / Ultralight); the length decides the tag technology.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uid {
    bytes: [u8; 7],
    len: usize,
}

impl Uid {
    /// Build a Uid from raw anti-collision bytes (at most 7).
    pub fn new(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.is_empty() || bytes.len() > 7 {
            return Err(Error::InvalidLength {
                expected: 7,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; 7];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len(),
        })
    }

    /// The UID bytes actually returned by the card.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of UID bytes (4 or 7 for ISO14443A cards).
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no UID bytes are present.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lowercase hex rendering, handy for diagnostics.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Uid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

/// Tag technology, derived from the UID length.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    /// MIFARE Classic 1K/4K (4-byte UID)
    MifareClassic,
    /// NFC Forum Type 2 / MIFARE Ultralight (7-byte UID)
    Type2,
    /// Anything else; no layout engine available
    Unknown,
}

impl TagType {
    /// Classify a tag by its UID length.
    pub fn from_uid_len(len: usize) -> Self {
        match len {
            4 => Self::MifareClassic,
            7 => Self::Type2,
            _ => Self::Unknown,
        }
    }
}

/// MIFARE Classic key slot selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Key A (auth command 0x60)
    A,
    /// Key B (auth command 0x61)
    B,
}

/// 6-byte MIFARE Classic sector key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MifareKey([u8; 6]);

impl MifareKey {
    /// Factory default key for unformatted cards.
    pub const FACTORY_DEFAULT: Self = Self([0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    /// Key A for NDEF data sectors (1..15).
    pub const NDEF_DATA: Self = Self([0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7]);
    /// Key A for the MAD sector (sector 0) on NDEF-formatted cards.
    pub const NDEF_MAD: Self = Self([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]);

    /// Build a key from raw bytes.
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl Default for MifareKey {
    fn default() -> Self {
        Self::FACTORY_DEFAULT
    }
}

/// Firmware version reported by GetFirmwareVersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    /// IC identifier (0x32 for the PN532)
    pub ic: u8,
    /// Firmware major version
    pub version: u8,
    /// Firmware revision
    pub revision: u8,
    /// Supported protocols bitmask
    pub support: u8,
}

impl FirmwareVersion {
    /// The four response bytes packed big-endian, as the chip reports them.
    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes([self.ic, self.version, self.revision, self.support])
    }
}

/// FeliCa IDm (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Idm([u8; 8]);

impl Idm {
    /// Build an IDm from its 8 bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Raw IDm bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Idm {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 8 {
            return Err(Error::InvalidLength {
                expected: 8,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&bytes[..8]);
        Ok(Self(arr))
    }
}

/// FeliCa PMm (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pmm([u8; 8]);

impl Pmm {
    /// Build a PMm from its 8 bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Raw PMm bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Pmm {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 8 {
            return Err(Error::InvalidLength {
                expected: 8,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&bytes[..8]);
        Ok(Self(arr))
    }
}

/// FeliCa system code (u16). Big-endian on the polling wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemCode(u16);

impl SystemCode {
    /// Wildcard that matches any system.
    pub const ANY: Self = Self(0xFFFF);

    /// Build a system code.
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The raw value.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Big-endian wire bytes (polling command layout).
    pub fn to_be_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Decode from big-endian wire bytes.
    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

/// FeliCa service code (u16). Little-endian in command service lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceCode(u16);

impl ServiceCode {
    /// Build a service code.
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The raw value.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Little-endian wire bytes (service list layout).
    pub fn to_le_bytes(&self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

/// A 16-byte data block, shared by MIFARE Classic and FeliCa operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockData([u8; 16]);

impl BlockData {
    /// Build a block from its 16 bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw block bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Spaced hex rendering, handy for diagnostics.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex_spaced(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for BlockData {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 16 {
            return Err(Error::InvalidLength {
                expected: 16,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes[..16]);
        Ok(Self(arr))
    }
}

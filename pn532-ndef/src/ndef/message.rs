// pn532-ndef/src/ndef/message.rs

use crate::constants::{
    MAX_NDEF_RECORDS, RTD_TEXT, RTD_URI, URI_PREFIX_HTTP, URI_PREFIX_HTTPS,
    URI_PREFIX_HTTPS_WWWDOT, URI_PREFIX_HTTP_WWWDOT, URI_PREFIX_NONE,
};
use crate::ndef::record::{Record, Tnf};
use crate::{Error, Result};

/// An ordered NDEF message of at most 4 records. Mutated only by appending;
/// encoding places the message-begin flag on record 0 and message-end on the
/// last record.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    records: Vec<Record>,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a message from its wire form, one record per iteration,
    /// stopping after the record whose message-end flag is set.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Decode("empty ndef message".to_string()));
        }

        let mut message = Self::new();
        let mut i = 0;
        loop {
            let (record, next, me) = Record::decode_one(data, i)?;
            message.add_record(record)?;
            i = next;
            if me {
                break;
            }
            if i >= data.len() {
                return Err(Error::Decode("missing message-end flag".to_string()));
            }
        }
        Ok(message)
    }

    /// Total encoded size in bytes.
    pub fn encoded_size(&self) -> usize {
        self.records.iter().map(Record::encoded_size).sum()
    }

    /// Encode all records back-to-back with correct begin/end flags.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_size());
        let last = self.records.len().saturating_sub(1);
        for (i, record) in self.records.iter().enumerate() {
            record.encode_into(i == 0, i == last, &mut out);
        }
        out
    }

    /// Append a record; fails once the message already holds 4.
    pub fn add_record(&mut self, record: Record) -> Result<()> {
        if self.records.len() >= MAX_NDEF_RECORDS {
            return Err(Error::MessageFull);
        }
        self.records.push(record);
        Ok(())
    }

    /// The records in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record at `index`, if any.
    pub fn record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records have been added.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append an empty record (TNF empty, no type/id/payload).
    pub fn add_empty_record(&mut self) -> Result<()> {
        self.add_record(Record::new(Tnf::Empty))
    }

    /// Append a well-known URI record. The four common scheme prefixes are
    /// abbreviated to a 1-byte code and stripped from the stored payload;
    /// any other scheme is stored unabbreviated with code 0.
    pub fn add_uri_record(&mut self, uri: &str) -> Result<()> {
        let mut record = Record::new(Tnf::WellKnown);
        record.set_type(&[RTD_URI]);

        let prefix_code = if uri.starts_with("http://www.") {
            URI_PREFIX_HTTP_WWWDOT
        } else if uri.starts_with("https://www.") {
            URI_PREFIX_HTTPS_WWWDOT
        } else if uri.starts_with("http://") {
            URI_PREFIX_HTTP
        } else if uri.starts_with("https://") {
            URI_PREFIX_HTTPS
        } else {
            URI_PREFIX_NONE
        };

        let stored = if prefix_code != URI_PREFIX_NONE {
            match uri.find("://") {
                Some(pos) => &uri[pos + 3..],
                None => uri,
            }
        } else {
            uri
        };

        let mut payload = Vec::with_capacity(1 + stored.len());
        payload.push(prefix_code);
        payload.extend_from_slice(stored.as_bytes());
        record.set_payload(&payload);
        self.add_record(record)
    }

    /// Append a well-known text record with language code `"en"`.
    pub fn add_text_record(&mut self, text: &str) -> Result<()> {
        self.add_text_record_with_language(text, "en")
    }

    /// Append a well-known text record with an explicit language code.
    pub fn add_text_record_with_language(&mut self, text: &str, language: &str) -> Result<()> {
        let mut record = Record::new(Tnf::WellKnown);
        record.set_type(&[RTD_TEXT]);

        // UTF-8 status byte: top bit clear, low 6 bits = language code length
        let status = (language.len() & 0x3F) as u8;
        let mut payload = Vec::with_capacity(1 + language.len() + text.len());
        payload.push(status);
        payload.extend_from_slice(language.as_bytes());
        payload.extend_from_slice(text.as_bytes());
        record.set_payload(&payload);
        self.add_record(record)
    }

    /// Append a MIME media record.
    pub fn add_mime_media_record(&mut self, mime_type: &str, payload: &[u8]) -> Result<()> {
        let mut record = Record::new(Tnf::MimeMedia);
        record.set_type(mime_type.as_bytes());
        record.set_payload(payload);
        self.add_record(record)
    }
}

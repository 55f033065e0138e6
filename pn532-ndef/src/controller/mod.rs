// pn532-ndef/src/controller/mod.rs

//! Command exchange layer: wraps the frame transport with the chip's
//! command set, and offers the "send bytes to the listed target, get back
//! the post-status payload" primitive every tag operation is built on.

mod felica;
mod mifare;

use crate::bus::Bus;
use crate::constants::{
    CMD_GET_FIRMWARE_VERSION, CMD_IN_DATA_EXCHANGE, CMD_IN_LIST_PASSIVE_TARGET, CMD_IN_RELEASE,
    CMD_RF_CONFIGURATION, CMD_SAM_CONFIGURATION, PACKET_BUFFER_LEN,
};
use crate::diag::{Level, SharedSink, diag};
use crate::transport::Transport;
use crate::types::{FirmwareVersion, Idm, MifareKey, Pmm, Uid};
use crate::utils::DEFAULT_COMMAND_TIMEOUT_MS;
use crate::{Error, Result};

/// PN532 command/response surface over one bus.
pub struct Controller {
    transport: Transport,
    diag: SharedSink,
    in_listed_tag: u8,
    cached_uid: Option<Uid>,
    cached_key: MifareKey,
    felica_idm: Option<Idm>,
    felica_pmm: Option<Pmm>,
}

impl Controller {
    /// Create a controller over the given bus with default diagnostics.
    pub fn new(bus: Box<dyn Bus>) -> Self {
        Self::with_diagnostics(bus, crate::diag::default_sink())
    }

    /// Create a controller with an injected diagnostics sink, shared with
    /// the transport underneath.
    pub fn with_diagnostics(bus: Box<dyn Bus>, diag: SharedSink) -> Self {
        Self {
            transport: Transport::with_diagnostics(bus, diag.clone()),
            diag,
            in_listed_tag: 1,
            cached_uid: None,
            cached_key: MifareKey::FACTORY_DEFAULT,
            felica_idm: None,
            felica_pmm: None,
        }
    }

    /// Bring the bus up and wake the chip.
    pub fn begin(&mut self) -> Result<()> {
        self.transport.init()
    }

    pub(crate) fn diag(&self) -> &SharedSink {
        &self.diag
    }

    pub(crate) fn command(
        &mut self,
        header: &[u8],
        body: &[u8],
        timeout_ms: u64,
    ) -> Result<Vec<u8>> {
        self.transport.send(header, body)?;
        self.transport.receive(PACKET_BUFFER_LEN, timeout_ms)
    }

    /// Query the chip's firmware version; also serves as a presence probe.
    pub fn firmware_version(&mut self) -> Result<FirmwareVersion> {
        let resp = self.command(
            &[CMD_GET_FIRMWARE_VERSION],
            &[],
            DEFAULT_COMMAND_TIMEOUT_MS,
        )?;
        if resp.len() < 4 {
            return Err(Error::InvalidLength {
                expected: 4,
                actual: resp.len(),
            });
        }
        Ok(FirmwareVersion {
            ic: resp[0],
            version: resp[1],
            revision: resp[2],
            support: resp[3],
        })
    }

    /// Configure the SAM for normal operation (1 s virtual-card timeout,
    /// IRQ pin enabled).
    pub fn sam_config(&mut self) -> Result<()> {
        diag!(self.diag, Level::Debug, "configuring SAM");
        self.command(
            &[CMD_SAM_CONFIGURATION, 0x01, 0x14, 0x01],
            &[],
            DEFAULT_COMMAND_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// RFConfiguration item 5: cap the anti-collision retry count so
    /// detection polls return instead of blocking forever.
    pub fn set_passive_activation_retries(&mut self, max_retries: u8) -> Result<()> {
        self.command(
            &[CMD_RF_CONFIGURATION, 0x05, 0xFF, 0x01, max_retries],
            &[],
            DEFAULT_COMMAND_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// RFConfiguration item 1: RF field control.
    pub fn set_rf_field(&mut self, auto_rfca: u8, rf_on_off: u8) -> Result<()> {
        self.command(
            &[CMD_RF_CONFIGURATION, 0x01, auto_rfca | rf_on_off],
            &[],
            DEFAULT_COMMAND_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// List one passive target and return its UID. The response carries
    /// `NbTg, Tg, SENS_RES(2), SEL_RES, NFCIDLength, NFCID...`; ATQA and
    /// SAK are logged but not reinterpreted beyond the UID length.
    pub fn read_passive_target_id(&mut self, baud: u8, timeout_ms: u64) -> Result<Uid> {
        let resp = self.command(
            &[CMD_IN_LIST_PASSIVE_TARGET, 1, baud],
            &[],
            timeout_ms,
        )?;

        if resp.first().copied().unwrap_or(0) != 1 {
            return Err(Error::TagNotFound);
        }
        if resp.len() < 6 {
            return Err(Error::InvalidLength {
                expected: 6,
                actual: resp.len(),
            });
        }

        self.in_listed_tag = resp[1];
        let atqa = u16::from_be_bytes([resp[2], resp[3]]);
        let sak = resp[4];
        let uid_len = resp[5] as usize;
        diag!(
            self.diag,
            Level::Debug,
            "target: ATQA={atqa:#06x} SAK={sak:#04x} uid length {uid_len}"
        );

        let uid_bytes = resp.get(6..6 + uid_len).ok_or(Error::InvalidLength {
            expected: 6 + uid_len,
            actual: resp.len(),
        })?;
        Uid::new(uid_bytes)
    }

    /// Release the listed target (0 releases all).
    pub fn release(&mut self, target: u8) -> Result<()> {
        let resp = self.command(&[CMD_IN_RELEASE, target], &[], DEFAULT_COMMAND_TIMEOUT_MS)?;
        let status = resp.first().copied().unwrap_or(0);
        if status & 0x3F != 0 {
            return Err(Error::ExchangeStatus { status });
        }
        self.cached_uid = None;
        Ok(())
    }

    /// Exchange `data` with the listed target. The first response byte is a
    /// status field whose low 6 bits must be zero; on success the remaining
    /// bytes are returned verbatim for the caller's sub-protocol.
    pub fn exchange(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let header = [CMD_IN_DATA_EXCHANGE, self.in_listed_tag];
        let resp = self.command(&header, data, DEFAULT_COMMAND_TIMEOUT_MS)?;

        let status = resp.first().copied().ok_or(Error::InvalidLength {
            expected: 1,
            actual: 0,
        })?;
        if status & 0x3F != 0 {
            diag!(
                self.diag,
                Level::Error,
                "data exchange status {status:#04x}"
            );
            return Err(Error::ExchangeStatus { status });
        }
        Ok(resp[1..].to_vec())
    }

    pub(crate) fn set_cached_auth(&mut self, uid: &Uid, key: &MifareKey) {
        self.cached_uid = Some(uid.clone());
        self.cached_key = *key;
    }

    /// The key used by the most recent MIFARE authentication.
    pub fn cached_key(&self) -> &MifareKey {
        &self.cached_key
    }

    /// The UID used by the most recent MIFARE authentication.
    pub fn cached_uid(&self) -> Option<&Uid> {
        self.cached_uid.as_ref()
    }

    pub(crate) fn set_felica_identity(&mut self, idm: Idm, pmm: Pmm) {
        self.felica_idm = Some(idm);
        self.felica_pmm = Some(pmm);
    }

    pub(crate) fn clear_felica_identity(&mut self) {
        self.felica_idm = None;
        self.felica_pmm = None;
    }

    pub(crate) fn set_in_listed_tag(&mut self, target: u8) {
        self.in_listed_tag = target;
    }

    /// The IDm captured by the last successful FeliCa polling.
    pub fn felica_idm(&self) -> Option<Idm> {
        self.felica_idm
    }

    /// The PMm captured by the last successful FeliCa polling.
    pub fn felica_pmm(&self) -> Option<Pmm> {
        self.felica_pmm
    }
}

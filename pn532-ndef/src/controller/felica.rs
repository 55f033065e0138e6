// pn532-ndef/src/controller/felica.rs

//! FeliCa command set. Commands reach the card through InDataExchange with
//! a one-byte length prefix; service and node codes are little-endian on
//! the wire while block lists and system codes are big-endian.

use crate::constants::{
    BAUD_FELICA_212, CMD_IN_LIST_PASSIVE_TARGET, FELICA_CMD_POLLING, FELICA_CMD_READ_WITHOUT_ENCRYPTION,
    FELICA_CMD_REQUEST_RESPONSE, FELICA_CMD_REQUEST_SERVICE, FELICA_CMD_REQUEST_SYSTEM_CODE,
    FELICA_CMD_WRITE_WITHOUT_ENCRYPTION, FELICA_READ_MAX_BLOCK_NUM, FELICA_READ_MAX_SERVICE_NUM,
    FELICA_REQ_SERVICE_MAX_NODE_NUM, FELICA_WRITE_MAX_BLOCK_NUM, FELICA_WRITE_MAX_SERVICE_NUM,
};
use crate::controller::Controller;
use crate::diag::{Level, diag};
use crate::types::{BlockData, Idm, Pmm, ServiceCode, SystemCode};
use crate::{Error, Result};

impl Controller {
    /// Poll for a FeliCa card at 212 kbps. Returns the IDm/PMm pair and,
    /// when the request code asked for it, the responding system code.
    pub fn felica_polling(
        &mut self,
        system_code: SystemCode,
        request_code: u8,
        timeout_ms: u64,
    ) -> Result<(Idm, Pmm, Option<SystemCode>)> {
        let sc = system_code.to_be_bytes();
        let resp = self.command(
            &[CMD_IN_LIST_PASSIVE_TARGET, 1, BAUD_FELICA_212],
            &[FELICA_CMD_POLLING, sc[0], sc[1], request_code, 0],
            timeout_ms,
        )?;

        let targets = resp.first().copied().unwrap_or(0);
        if targets == 0 {
            return Err(Error::TagNotFound);
        }
        if targets != 1 {
            return Err(Error::InvalidFrame(format!(
                "unhandled target count {targets}"
            )));
        }
        if resp.len() < 3 {
            return Err(Error::InvalidLength {
                expected: 3,
                actual: resp.len(),
            });
        }

        self.set_in_listed_tag(resp[1]);
        diag!(self.diag(), Level::Info, "felica target {:#04x}", resp[1]);

        let response_length = resp[2] as usize;
        if response_length != 18 && response_length != 20 {
            return Err(Error::InvalidLength {
                expected: 18,
                actual: response_length,
            });
        }
        if resp.len() < 2 + response_length {
            return Err(Error::InvalidLength {
                expected: 2 + response_length,
                actual: resp.len(),
            });
        }

        let idm = Idm::try_from(&resp[4..12])?;
        let pmm = Pmm::try_from(&resp[12..20])?;
        self.set_felica_identity(idm, pmm);

        let system = if response_length == 20 {
            Some(SystemCode::from_be_bytes([resp[20], resp[21]]))
        } else {
            None
        };
        Ok((idm, pmm, system))
    }

    /// Send a raw FeliCa command to the polled card and return its response
    /// (response code onward). The card-side length prefix is handled here.
    pub fn felica_exchange(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        if command.len() > 0xFE {
            return Err(Error::InvalidLength {
                expected: 0xFE,
                actual: command.len(),
            });
        }

        let mut data = Vec::with_capacity(1 + command.len());
        data.push((command.len() + 1) as u8);
        data.extend_from_slice(command);
        let resp = self.exchange(&data)?;

        let declared = resp.first().copied().ok_or(Error::InvalidLength {
            expected: 1,
            actual: 0,
        })? as usize;
        if declared == 0 || resp.len() < declared {
            return Err(Error::InvalidLength {
                expected: declared.max(1),
                actual: resp.len(),
            });
        }
        Ok(resp[1..declared].to_vec())
    }

    fn require_idm(&self) -> Result<Idm> {
        self.felica_idm().ok_or(Error::TagNotFound)
    }

    /// Request Response: returns the card's current mode byte.
    pub fn felica_request_response(&mut self) -> Result<u8> {
        let idm = self.require_idm()?;
        let mut cmd = Vec::with_capacity(9);
        cmd.push(FELICA_CMD_REQUEST_RESPONSE);
        cmd.extend_from_slice(idm.as_bytes());

        let resp = self.felica_exchange(&cmd)?;
        if resp.len() != 10 {
            return Err(Error::InvalidLength {
                expected: 10,
                actual: resp.len(),
            });
        }
        Ok(resp[9])
    }

    /// Request System Code: all system codes registered on the card.
    pub fn felica_request_system_code(&mut self) -> Result<Vec<SystemCode>> {
        let idm = self.require_idm()?;
        let mut cmd = Vec::with_capacity(9);
        cmd.push(FELICA_CMD_REQUEST_SYSTEM_CODE);
        cmd.extend_from_slice(idm.as_bytes());

        let resp = self.felica_exchange(&cmd)?;
        if resp.len() < 10 {
            return Err(Error::InvalidLength {
                expected: 10,
                actual: resp.len(),
            });
        }
        let count = resp[9] as usize;
        if resp.len() < 10 + 2 * count {
            return Err(Error::InvalidLength {
                expected: 10 + 2 * count,
                actual: resp.len(),
            });
        }

        let codes = resp[10..10 + 2 * count]
            .chunks_exact(2)
            .map(|c| SystemCode::from_be_bytes([c[0], c[1]]))
            .collect();
        Ok(codes)
    }

    /// Request Service: key versions for the given node codes.
    pub fn felica_request_service(&mut self, nodes: &[u16]) -> Result<Vec<u16>> {
        if nodes.len() > FELICA_REQ_SERVICE_MAX_NODE_NUM {
            return Err(Error::InvalidLength {
                expected: FELICA_REQ_SERVICE_MAX_NODE_NUM,
                actual: nodes.len(),
            });
        }
        let idm = self.require_idm()?;

        let mut cmd = Vec::with_capacity(1 + 8 + 1 + 2 * nodes.len());
        cmd.push(FELICA_CMD_REQUEST_SERVICE);
        cmd.extend_from_slice(idm.as_bytes());
        cmd.push(nodes.len() as u8);
        for node in nodes {
            cmd.extend_from_slice(&node.to_le_bytes());
        }

        let resp = self.felica_exchange(&cmd)?;
        if resp.len() != 10 + 2 * nodes.len() {
            return Err(Error::InvalidLength {
                expected: 10 + 2 * nodes.len(),
                actual: resp.len(),
            });
        }

        let versions = resp[10..]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok(versions)
    }

    /// Read Without Encryption: fetch `blocks` from the listed services.
    pub fn felica_read_without_encryption(
        &mut self,
        services: &[ServiceCode],
        blocks: &[u16],
    ) -> Result<Vec<BlockData>> {
        if services.len() > FELICA_READ_MAX_SERVICE_NUM {
            return Err(Error::InvalidLength {
                expected: FELICA_READ_MAX_SERVICE_NUM,
                actual: services.len(),
            });
        }
        if blocks.len() > FELICA_READ_MAX_BLOCK_NUM {
            return Err(Error::InvalidLength {
                expected: FELICA_READ_MAX_BLOCK_NUM,
                actual: blocks.len(),
            });
        }
        let idm = self.require_idm()?;

        let mut cmd =
            Vec::with_capacity(1 + 8 + 1 + 2 * services.len() + 1 + 2 * blocks.len());
        cmd.push(FELICA_CMD_READ_WITHOUT_ENCRYPTION);
        cmd.extend_from_slice(idm.as_bytes());
        cmd.push(services.len() as u8);
        for service in services {
            cmd.extend_from_slice(&service.to_le_bytes());
        }
        cmd.push(blocks.len() as u8);
        for block in blocks {
            cmd.extend_from_slice(&block.to_be_bytes());
        }

        let resp = self.felica_exchange(&cmd)?;
        if resp.len() != 12 + 16 * blocks.len() {
            return Err(Error::InvalidLength {
                expected: 12 + 16 * blocks.len(),
                actual: resp.len(),
            });
        }
        if resp[9] != 0 || resp[10] != 0 {
            return Err(Error::FelicaStatus {
                status1: resp[9],
                status2: resp[10],
            });
        }

        resp[12..]
            .chunks_exact(16)
            .map(BlockData::try_from)
            .collect()
    }

    /// Write Without Encryption: store one 16-byte block per entry in
    /// `blocks`.
    pub fn felica_write_without_encryption(
        &mut self,
        services: &[ServiceCode],
        blocks: &[u16],
        data: &[BlockData],
    ) -> Result<()> {
        if services.len() > FELICA_WRITE_MAX_SERVICE_NUM {
            return Err(Error::InvalidLength {
                expected: FELICA_WRITE_MAX_SERVICE_NUM,
                actual: services.len(),
            });
        }
        if blocks.len() > FELICA_WRITE_MAX_BLOCK_NUM {
            return Err(Error::InvalidLength {
                expected: FELICA_WRITE_MAX_BLOCK_NUM,
                actual: blocks.len(),
            });
        }
        if data.len() != blocks.len() {
            return Err(Error::InvalidLength {
                expected: blocks.len(),
                actual: data.len(),
            });
        }
        let idm = self.require_idm()?;

        let mut cmd = Vec::with_capacity(
            1 + 8 + 1 + 2 * services.len() + 1 + 2 * blocks.len() + 16 * data.len(),
        );
        cmd.push(FELICA_CMD_WRITE_WITHOUT_ENCRYPTION);
        cmd.extend_from_slice(idm.as_bytes());
        cmd.push(services.len() as u8);
        for service in services {
            cmd.extend_from_slice(&service.to_le_bytes());
        }
        cmd.push(blocks.len() as u8);
        for block in blocks {
            cmd.extend_from_slice(&block.to_be_bytes());
        }
        for block_data in data {
            cmd.extend_from_slice(block_data.as_bytes());
        }

        let resp = self.felica_exchange(&cmd)?;
        if resp.len() != 11 {
            return Err(Error::InvalidLength {
                expected: 11,
                actual: resp.len(),
            });
        }
        if resp[9] != 0 || resp[10] != 0 {
            return Err(Error::FelicaStatus {
                status1: resp[9],
                status2: resp[10],
            });
        }
        Ok(())
    }

    /// Release the polled FeliCa card and forget its identity.
    pub fn felica_release(&mut self) -> Result<()> {
        diag!(self.diag(), Level::Debug, "releasing felica target");
        self.release(0)?;
        self.clear_felica_identity();
        Ok(())
    }
}

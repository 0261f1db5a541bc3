//! APDU exchange with the application under test.
//!
//! The navigator never looks inside APDUs; this module only carries them.
//! Asynchronous exchanges are split in two explicit steps: `exchange_async_raw`
//! sends the command and hands back a [`PendingExchange`] token, the caller
//! then navigates the prompt the command opened and finally trades the token
//! for the response with `complete_exchange`.
//!
//! Every command and response is logged under the `apdu` tracing target.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backend::types::{BackendError, BackendResult};

/// Success status word
pub const SW_OK: u16 = 0x9000;

/// Status word returned when the user rejects a prompt
pub const SW_DENY: u16 = 0x6985;

/// Response APDU: payload plus the trailing status word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rapdu {
    pub status: u16,
    pub data: Vec<u8>,
}

impl Rapdu {
    pub fn new(status: u16, data: Vec<u8>) -> Self {
        Self { status, data }
    }

    /// Split a raw response into payload and status word
    ///
    /// Responses shorter than 2 bytes carry no status and are rejected.
    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        if raw.len() < 2 {
            return None;
        }
        let (data, sw) = raw.split_at(raw.len() - 2);
        Some(Self {
            status: u16::from_be_bytes([sw[0], sw[1]]),
            data: data.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut raw = self.data.clone();
        raw.extend_from_slice(&self.status.to_be_bytes());
        raw
    }
}

/// Response rejected by the raise policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRapdu {
    pub status: u16,
    pub data: Vec<u8>,
}

impl fmt::Display for ExceptionRapdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error [0x{:04x}] {}", self.status, hex::encode(&self.data))
    }
}

impl std::error::Error for ExceptionRapdu {}

/// Which response statuses are turned into errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RaisePolicy {
    RaiseNothing,
    #[default]
    RaiseAllBut9000,
    RaiseAll,
}

impl RaisePolicy {
    pub fn is_raise_required(&self, rapdu: &Rapdu) -> bool {
        match self {
            RaisePolicy::RaiseNothing => false,
            RaisePolicy::RaiseAllBut9000 => rapdu.status != SW_OK,
            RaisePolicy::RaiseAll => true,
        }
    }

    /// Pass the response through, or turn it into an error
    pub fn check(&self, rapdu: Rapdu) -> Result<Rapdu, ExceptionRapdu> {
        if self.is_raise_required(&rapdu) {
            Err(ExceptionRapdu {
                status: rapdu.status,
                data: rapdu.data,
            })
        } else {
            Ok(rapdu)
        }
    }
}

/// Build a short APDU: header followed by the length-prefixed payload
///
/// Payloads over 255 bytes do not fit the length byte and are rejected.
pub fn pack_apdu(cla: u8, ins: u8, p1: u8, p2: u8, data: &[u8]) -> BackendResult<Vec<u8>> {
    let lc = u8::try_from(data.len()).map_err(|_| BackendError::PayloadTooLong(data.len()))?;
    let mut apdu = Vec::with_capacity(5 + data.len());
    apdu.extend_from_slice(&[cla, ins, p1, p2, lc]);
    apdu.extend_from_slice(data);
    Ok(apdu)
}

/// Token for a command sent with `exchange_async_raw` whose response has not
/// been collected yet
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending exchange must be completed to collect its response"]
pub struct PendingExchange {
    id: u64,
    command: Vec<u8>,
}

impl PendingExchange {
    pub fn new(id: u64, command: Vec<u8>) -> Self {
        Self { id, command }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn command(&self) -> &[u8] {
        &self.command
    }
}

pub(crate) fn log_command(apdu: &[u8]) {
    tracing::debug!(target: "apdu", "=> {}", hex::encode(apdu));
}

pub(crate) fn log_response(rapdu: &Rapdu) {
    tracing::debug!(target: "apdu", "<= {}{:04x}", hex::encode(&rapdu.data), rapdu.status);
}

/// Trait for APDU transports
pub trait Transport {
    fn raise_policy(&self) -> RaisePolicy;

    fn set_raise_policy(&mut self, policy: RaisePolicy);

    /// Send a raw APDU without waiting for the response
    fn send_raw(&mut self, apdu: &[u8]) -> BackendResult<()>;

    /// Collect the response of the last sent command, applying the raise policy
    fn receive(&mut self) -> BackendResult<Rapdu>;

    /// Send a command, then wait for its response
    fn exchange_raw(&mut self, apdu: &[u8]) -> BackendResult<Rapdu> {
        self.send_raw(apdu)?;
        self.receive()
    }

    /// Send a command built from its fields
    fn send(&mut self, cla: u8, ins: u8, p1: u8, p2: u8, data: &[u8]) -> BackendResult<()> {
        self.send_raw(&pack_apdu(cla, ins, p1, p2, data)?)
    }

    fn exchange(&mut self, cla: u8, ins: u8, p1: u8, p2: u8, data: &[u8]) -> BackendResult<Rapdu> {
        self.exchange_raw(&pack_apdu(cla, ins, p1, p2, data)?)
    }

    /// Send a command whose response depends on user interaction
    fn exchange_async_raw(&mut self, apdu: &[u8]) -> BackendResult<PendingExchange>;

    fn exchange_async(
        &mut self,
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: &[u8],
    ) -> BackendResult<PendingExchange> {
        self.exchange_async_raw(&pack_apdu(cla, ins, p1, p2, data)?)
    }

    /// Trade a pending exchange for its response, applying the raise policy
    ///
    /// Fails with [`BackendError::NoPendingExchange`] for a token that does
    /// not belong to this transport and with [`BackendError::ExchangeNotReady`]
    /// while the prompt is still displayed.
    fn complete_exchange(&mut self, pending: PendingExchange) -> BackendResult<Rapdu>;
}

/// Apply `policy` to a response, logging it first
pub(crate) fn finish_response(policy: RaisePolicy, rapdu: Rapdu) -> BackendResult<Rapdu> {
    log_response(&rapdu);
    policy.check(rapdu).map_err(BackendError::Status)
}

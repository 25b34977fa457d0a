//! Boundary to the lower mesh layers.
//!
//! The host wraps each access PDU into a fully framed network message and
//! hands it to a bearer. The handler only ever refers to in-flight messages
//! by [`Token`], so the transport never holds on to handler state.

use crate::address::{Address, LabelUuid, UnicastAddress};
use crate::app::{AccessKey, ApplicationKeyIdentifier};
use crate::pdu::access::{AccessPayload, Opcode, SzMic};
use core::fmt::{Display, Formatter};
use embassy_time::Duration;

/// Largest access PDU that fits an unsegmented lower transport PDU.
pub const MAX_UNSEGMENTED_ACCESS_PDU: usize = 11;

/// Upper transport octets carried by each segment.
pub const SEGMENT_SIZE: usize = 12;

/// Correlates a submitted message with the state waiting on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Token(u32);

impl Token {
    pub(crate) fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the transport needs to frame one access message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundAccess {
    pub src: UnicastAddress,
    pub dst: Address,
    /// Present only for virtual destinations.
    pub label: Option<LabelUuid>,
    /// `None` leaves the choice to the transport's default TTL.
    pub ttl: Option<u8>,
    pub key: AccessKey,
    pub akf: bool,
    pub aid: ApplicationKeyIdentifier,
    pub szmic: SzMic,
    pub payload: AccessPayload,
}

impl OutboundAccess {
    pub fn opcode(&self) -> Opcode {
        self.payload.opcode
    }

    pub fn parameters(&self) -> &[u8] {
        &self.payload.parameters
    }

    /// Length of the access PDU, opcode included.
    pub fn len(&self) -> usize {
        self.payload.opcode.opcode_len() + self.payload.parameters.len()
    }

    /// Lower transport segments needed to carry this message.
    pub fn segments(&self) -> usize {
        let len = self.len();
        if len <= MAX_UNSEGMENTED_ACCESS_PDU {
            1
        } else {
            let mic = if self.szmic.is_64() { 8 } else { 4 };
            (len + mic + SEGMENT_SIZE - 1) / SEGMENT_SIZE
        }
    }
}

/// Outcome of handing a message to the transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Submission {
    Accepted,
    /// Not taken; resubmit once the transport reports it is ready.
    Congested,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }

    pub fn cause(&self) -> &str {
        &self.0
    }
}

pub trait MeshTransport {
    /// Opaque, fully framed lower-layer message.
    type Message;

    fn create_mesh_message(
        &mut self,
        access: &OutboundAccess,
    ) -> Result<Self::Message, TransportError>;

    /// Hand a message to the bearer. The same message may be submitted again
    /// to retransmit it.
    fn submit(&mut self, token: Token, message: &Self::Message)
        -> Result<Submission, TransportError>;

    /// How long to wait for a reply once the bearer accepted `message`.
    fn ack_timeout(&self, message: &Self::Message) -> Duration;
}

/// Acknowledgement timeout for transports without a better estimate.
pub fn default_ack_timeout(ttl: u8, segments: usize) -> Duration {
    Duration::from_millis(segments.max(1) as u64 * (200 + 50 * ttl as u64))
}

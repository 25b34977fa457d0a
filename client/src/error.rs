use crate::pdu::access::Opcode;
use crate::pdu::{InsufficientBuffer, ParseError};
use crate::transport::TransportError;

/// Errors raised while building, sending or correlating access messages.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeshError {
    #[error("invalid address {0:#06x}")]
    InvalidAddress(u32),

    #[error("virtual address {0:#06x} requires a label UUID")]
    MissingLabel(u16),

    #[error("malformed PDU: {0}")]
    MalformedPdu(#[from] ParseError),

    #[error("unknown opcode {0}")]
    UnknownOpcode(Opcode),

    #[error("retry budget exhausted")]
    TimedOut,

    #[error("transport congested")]
    Congested,

    #[error("transport failed: {0}")]
    TransportFailed(#[from] TransportError),

    #[error("insufficient buffer")]
    InsufficientBuffer,
}

impl From<InsufficientBuffer> for MeshError {
    fn from(_: InsufficientBuffer) -> Self {
        Self::InsufficientBuffer
    }
}

impl MeshError {
    /// Errors that end an exchange rather than rejecting it up front.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TimedOut | Self::TransportFailed(_) | Self::MalformedPdu(_)
        )
    }
}

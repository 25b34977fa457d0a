pub mod access;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid PDU format")]
    InvalidPDUFormat,
    #[error("invalid field value")]
    InvalidValue,
    #[error("invalid parameter length")]
    InvalidLength,
    #[error("insufficient buffer")]
    InsufficientBuffer,
}

impl From<()> for ParseError {
    fn from(_: ()) -> Self {
        Self::InsufficientBuffer
    }
}

impl From<InsufficientBuffer> for ParseError {
    fn from(_: InsufficientBuffer) -> Self {
        Self::InsufficientBuffer
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("insufficient buffer")]
pub struct InsufficientBuffer;

impl From<()> for InsufficientBuffer {
    fn from(_: ()) -> Self {
        Self
    }
}

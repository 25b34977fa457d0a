use crate::pdu::InsufficientBuffer;
use heapless::Vec;

/// Status codes carried by configuration status messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Success,
    InvalidAddress,
    InvalidModel,
    InvalidAppKeyIndex,
    InvalidNetKeyIndex,
    InsufficientResources,
    KeyIndexAlreadyStored,
    InvalidPublishParameters,
    NotASubscribeModel,
    StorageFailure,
    FeatureNotSupported,
    CannotUpdate,
    CannotRemove,
    CannotBind,
    TemporarilyUnableToChangeState,
    CannotSet,
    UnspecifiedError,
    InvalidBinding,
    Rfu(u8),
}

impl Status {
    pub fn code(&self) -> u8 {
        (*self).into()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::InvalidAddress => "Invalid Address",
            Status::InvalidModel => "Invalid Model",
            Status::InvalidAppKeyIndex => "Invalid AppKey Index",
            Status::InvalidNetKeyIndex => "Invalid NetKey Index",
            Status::InsufficientResources => "Insufficient Resources",
            Status::KeyIndexAlreadyStored => "Key Index Already Stored",
            Status::InvalidPublishParameters => "Invalid Publish Parameters",
            Status::NotASubscribeModel => "Not a Subscribe Model",
            Status::StorageFailure => "Storage Failure",
            Status::FeatureNotSupported => "Feature Not Supported",
            Status::CannotUpdate => "Cannot Update",
            Status::CannotRemove => "Cannot Remove",
            Status::CannotBind => "Cannot Bind",
            Status::TemporarilyUnableToChangeState => "Temporarily Unable to Change State",
            Status::CannotSet => "Cannot Set",
            Status::UnspecifiedError => "Unspecified Error",
            Status::InvalidBinding => "Invalid Binding",
            Status::Rfu(_) => "RFU",
        }
    }

    pub(crate) fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        xmit.push(self.code()).map_err(|_| InsufficientBuffer)
    }
}

impl From<u8> for Status {
    fn from(val: u8) -> Self {
        match val {
            0x00 => Self::Success,
            0x01 => Self::InvalidAddress,
            0x02 => Self::InvalidModel,
            0x03 => Self::InvalidAppKeyIndex,
            0x04 => Self::InvalidNetKeyIndex,
            0x05 => Self::InsufficientResources,
            0x06 => Self::KeyIndexAlreadyStored,
            0x07 => Self::InvalidPublishParameters,
            0x08 => Self::NotASubscribeModel,
            0x09 => Self::StorageFailure,
            0x0A => Self::FeatureNotSupported,
            0x0B => Self::CannotUpdate,
            0x0C => Self::CannotRemove,
            0x0D => Self::CannotBind,
            0x0E => Self::TemporarilyUnableToChangeState,
            0x0F => Self::CannotSet,
            0x10 => Self::UnspecifiedError,
            0x11 => Self::InvalidBinding,
            _ => Self::Rfu(val),
        }
    }
}

impl From<Status> for u8 {
    fn from(val: Status) -> Self {
        match val {
            Status::Success => 0x00,
            Status::InvalidAddress => 0x01,
            Status::InvalidModel => 0x02,
            Status::InvalidAppKeyIndex => 0x03,
            Status::InvalidNetKeyIndex => 0x04,
            Status::InsufficientResources => 0x05,
            Status::KeyIndexAlreadyStored => 0x06,
            Status::InvalidPublishParameters => 0x07,
            Status::NotASubscribeModel => 0x08,
            Status::StorageFailure => 0x09,
            Status::FeatureNotSupported => 0x0A,
            Status::CannotUpdate => 0x0B,
            Status::CannotRemove => 0x0C,
            Status::CannotBind => 0x0D,
            Status::TemporarilyUnableToChangeState => 0x0E,
            Status::CannotSet => 0x0F,
            Status::UnspecifiedError => 0x10,
            Status::InvalidBinding => 0x11,
            Status::Rfu(num) => num,
        }
    }
}

/// Common view over configuration messages that lead with a status code.
pub trait StatusMessage {
    fn status(&self) -> Status;

    fn status_code(&self) -> u8 {
        self.status().code()
    }

    fn status_name(&self) -> &'static str {
        self.status().name()
    }

    fn is_successful(&self) -> bool {
        self.status_code() == 0x00
    }
}

use crate::model::foundation::configuration::FeatureState;
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_FRIEND_GET 0x80, 0x0F );
opcode!( CONFIG_FRIEND_SET 0x80, 0x10 );
opcode!( CONFIG_FRIEND_STATUS 0x80, 0x11 );

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FriendMessage {
    Get,
    Set(FeatureState),
    Status(FeatureState),
}

impl Message for FriendMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get => CONFIG_FRIEND_GET,
            Self::Set(_) => CONFIG_FRIEND_SET,
            Self::Status(_) => CONFIG_FRIEND_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get => Ok(()),
            Self::Set(state) | Self::Status(state) => state.emit(xmit),
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get | Self::Set(_) => &[CONFIG_FRIEND_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl FriendMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 1 {
            Ok(Self::Set(FeatureState::parse_set(parameters[0])?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 1 {
            Ok(Self::Status(FeatureState::parse_status(parameters[0])?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

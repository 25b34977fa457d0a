use crate::model::foundation::configuration::{FeatureState, NetKeyIndex};
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::status::{Status, StatusMessage};
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_NODE_IDENTITY_GET 0x80, 0x46);
opcode!( CONFIG_NODE_IDENTITY_SET 0x80, 0x47);
opcode!( CONFIG_NODE_IDENTITY_STATUS 0x80, 0x48);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeIdentityMessage {
    Get(NetKeyIndex),
    Set(NodeIdentitySetMessage),
    Status(NodeIdentityStatusMessage),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeIdentitySetMessage {
    pub net_key_index: NetKeyIndex,
    pub identity: FeatureState,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeIdentityStatusMessage {
    pub status: Status,
    pub net_key_index: NetKeyIndex,
    pub identity: FeatureState,
}

impl StatusMessage for NodeIdentityStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

impl Message for NodeIdentityMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get(_) => CONFIG_NODE_IDENTITY_GET,
            Self::Set(_) => CONFIG_NODE_IDENTITY_SET,
            Self::Status(_) => CONFIG_NODE_IDENTITY_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get(net_key_index) => net_key_index.emit(xmit),
            Self::Set(inner) => {
                inner.net_key_index.emit(xmit)?;
                inner.identity.emit(xmit)
            }
            Self::Status(inner) => {
                inner.status.emit(xmit)?;
                inner.net_key_index.emit(xmit)?;
                inner.identity.emit(xmit)
            }
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get(_) | Self::Set(_) => &[CONFIG_NODE_IDENTITY_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl NodeIdentityMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 2 {
            Ok(Self::Get(NetKeyIndex::parse(parameters)?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 3 {
            Ok(Self::Set(NodeIdentitySetMessage {
                net_key_index: NetKeyIndex::parse(parameters)?,
                identity: FeatureState::parse_set(parameters[2])?,
            }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 4 {
            Ok(Self::Status(NodeIdentityStatusMessage {
                status: parameters[0].into(),
                net_key_index: NetKeyIndex::parse(&parameters[1..=2])?,
                identity: FeatureState::parse_status(parameters[3])?,
            }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

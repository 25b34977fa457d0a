use crate::model::foundation::configuration::{FeatureState, Retransmit};
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;
use serde::{Deserialize, Serialize};

opcode!( CONFIG_RELAY_GET 0x80, 0x26);
opcode!( CONFIG_RELAY_SET 0x80, 0x27);
opcode!( CONFIG_RELAY_STATUS 0x80, 0x28);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayConfig {
    pub relay: FeatureState,
    pub retransmit: Retransmit,
}

impl RelayConfig {
    fn parse(parameters: &[u8], relay: fn(u8) -> Result<FeatureState, ParseError>) -> Result<Self, ParseError> {
        if parameters.len() == 2 {
            Ok(Self {
                relay: relay(parameters[0])?,
                retransmit: Retransmit::parse(parameters[1]),
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        self.relay.emit(xmit)?;
        self.retransmit.emit(xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayMessage {
    Get,
    Set(RelayConfig),
    Status(RelayConfig),
}

impl Message for RelayMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get => CONFIG_RELAY_GET,
            Self::Set(_) => CONFIG_RELAY_SET,
            Self::Status(_) => CONFIG_RELAY_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get => {}
            Self::Set(inner) | Self::Status(inner) => inner.emit(xmit)?,
        }
        Ok(())
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get | Self::Set(_) => &[CONFIG_RELAY_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl RelayMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Set(RelayConfig::parse(parameters, FeatureState::parse_set)?))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Status(RelayConfig::parse(
            parameters,
            FeatureState::parse_status,
        )?))
    }
}

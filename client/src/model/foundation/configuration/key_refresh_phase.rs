use crate::model::foundation::configuration::NetKeyIndex;
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::status::{Status, StatusMessage};
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_KEY_REFRESH_PHASE_GET 0x80, 0x15 );
opcode!( CONFIG_KEY_REFRESH_PHASE_SET 0x80, 0x16 );
opcode!( CONFIG_KEY_REFRESH_PHASE_STATUS 0x80, 0x17 );

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyRefreshPhase {
    Normal = 0x00,
    First = 0x01,
    Second = 0x02,
}

impl KeyRefreshPhase {
    fn parse(data: u8) -> Result<Self, ParseError> {
        match data {
            0x00 => Ok(Self::Normal),
            0x01 => Ok(Self::First),
            0x02 => Ok(Self::Second),
            _ => Err(ParseError::InvalidValue),
        }
    }
}

/// Transitions a client may request: 0x02 moves to the second phase, 0x03 revokes old keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyRefreshTransition {
    UseNewKeys = 0x02,
    RevokeOldKeys = 0x03,
}

impl KeyRefreshTransition {
    fn parse(data: u8) -> Result<Self, ParseError> {
        match data {
            0x02 => Ok(Self::UseNewKeys),
            0x03 => Ok(Self::RevokeOldKeys),
            _ => Err(ParseError::InvalidValue),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyRefreshPhaseMessage {
    Get(NetKeyIndex),
    Set(NetKeyIndex, KeyRefreshTransition),
    Status(KeyRefreshPhaseStatusMessage),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyRefreshPhaseStatusMessage {
    pub status: Status,
    pub net_key_index: NetKeyIndex,
    pub phase: KeyRefreshPhase,
}

impl StatusMessage for KeyRefreshPhaseStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

impl Message for KeyRefreshPhaseMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get(_) => CONFIG_KEY_REFRESH_PHASE_GET,
            Self::Set(..) => CONFIG_KEY_REFRESH_PHASE_SET,
            Self::Status(_) => CONFIG_KEY_REFRESH_PHASE_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get(net_key_index) => net_key_index.emit(xmit),
            Self::Set(net_key_index, transition) => {
                net_key_index.emit(xmit)?;
                xmit.push(*transition as u8).map_err(|_| InsufficientBuffer)
            }
            Self::Status(inner) => {
                inner.status.emit(xmit)?;
                inner.net_key_index.emit(xmit)?;
                xmit.push(inner.phase as u8).map_err(|_| InsufficientBuffer)
            }
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get(_) | Self::Set(..) => &[CONFIG_KEY_REFRESH_PHASE_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl KeyRefreshPhaseMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 2 {
            Ok(Self::Get(NetKeyIndex::parse(parameters)?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 3 {
            Ok(Self::Set(
                NetKeyIndex::parse(parameters)?,
                KeyRefreshTransition::parse(parameters[2])?,
            ))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 4 {
            Ok(Self::Status(KeyRefreshPhaseStatusMessage {
                status: parameters[0].into(),
                net_key_index: NetKeyIndex::parse(&parameters[1..=2])?,
                phase: KeyRefreshPhase::parse(parameters[3])?,
            }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_values() {
        assert_eq!(
            KeyRefreshPhaseMessage::Set(NetKeyIndex::new(1), KeyRefreshTransition::RevokeOldKeys),
            KeyRefreshPhaseMessage::parse_set(&[0x01, 0x00, 0x03]).unwrap()
        );
        for prohibited in [0x00, 0x01, 0x04, 0xFF] {
            assert_eq!(
                Err(ParseError::InvalidValue),
                KeyRefreshPhaseMessage::parse_set(&[0x01, 0x00, prohibited])
            );
        }
        assert_eq!(
            Err(ParseError::InvalidValue),
            KeyRefreshPhaseMessage::parse_status(&[0x00, 0x01, 0x00, 0x03])
        );
    }
}

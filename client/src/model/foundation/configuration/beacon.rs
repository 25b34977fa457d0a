use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_BEACON_GET 0x80, 0x09 );
opcode!( CONFIG_BEACON_SET 0x80, 0x0A );
opcode!( CONFIG_BEACON_STATUS 0x80, 0x0B );

/// Secure network beacon broadcast state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BeaconMessage {
    Get,
    Set(bool),
    Status(bool),
}

impl Message for BeaconMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get => CONFIG_BEACON_GET,
            Self::Set(_) => CONFIG_BEACON_SET,
            Self::Status(_) => CONFIG_BEACON_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get => {}
            Self::Set(val) | Self::Status(val) => xmit
                .push(if *val { 1 } else { 0 })
                .map_err(|_| InsufficientBuffer)?,
        }
        Ok(())
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get | Self::Set(_) => &[CONFIG_BEACON_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl BeaconMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Set(Self::parse_state(parameters)?))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Status(Self::parse_state(parameters)?))
    }

    fn parse_state(parameters: &[u8]) -> Result<bool, ParseError> {
        if parameters.len() == 1 {
            match parameters[0] {
                0x00 => Ok(false),
                0x01 => Ok(true),
                _ => Err(ParseError::InvalidValue),
            }
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beacon_values() {
        assert_eq!(BeaconMessage::Status(true), BeaconMessage::parse_status(&[0x01]).unwrap());
        assert_eq!(
            Err(ParseError::InvalidValue),
            BeaconMessage::parse_status(&[0x02])
        );
        assert_eq!(Err(ParseError::InvalidLength), BeaconMessage::parse_get(&[0x00]));
    }
}

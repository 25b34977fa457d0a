use crate::model::foundation::configuration::Retransmit;
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_NETWORK_TRANSMIT_GET 0x80, 0x23);
opcode!( CONFIG_NETWORK_TRANSMIT_SET 0x80, 0x24);
opcode!( CONFIG_NETWORK_TRANSMIT_STATUS 0x80, 0x25);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkTransmitMessage {
    Get,
    Set(Retransmit),
    Status(Retransmit),
}

impl Message for NetworkTransmitMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get => CONFIG_NETWORK_TRANSMIT_GET,
            Self::Set(_) => CONFIG_NETWORK_TRANSMIT_SET,
            Self::Status(_) => CONFIG_NETWORK_TRANSMIT_STATUS,
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
            Self::Get | Self::Set(_) => &[CONFIG_NETWORK_TRANSMIT_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl NetworkTransmitMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 1 {
            Ok(Self::Set(Retransmit::parse(parameters[0])))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 1 {
            Ok(Self::Status(Retransmit::parse(parameters[0])))
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_status() {
        let status = NetworkTransmitMessage::parse_status(&[0x4A]).unwrap();
        assert_eq!(
            NetworkTransmitMessage::Status(Retransmit {
                count: 2,
                interval_steps: 9
            }),
            status
        );
        assert_eq!(CONFIG_NETWORK_TRANSMIT_STATUS, status.opcode());
    }
}

use crate::address::{Address, UnicastAddress};
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_LOW_POWER_NODE_POLLTIMEOUT_GET 0x80, 0x2D );
opcode!( CONFIG_LOW_POWER_NODE_POLLTIMEOUT_STATUS 0x80, 0x2E );

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPowerNodePollTimeoutMessage {
    Get(UnicastAddress),
    Status(LowPowerNodePollTimeoutStatusMessage),
}

/// PollTimeout is a 24-bit count of 100 ms steps; zero means no friendship.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LowPowerNodePollTimeoutStatusMessage {
    pub lpn_address: Address,
    pub poll_timeout: u32,
}

impl Message for LowPowerNodePollTimeoutMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get(_) => CONFIG_LOW_POWER_NODE_POLLTIMEOUT_GET,
            Self::Status(_) => CONFIG_LOW_POWER_NODE_POLLTIMEOUT_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get(lpn_address) => lpn_address.emit_le(xmit),
            Self::Status(inner) => {
                inner.lpn_address.emit_le(xmit)?;
                xmit.extend_from_slice(&inner.poll_timeout.to_le_bytes()[0..3])
                    .map_err(|_| InsufficientBuffer)
            }
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get(_) => &[CONFIG_LOW_POWER_NODE_POLLTIMEOUT_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl LowPowerNodePollTimeoutMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 2 {
            Ok(Self::Get(UnicastAddress::parse_le(parameters)?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 5 {
            Ok(Self::Status(LowPowerNodePollTimeoutStatusMessage {
                lpn_address: Address::parse_le(parameters)?,
                poll_timeout: u32::from_le_bytes([parameters[2], parameters[3], parameters[4], 0]),
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
    fn test_poll_timeout() {
        let status =
            LowPowerNodePollTimeoutMessage::parse_status(&[0x05, 0x00, 0x10, 0x27, 0x00]).unwrap();
        match status {
            LowPowerNodePollTimeoutMessage::Status(inner) => {
                assert_eq!(0x0005, inner.lpn_address.value());
                assert_eq!(10_000, inner.poll_timeout);
            }
            _ => panic!("expected status"),
        }
    }
}

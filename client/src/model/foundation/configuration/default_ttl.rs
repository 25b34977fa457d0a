use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_DEFAULT_TTL_GET 0x80, 0x0C );
opcode!( CONFIG_DEFAULT_TTL_SET 0x80, 0x0D );
opcode!( CONFIG_DEFAULT_TTL_STATUS 0x80, 0x0E );

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DefaultTTLMessage {
    Get,
    Set(u8),
    Status(u8),
}

impl Message for DefaultTTLMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get => CONFIG_DEFAULT_TTL_GET,
            Self::Set(_) => CONFIG_DEFAULT_TTL_SET,
            Self::Status(_) => CONFIG_DEFAULT_TTL_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get => {}
            Self::Set(val) | Self::Status(val) => {
                xmit.push(*val).map_err(|_| InsufficientBuffer)?
            }
        }
        Ok(())
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get | Self::Set(_) => &[CONFIG_DEFAULT_TTL_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl DefaultTTLMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Set(Self::parse_ttl(parameters)?))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Status(Self::parse_ttl(parameters)?))
    }

    /// 0x01 and anything above 0x7F are prohibited.
    fn parse_ttl(parameters: &[u8]) -> Result<u8, ParseError> {
        if parameters.len() == 1 {
            match parameters[0] {
                ttl @ (0x00 | 0x02..=0x7F) => Ok(ttl),
                _ => Err(ParseError::InvalidValue),
            }
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

use crate::pdu::access::{Opcode, SzMic};
use crate::pdu::ParseError;
use crate::util::{bytes_to_u32, format_address, u16_le};
use crate::InsufficientBuffer;
use core::fmt::{Display, Formatter};
use heapless::Vec;
use serde::{Deserialize, Serialize};

pub mod foundation;
pub mod generic;
pub mod vendor;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompanyIdentifier(pub u16);

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelIdentifier {
    SIG(u16),
    Vendor(CompanyIdentifier, u16),
}

impl ModelIdentifier {
    /// Parse a model identifier occupying the whole slice.
    ///
    /// Two octets are a SIG model, four octets a vendor model (company
    /// identifier first), anything else is rejected.
    pub fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        match parameters.len() {
            2 => Ok(ModelIdentifier::SIG(u16_le(parameters[0], parameters[1]))),
            4 => Ok(ModelIdentifier::Vendor(
                CompanyIdentifier(u16_le(parameters[0], parameters[1])),
                u16_le(parameters[2], parameters[3]),
            )),
            _ => Err(ParseError::InvalidLength),
        }
    }

    pub fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        // NOTE: little-endian, company identifier before model identifier.
        match self {
            ModelIdentifier::SIG(model_id) => {
                xmit.extend_from_slice(&model_id.to_le_bytes())
                    .map_err(|_| InsufficientBuffer)?;
            }
            ModelIdentifier::Vendor(company_id, model_id) => {
                xmit.extend_from_slice(&company_id.0.to_le_bytes())
                    .map_err(|_| InsufficientBuffer)?;
                xmit.extend_from_slice(&model_id.to_le_bytes())
                    .map_err(|_| InsufficientBuffer)?;
            }
        }
        Ok(())
    }

    /// Encoded size in octets.
    pub fn len(&self) -> usize {
        match self {
            ModelIdentifier::SIG(_) => 2,
            ModelIdentifier::Vendor(..) => 4,
        }
    }

    pub fn is_sig(&self) -> bool {
        matches!(self, ModelIdentifier::SIG(_))
    }

    /// 32-bit form: `(company << 16) | model` for vendor models.
    pub fn as_u32(&self) -> u32 {
        match self {
            ModelIdentifier::SIG(model_id) => *model_id as u32,
            ModelIdentifier::Vendor(company_id, model_id) => {
                let c = company_id.0.to_le_bytes();
                let m = model_id.to_le_bytes();
                bytes_to_u32([c[1], c[0], m[1], m[0]])
            }
        }
    }
}

impl Display for ModelIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ModelIdentifier::SIG(model_id) => f.write_str(&format_address(*model_id, true)),
            ModelIdentifier::Vendor(..) => write!(f, "0x{:08X}", self.as_u32()),
        }
    }
}

/// An access-layer message with a known opcode and parameter layout.
pub trait Message {
    fn opcode(&self) -> Opcode;

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer>;

    /// Opcodes a node may answer this message with. Empty for
    /// unacknowledged messages and for status messages themselves.
    fn response_opcodes(&self) -> &[Opcode] {
        &[]
    }

    fn szmic(&self) -> SzMic {
        SzMic::Bit32
    }
}

pub trait Model {
    const IDENTIFIER: ModelIdentifier;
    /// Every opcode `parse` recognizes.
    const OPCODES: &'static [Opcode];
    type Message: Message;

    fn parse(&self, opcode: &Opcode, parameters: &[u8])
        -> Result<Option<Self::Message>, ParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_length() {
        assert_eq!(
            ModelIdentifier::SIG(0x1001),
            ModelIdentifier::parse(&[0x01, 0x10]).unwrap()
        );
        assert_eq!(
            ModelIdentifier::Vendor(CompanyIdentifier(0x1001), 0x0005),
            ModelIdentifier::parse(&[0x01, 0x10, 0x05, 0x00]).unwrap()
        );
        assert_eq!(
            Err(ParseError::InvalidLength),
            ModelIdentifier::parse(&[0x01, 0x10, 0x05])
        );
        assert_eq!(Err(ParseError::InvalidLength), ModelIdentifier::parse(&[]));
    }

    #[test]
    fn test_vendor_u32_matches_reordered_bytes() {
        let bytes = [0x01, 0x10, 0x05, 0x00];
        let model = ModelIdentifier::parse(&bytes).unwrap();
        assert_eq!(
            bytes_to_u32([bytes[1], bytes[0], bytes[3], bytes[2]]),
            model.as_u32()
        );
        assert_eq!(0x10010005, model.as_u32());
        assert_eq!("0x10010005", model.to_string());
        assert_eq!(
            0x00000000,
            ModelIdentifier::Vendor(CompanyIdentifier(0), 0).as_u32()
        );
    }

    #[test]
    fn test_emit() {
        let mut xmit: Vec<u8, 4> = Vec::new();
        ModelIdentifier::Vendor(CompanyIdentifier(0x0059), 0x0001)
            .emit(&mut xmit)
            .unwrap();
        assert_eq!(&[0x59, 0x00, 0x01, 0x00], &*xmit);
    }
}

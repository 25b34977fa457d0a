//! Raw messages for vendor models.
//!
//! Vendor opcodes are always three octets, the last two carrying the
//! company identifier. The parameter layout is opaque to this crate.

use crate::model::Message;
use crate::pdu::access::{Opcode, Parameters, SzMic};
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use heapless::Vec;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VendorMessage {
    opcode: Opcode,
    parameters: Parameters,
    response: Option<Opcode>,
    szmic: SzMic,
}

impl VendorMessage {
    pub fn new(opcode: Opcode, parameters: &[u8]) -> Result<Self, ParseError> {
        if !matches!(opcode, Opcode::ThreeOctet(..)) {
            return Err(ParseError::InvalidPDUFormat);
        }
        Ok(Self {
            opcode,
            parameters: Vec::from_slice(parameters).map_err(|_| ParseError::InsufficientBuffer)?,
            response: None,
            szmic: SzMic::Bit32,
        })
    }

    /// Expect `response` as the acknowledgement of this message.
    pub fn acknowledged_by(mut self, response: Opcode) -> Self {
        self.response.replace(response);
        self
    }

    /// Select the transport MIC size used when this message is sent.
    pub fn with_szmic(mut self, szmic: SzMic) -> Self {
        self.szmic = szmic;
        self
    }

    /// Decoder suitable for registering vendor opcodes.
    pub fn parse(opcode: &Opcode, parameters: &[u8]) -> Result<Self, ParseError> {
        Self::new(*opcode, parameters)
    }

    pub fn parameters(&self) -> &[u8] {
        &self.parameters
    }

    pub fn company_identifier(&self) -> Option<u16> {
        self.opcode.company_identifier()
    }
}

impl Message for VendorMessage {
    fn opcode(&self) -> Opcode {
        self.opcode
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.extend_from_slice(&self.parameters)
            .map_err(|_| InsufficientBuffer)
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match &self.response {
            Some(response) => core::slice::from_ref(response),
            None => &[],
        }
    }

    fn szmic(&self) -> SzMic {
        self.szmic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_opcode_required() {
        assert_eq!(
            Err(ParseError::InvalidPDUFormat),
            VendorMessage::new(Opcode::TwoOctet(0x82, 0x01), &[])
        );
        let message = VendorMessage::new(Opcode::ThreeOctet(0xC1, 0x59, 0x00), &[0xAA])
            .unwrap()
            .acknowledged_by(Opcode::ThreeOctet(0xC2, 0x59, 0x00));
        assert_eq!(Some(0x0059), message.company_identifier());
        assert_eq!(&[Opcode::ThreeOctet(0xC2, 0x59, 0x00)], message.response_opcodes());
        let mut xmit: Vec<u8, 4> = Vec::new();
        message.emit_parameters(&mut xmit).unwrap();
        assert_eq!(&[0xAA], &*xmit);
    }

    #[test]
    fn test_szmic_is_carried() {
        let message = VendorMessage::new(Opcode::ThreeOctet(0xC1, 0x59, 0x00), &[0xAA]).unwrap();
        assert_eq!(SzMic::Bit32, message.szmic());
        let message = message.with_szmic(SzMic::Bit64);
        assert_eq!(SzMic::Bit64, message.szmic());
        assert_eq!(
            SzMic::Bit64,
            crate::registry::MeshMessage::Vendor(message).szmic()
        );
    }
}

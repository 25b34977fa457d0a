use crate::address::{Address, LabelUuid, UnicastAddress};
use crate::app::ApplicationKeyIdentifier;
use crate::model::Message;
use crate::pdu::{InsufficientBuffer, ParseError};
use core::fmt::{Display, Formatter};
use heapless::Vec;

/// Largest access payload carried by a segmented upper transport PDU.
pub const MAX_ACCESS_PAYLOAD: usize = 384;

pub type Parameters = Vec<u8, MAX_ACCESS_PAYLOAD>;

/// Size of the transport MIC applied to the upper transport PDU.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SzMic {
    Bit32,
    Bit64,
}

impl SzMic {
    pub fn is_64(&self) -> bool {
        matches!(self, SzMic::Bit64)
    }
}

impl Default for SzMic {
    fn default() -> Self {
        SzMic::Bit32
    }
}

impl From<bool> for SzMic {
    fn from(szmic: bool) -> Self {
        if szmic {
            SzMic::Bit64
        } else {
            SzMic::Bit32
        }
    }
}

/// An access message as handed up by the lower transport, after decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccessMessage {
    pub ttl: Option<u8>,
    pub akf: bool,
    pub aid: ApplicationKeyIdentifier,
    pub szmic: SzMic,
    pub src: UnicastAddress,
    pub dst: Address,
    pub label: Option<LabelUuid>,
    pub payload: AccessPayload,
}

impl AccessMessage {
    pub fn new(src: UnicastAddress, dst: Address, payload: AccessPayload) -> Self {
        Self {
            ttl: None,
            akf: false,
            aid: ApplicationKeyIdentifier::NONE,
            szmic: SzMic::Bit32,
            src,
            dst,
            label: None,
            payload,
        }
    }

    pub fn parse(src: UnicastAddress, dst: Address, data: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::new(src, dst, AccessPayload::parse(data)?))
    }

    pub fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl.replace(ttl);
        self
    }

    pub fn with_label(mut self, label: LabelUuid) -> Self {
        self.label.replace(label);
        self
    }

    pub fn with_application_key(mut self, aid: ApplicationKeyIdentifier) -> Self {
        self.akf = true;
        self.aid = aid;
        self
    }

    pub fn opcode(&self) -> Opcode {
        self.payload.opcode
    }

    pub fn parameters(&self) -> &[u8] {
        &self.payload.parameters
    }

    pub fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        self.payload.emit(xmit)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccessPayload {
    pub opcode: Opcode,
    pub parameters: Parameters,
}

impl AccessPayload {
    pub fn new(opcode: Opcode, parameters: &[u8]) -> Result<Self, InsufficientBuffer> {
        Ok(Self {
            opcode,
            parameters: Vec::from_slice(parameters).map_err(|_| InsufficientBuffer)?,
        })
    }

    pub fn from_message<M: Message>(message: &M) -> Result<Self, InsufficientBuffer> {
        let mut parameters = Vec::new();
        message.emit_parameters(&mut parameters)?;
        Ok(Self {
            opcode: message.opcode(),
            parameters,
        })
    }

    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let (opcode, parameters) = Opcode::split(data).ok_or(ParseError::InvalidPDUFormat)?;
        Ok(Self {
            opcode,
            parameters: Vec::from_slice(parameters).map_err(|_| ParseError::InsufficientBuffer)?,
        })
    }

    pub fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        self.opcode.emit(xmit)?;
        xmit.extend_from_slice(&self.parameters)
            .map_err(|_| InsufficientBuffer)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Opcode {
    OneOctet(u8),
    TwoOctet(u8, u8),
    ThreeOctet(u8, u8, u8),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Opcode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Opcode::OneOctet(a) => {
                defmt::write!(fmt, "{:x}", a)
            }
            Opcode::TwoOctet(a, b) => {
                defmt::write!(fmt, "{:x} {:x}", a, b)
            }
            Opcode::ThreeOctet(a, b, c) => {
                defmt::write!(fmt, "{:x} {:x} {:x}", a, b, c)
            }
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Opcode::OneOctet(a) => write!(f, "{:02X}", a),
            Opcode::TwoOctet(a, b) => write!(f, "{:02X} {:02X}", a, b),
            Opcode::ThreeOctet(a, b, c) => write!(f, "{:02X} {:02X} {:02X}", a, b, c),
        }
    }
}

impl Opcode {
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Opcode::OneOctet(a) if !data.is_empty() && data[0] == *a => true,
            Opcode::TwoOctet(a, b) if data.len() >= 2 && data[0] == *a && data[1] == *b => true,
            Opcode::ThreeOctet(a, b, c)
                if data.len() >= 3 && data[0] == *a && data[1] == *b && data[2] == *c =>
            {
                true
            }
            _ => false,
        }
    }

    pub fn opcode_len(&self) -> usize {
        match self {
            Opcode::OneOctet(_) => 1,
            Opcode::TwoOctet(_, _) => 2,
            Opcode::ThreeOctet(_, _, _) => 3,
        }
    }

    /// Vendor opcodes carry the 16-bit company identifier in their last two octets.
    pub fn company_identifier(&self) -> Option<u16> {
        match self {
            Opcode::ThreeOctet(_, lo, hi) => Some(u16::from_le_bytes([*lo, *hi])),
            _ => None,
        }
    }

    pub fn split(data: &[u8]) -> Option<(Opcode, &[u8])> {
        if data.is_empty() {
            None
        } else if data[0] & 0b10000000 == 0 {
            // one octet, 0x7F is reserved for future use
            if data[0] == 0x7F {
                None
            } else {
                Some((Opcode::OneOctet(data[0]), &data[1..]))
            }
        } else if data.len() >= 2 && data[0] & 0b11000000 == 0b10000000 {
            // two octet
            Some((Opcode::TwoOctet(data[0], data[1]), &data[2..]))
        } else if data.len() >= 3 && data[0] & 0b11000000 == 0b11000000 {
            // three octet
            Some((Opcode::ThreeOctet(data[0], data[1], data[2]), &data[3..]))
        } else {
            None
        }
    }

    pub fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        match self {
            Opcode::OneOctet(a) => {
                xmit.push(*a).map_err(|_| InsufficientBuffer)?;
            }
            Opcode::TwoOctet(a, b) => {
                xmit.push(*a).map_err(|_| InsufficientBuffer)?;
                xmit.push(*b).map_err(|_| InsufficientBuffer)?;
            }
            Opcode::ThreeOctet(a, b, c) => {
                xmit.push(*a).map_err(|_| InsufficientBuffer)?;
                xmit.push(*b).map_err(|_| InsufficientBuffer)?;
                xmit.push(*c).map_err(|_| InsufficientBuffer)?;
            }
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! opcode {
    ($name:ident $o1:expr) => {
        pub const $name: $crate::pdu::access::Opcode = $crate::pdu::access::Opcode::OneOctet($o1);
    };

    ($name:ident $o1:expr, $o2:expr) => {
        pub const $name: $crate::pdu::access::Opcode =
            $crate::pdu::access::Opcode::TwoOctet($o1, $o2);
    };

    ($name:ident $o1:expr, $o2:expr, $o3:expr) => {
        pub const $name: $crate::pdu::access::Opcode =
            $crate::pdu::access::Opcode::ThreeOctet($o1, $o2, $o3);
    };
}

pub mod group_address;
pub mod unicast_address;
pub mod virtual_address;

pub use group_address::GroupAddress;
pub use unicast_address::UnicastAddress;
pub use virtual_address::{LabelUuid, VirtualAddress};

use crate::pdu::{InsufficientBuffer, ParseError};
use crate::util::{format_address, u16_le};
use core::fmt::{Display, Formatter};
use heapless::Vec;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidAddress;

impl From<InvalidAddress> for ParseError {
    fn from(_: InvalidAddress) -> Self {
        ParseError::InvalidValue
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    Unassigned,
    Unicast(UnicastAddress),
    Virtual(VirtualAddress),
    Group(GroupAddress),
    LabelUuid(LabelUuid),
}

impl Address {
    pub fn as_bytes(&self) -> [u8; 2] {
        match self {
            Address::Unassigned => [0, 0],
            Address::Unicast(inner) => inner.as_bytes(),
            Address::Virtual(inner) => inner.as_bytes(),
            Address::Group(inner) => inner.as_bytes(),
            Address::LabelUuid(inner) => inner.virtual_address().as_bytes(),
        }
    }

    pub fn value(&self) -> u16 {
        u16::from_be_bytes(self.as_bytes())
    }

    /// Classify a big-endian address. Total over all 16-bit values.
    pub fn parse(data: [u8; 2]) -> Self {
        let val = u16::from_be_bytes(data);
        if val == 0 {
            Self::Unassigned
        } else if UnicastAddress::is_unicast_address(&data) {
            Self::Unicast(UnicastAddress(val))
        } else if GroupAddress::is_group_address(&data) {
            Self::Group(GroupAddress::parse_unchecked(data))
        } else {
            Self::Virtual(VirtualAddress(val))
        }
    }

    /// Read a little-endian address from access parameters.
    pub(crate) fn parse_le(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() >= 2 {
            Ok(Self::from(u16_le(parameters[0], parameters[1])))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub(crate) fn emit_le<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.extend_from_slice(&self.value().to_le_bytes())
            .map_err(|_| InsufficientBuffer)
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Address::Unassigned)
    }

    pub fn is_unicast(&self) -> bool {
        matches!(self, Address::Unicast(_))
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Address::Group(_))
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Address::Virtual(_) | Address::LabelUuid(_))
    }
}

impl From<u16> for Address {
    fn from(val: u16) -> Self {
        Self::parse(val.to_be_bytes())
    }
}

impl From<Address> for u16 {
    fn from(addr: Address) -> Self {
        addr.value()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&format_address(self.value(), true))
    }
}

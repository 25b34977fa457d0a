use crate::address::{Address, InvalidAddress};
use crate::pdu::{InsufficientBuffer, ParseError};
use crate::util::u16_le;
use core::ops::Add;
use core::ops::Sub;
use heapless::Vec;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnicastAddress(pub(crate) u16);

impl core::fmt::LowerHex for UnicastAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error> {
        self.0.fmt(f)
    }
}

impl UnicastAddress {
    pub fn new(val: u16) -> Result<Self, InvalidAddress> {
        Self::parse(val.to_be_bytes())
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn as_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn is_unicast_address(data: &[u8; 2]) -> bool {
        data[0] & 0b10000000 == 0 && (data[0] != 0 || data[1] != 0)
    }

    pub fn parse(data: [u8; 2]) -> Result<Self, InvalidAddress> {
        if Self::is_unicast_address(&data) {
            Ok(UnicastAddress(u16::from_be_bytes(data)))
        } else {
            Err(InvalidAddress)
        }
    }

    pub(crate) fn parse_le(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() >= 2 {
            Ok(Self::new(u16_le(parameters[0], parameters[1]))?)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub(crate) fn emit_le<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.extend_from_slice(&self.0.to_le_bytes())
            .map_err(|_| InsufficientBuffer)
    }
}

impl From<UnicastAddress> for Address {
    fn from(addr: UnicastAddress) -> Self {
        Address::Unicast(addr)
    }
}

impl From<UnicastAddress> for u16 {
    fn from(addr: UnicastAddress) -> Self {
        addr.0
    }
}

impl TryFrom<u16> for UnicastAddress {
    type Error = InvalidAddress;

    fn try_from(val: u16) -> Result<Self, Self::Error> {
        Self::new(val)
    }
}

impl Add<u8> for UnicastAddress {
    type Output = UnicastAddress;

    fn add(self, rhs: u8) -> Self::Output {
        Self(self.0 + rhs as u16)
    }
}

impl Sub<UnicastAddress> for UnicastAddress {
    type Output = u8;

    fn sub(self, rhs: UnicastAddress) -> Self::Output {
        (self.0 - rhs.0) as u8
    }
}

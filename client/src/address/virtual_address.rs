use crate::address::{Address, InvalidAddress};
use crate::crypto;
use crate::pdu::{InsufficientBuffer, ParseError};
use cmac::crypto_mac::InvalidKeyLength;
use core::convert::TryInto;
use heapless::Vec;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VirtualAddress(pub(crate) u16);

impl VirtualAddress {
    pub fn new(val: u16) -> Result<Self, InvalidAddress> {
        Self::parse(val.to_be_bytes())
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn as_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn is_virtual_address(data: &[u8; 2]) -> bool {
        data[0] & 0b11000000 == 0b10000000
    }

    pub fn parse(data: [u8; 2]) -> Result<Self, InvalidAddress> {
        if Self::is_virtual_address(&data) {
            Ok(VirtualAddress(u16::from_be_bytes(data)))
        } else {
            Err(InvalidAddress)
        }
    }
}

impl From<VirtualAddress> for Address {
    fn from(addr: VirtualAddress) -> Self {
        Address::Virtual(addr)
    }
}

/// A 128-bit label together with the virtual address it hashes to.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LabelUuid {
    uuid: [u8; 16],
    address: VirtualAddress,
}

impl LabelUuid {
    pub fn parse(uuid: &[u8]) -> Result<Self, ParseError> {
        if uuid.len() != 16 {
            Err(ParseError::InvalidLength)
        } else {
            Self::new(uuid.try_into().map_err(|_| ParseError::InvalidLength)?)
                .map_err(|_| ParseError::InvalidLength)
        }
    }

    pub fn new(uuid: [u8; 16]) -> Result<Self, InvalidKeyLength> {
        Ok(Self {
            uuid,
            address: Self::virtual_address_of(uuid)?,
        })
    }

    pub fn label_uuid(&self) -> &[u8] {
        &self.uuid
    }

    pub fn virtual_address(&self) -> VirtualAddress {
        self.address
    }

    pub(crate) fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        xmit.extend_from_slice(&self.uuid)
            .map_err(|_| InsufficientBuffer)
    }

    pub fn virtual_address_of(uuid: [u8; 16]) -> Result<VirtualAddress, InvalidKeyLength> {
        let salt = crypto::s1(b"vtad")?;
        let hash = crypto::aes_cmac(&salt.into_bytes(), &uuid)?;
        let hash = &mut hash.into_bytes()[14..=15];
        hash[0] = (0b00111111 & hash[0]) | 0b10000000;
        let hash = u16::from_be_bytes([hash[0], hash[1]]);
        Ok(VirtualAddress(hash))
    }
}

impl From<LabelUuid> for Address {
    fn from(label: LabelUuid) -> Self {
        Address::LabelUuid(label)
    }
}

use crate::address::{Address, GroupAddress, LabelUuid, UnicastAddress};
use crate::model::foundation::configuration::{AppKeyIndex, Retransmit};
use crate::model::{Message, ModelIdentifier};
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::status::{Status, StatusMessage};
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_MODEL_PUBLICATION_SET 0x03 );
opcode!( CONFIG_MODEL_PUBLICATION_GET 0x80, 0x18);
opcode!( CONFIG_MODEL_PUBLICATION_STATUS 0x80, 0x19);
opcode!( CONFIG_MODEL_PUBLICATION_VIRTUAL_ADDRESS_SET 0x80, 0x1A);

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelPublicationMessage {
    Get(ModelPublicationGetMessage),
    /// Model Publication Set, or Virtual Address Set when publishing to a label.
    Set(ModelPublicationSetMessage),
    Status(ModelPublicationStatusMessage),
}

impl Message for ModelPublicationMessage {
    fn opcode(&self) -> Opcode {
        match self {
            ModelPublicationMessage::Get(_) => CONFIG_MODEL_PUBLICATION_GET,
            ModelPublicationMessage::Set(inner) => match inner.publish_address {
                PublishAddress::Virtual(_) => CONFIG_MODEL_PUBLICATION_VIRTUAL_ADDRESS_SET,
                _ => CONFIG_MODEL_PUBLICATION_SET,
            },
            ModelPublicationMessage::Status(_) => CONFIG_MODEL_PUBLICATION_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            ModelPublicationMessage::Get(inner) => inner.emit_parameters(xmit),
            ModelPublicationMessage::Set(inner) => inner.emit_parameters(xmit),
            ModelPublicationMessage::Status(inner) => inner.emit_parameters(xmit),
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get(_) | Self::Set(_) => &[CONFIG_MODEL_PUBLICATION_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl ModelPublicationMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Get(ModelPublicationGetMessage::parse(parameters)?))
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Set(ModelPublicationSetMessage::parse(parameters)?))
    }

    pub fn parse_virtual_address_set(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Set(
            ModelPublicationSetMessage::parse_virtual_address(parameters)?,
        ))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Status(ModelPublicationStatusMessage::parse(
            parameters,
        )?))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelPublicationGetMessage {
    pub element_address: UnicastAddress,
    pub model_identifier: ModelIdentifier,
}

impl ModelPublicationGetMessage {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 4 || parameters.len() == 6 {
            Ok(Self {
                element_address: UnicastAddress::parse_le(parameters)?,
                model_identifier: ModelIdentifier::parse(&parameters[2..])?,
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.element_address.emit_le(xmit)?;
        self.model_identifier.emit(xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishAddress {
    /// Disables publication.
    Unassigned,
    Unicast(UnicastAddress),
    Group(GroupAddress),
    Virtual(LabelUuid),
}

impl From<PublishAddress> for Address {
    fn from(addr: PublishAddress) -> Self {
        match addr {
            PublishAddress::Unassigned => Address::Unassigned,
            PublishAddress::Unicast(inner) => Address::Unicast(inner),
            PublishAddress::Group(inner) => Address::Group(inner),
            PublishAddress::Virtual(inner) => Address::LabelUuid(inner),
        }
    }
}

/// Publication parameters shared by Set, Virtual Address Set and Status.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublicationDetails {
    pub app_key_index: AppKeyIndex,
    pub credential_flag: bool,
    /// `None` publishes with the node's default TTL.
    pub publish_ttl: Option<u8>,
    /// Number of steps in the low six bits, step resolution in the high two.
    pub publish_period: u8,
    pub publish_retransmit: Retransmit,
}

impl PublicationDetails {
    const LEN: usize = 5;

    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() < Self::LEN {
            return Err(ParseError::InvalidLength);
        }
        let field = u16::from_le_bytes([parameters[0], parameters[1]]);
        if field & 0b1110_0000_0000_0000 != 0 {
            return Err(ParseError::InvalidValue);
        }
        let app_key_index = AppKeyIndex::new(field & 0x0FFF);
        let credential_flag = field & 0b0001_0000_0000_0000 != 0;
        let publish_ttl = match parameters[2] {
            0xFF => None,
            ttl @ 0x00..=0x7F => Some(ttl),
            _ => return Err(ParseError::InvalidValue),
        };
        Ok(Self {
            app_key_index,
            credential_flag,
            publish_ttl,
            publish_period: parameters[3],
            publish_retransmit: Retransmit::parse(parameters[4]),
        })
    }

    fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        let mut field = self.app_key_index.value();
        if self.credential_flag {
            field |= 0b0001_0000_0000_0000;
        }
        xmit.extend_from_slice(&field.to_le_bytes())
            .map_err(|_| InsufficientBuffer)?;
        xmit.push(self.publish_ttl.unwrap_or(0xFF))
            .map_err(|_| InsufficientBuffer)?;
        xmit.push(self.publish_period)
            .map_err(|_| InsufficientBuffer)?;
        self.publish_retransmit.emit(xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelPublicationSetMessage {
    pub element_address: UnicastAddress,
    pub publish_address: PublishAddress,
    pub details: PublicationDetails,
    pub model_identifier: ModelIdentifier,
}

impl ModelPublicationSetMessage {
    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.element_address.emit_le(xmit)?;
        match &self.publish_address {
            PublishAddress::Virtual(label) => label.emit(xmit)?,
            other => Address::from(*other).emit_le(xmit)?,
        }
        self.details.emit(xmit)?;
        self.model_identifier.emit(xmit)
    }

    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 11 || parameters.len() == 13 {
            let element_address = UnicastAddress::parse_le(parameters)?;
            let publish_address = match Address::parse_le(&parameters[2..])? {
                Address::Unassigned => PublishAddress::Unassigned,
                Address::Unicast(inner) => PublishAddress::Unicast(inner),
                Address::Group(inner) => PublishAddress::Group(inner),
                _ => return Err(ParseError::InvalidValue),
            };
            Ok(Self {
                element_address,
                publish_address,
                details: PublicationDetails::parse(&parameters[4..9])?,
                model_identifier: ModelIdentifier::parse(&parameters[9..])?,
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    fn parse_virtual_address(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 25 || parameters.len() == 27 {
            let element_address = UnicastAddress::parse_le(parameters)?;
            let publish_address = PublishAddress::Virtual(LabelUuid::parse(&parameters[2..=17])?);
            Ok(Self {
                element_address,
                publish_address,
                details: PublicationDetails::parse(&parameters[18..23])?,
                model_identifier: ModelIdentifier::parse(&parameters[23..])?,
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelPublicationStatusMessage {
    pub status: Status,
    pub element_address: Address,
    pub publish_address: Address,
    pub details: PublicationDetails,
    pub model_identifier: ModelIdentifier,
}

impl ModelPublicationStatusMessage {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 12 || parameters.len() == 14 {
            Ok(Self {
                status: parameters[0].into(),
                element_address: Address::parse_le(&parameters[1..])?,
                publish_address: Address::parse_le(&parameters[3..])?,
                details: PublicationDetails::parse(&parameters[5..10])?,
                model_identifier: ModelIdentifier::parse(&parameters[10..])?,
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.status.emit(xmit)?;
        self.element_address.emit_le(xmit)?;
        self.publish_address.emit_le(xmit)?;
        self.details.emit(xmit)?;
        self.model_identifier.emit(xmit)
    }
}

impl StatusMessage for ModelPublicationStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

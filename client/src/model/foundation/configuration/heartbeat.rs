use crate::address::Address;
use crate::model::foundation::configuration::NetKeyIndex;
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::status::{Status, StatusMessage};
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_HEARTBEAT_PUBLICATION_GET 0x80, 0x38 );
opcode!( CONFIG_HEARTBEAT_PUBLICATION_SET 0x80, 0x39 );
opcode!( CONFIG_HEARTBEAT_PUBLICATION_STATUS 0x06 );
opcode!( CONFIG_HEARTBEAT_SUBSCRIPTION_GET 0x80, 0x3A );
opcode!( CONFIG_HEARTBEAT_SUBSCRIPTION_SET 0x80, 0x3B );
opcode!( CONFIG_HEARTBEAT_SUBSCRIPTION_STATUS 0x80, 0x3C );

pub const FEATURE_RELAY: u16 = 0b0001;
pub const FEATURE_PROXY: u16 = 0b0010;
pub const FEATURE_FRIEND: u16 = 0b0100;
pub const FEATURE_LOW_POWER: u16 = 0b1000;

fn parse_count_log(data: u8) -> Result<u8, ParseError> {
    match data {
        0x00..=0x11 | 0xFF => Ok(data),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_period_log(data: u8) -> Result<u8, ParseError> {
    match data {
        0x00..=0x11 => Ok(data),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_ttl(data: u8) -> Result<u8, ParseError> {
    match data {
        0x00..=0x7F => Ok(data),
        _ => Err(ParseError::InvalidValue),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeartbeatPublication {
    pub destination: Address,
    pub count_log: u8,
    pub period_log: u8,
    pub ttl: u8,
    pub features: u16,
    pub net_key_index: NetKeyIndex,
}

impl HeartbeatPublication {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 9 {
            let destination = Address::parse_le(parameters)?;
            if destination.is_virtual() {
                return Err(ParseError::InvalidValue);
            }
            Ok(Self {
                destination,
                count_log: parse_count_log(parameters[2])?,
                period_log: parse_period_log(parameters[3])?,
                ttl: parse_ttl(parameters[4])?,
                features: u16::from_le_bytes([parameters[5], parameters[6]]),
                net_key_index: NetKeyIndex::parse(&parameters[7..])?,
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        self.destination.emit_le(xmit)?;
        xmit.extend_from_slice(&[self.count_log, self.period_log, self.ttl])
            .map_err(|_| InsufficientBuffer)?;
        xmit.extend_from_slice(&self.features.to_le_bytes())
            .map_err(|_| InsufficientBuffer)?;
        self.net_key_index.emit(xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeartbeatPublicationStatusMessage {
    pub status: Status,
    pub publication: HeartbeatPublication,
}

impl StatusMessage for HeartbeatPublicationStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeartbeatPublicationMessage {
    Get,
    Set(HeartbeatPublication),
    Status(HeartbeatPublicationStatusMessage),
}

impl Message for HeartbeatPublicationMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get => CONFIG_HEARTBEAT_PUBLICATION_GET,
            Self::Set(_) => CONFIG_HEARTBEAT_PUBLICATION_SET,
            Self::Status(_) => CONFIG_HEARTBEAT_PUBLICATION_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get => Ok(()),
            Self::Set(inner) => inner.emit(xmit),
            Self::Status(inner) => {
                inner.status.emit(xmit)?;
                inner.publication.emit(xmit)
            }
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get | Self::Set(_) => &[CONFIG_HEARTBEAT_PUBLICATION_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl HeartbeatPublicationMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Set(HeartbeatPublication::parse(parameters)?))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            return Err(ParseError::InvalidLength);
        }
        Ok(Self::Status(HeartbeatPublicationStatusMessage {
            status: parameters[0].into(),
            publication: HeartbeatPublication::parse(&parameters[1..])?,
        }))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeartbeatSubscription {
    pub source: Address,
    pub destination: Address,
    pub period_log: u8,
}

impl HeartbeatSubscription {
    fn parse_addresses(parameters: &[u8]) -> Result<(Address, Address), ParseError> {
        let source = Address::parse_le(parameters)?;
        let destination = Address::parse_le(&parameters[2..])?;
        if source.is_group() || source.is_virtual() || destination.is_virtual() {
            Err(ParseError::InvalidValue)
        } else {
            Ok((source, destination))
        }
    }

    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 5 {
            let (source, destination) = Self::parse_addresses(parameters)?;
            Ok(Self {
                source,
                destination,
                period_log: parse_period_log(parameters[4])?,
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        self.source.emit_le(xmit)?;
        self.destination.emit_le(xmit)?;
        xmit.push(self.period_log).map_err(|_| InsufficientBuffer)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeartbeatSubscriptionStatusMessage {
    pub status: Status,
    pub source: Address,
    pub destination: Address,
    pub period_log: u8,
    pub count_log: u8,
    pub min_hops: u8,
    pub max_hops: u8,
}

impl StatusMessage for HeartbeatSubscriptionStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeartbeatSubscriptionMessage {
    Get,
    Set(HeartbeatSubscription),
    Status(HeartbeatSubscriptionStatusMessage),
}

impl Message for HeartbeatSubscriptionMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get => CONFIG_HEARTBEAT_SUBSCRIPTION_GET,
            Self::Set(_) => CONFIG_HEARTBEAT_SUBSCRIPTION_SET,
            Self::Status(_) => CONFIG_HEARTBEAT_SUBSCRIPTION_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get => Ok(()),
            Self::Set(inner) => inner.emit(xmit),
            Self::Status(inner) => {
                inner.status.emit(xmit)?;
                inner.source.emit_le(xmit)?;
                inner.destination.emit_le(xmit)?;
                xmit.extend_from_slice(&[
                    inner.period_log,
                    inner.count_log,
                    inner.min_hops,
                    inner.max_hops,
                ])
                .map_err(|_| InsufficientBuffer)
            }
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get | Self::Set(_) => &[CONFIG_HEARTBEAT_SUBSCRIPTION_STATUS],
            Self::Status(_) => &[],
        }
    }
}

impl HeartbeatSubscriptionMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Set(HeartbeatSubscription::parse(parameters)?))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 9 {
            let (source, destination) = HeartbeatSubscription::parse_addresses(&parameters[1..])?;
            Ok(Self::Status(HeartbeatSubscriptionStatusMessage {
                status: parameters[0].into(),
                source,
                destination,
                period_log: parse_period_log(parameters[5])?,
                count_log: parameters[6],
                min_hops: parameters[7],
                max_hops: parameters[8],
            }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

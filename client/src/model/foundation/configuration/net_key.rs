use crate::model::foundation::configuration::{parse_indexes, KeyIndex, NetKeyIndex, MAX_KEY_INDEXES};
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::status::{Status, StatusMessage};
use crate::InsufficientBuffer;
use crate::opcode;
use core::convert::TryInto;
use heapless::Vec;

opcode!( CONFIG_NETKEY_ADD 0x80, 0x40);
opcode!( CONFIG_NETKEY_DELETE 0x80, 0x41);
opcode!( CONFIG_NETKEY_GET 0x80, 0x42);
opcode!( CONFIG_NETKEY_LIST 0x80, 0x43);
opcode!( CONFIG_NETKEY_STATUS 0x80, 0x44);
opcode!( CONFIG_NETKEY_UPDATE 0x80, 0x45);

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetKeyMessage {
    Add(NetKeyAddMessage),
    Delete(NetKeyIndex),
    Get,
    List(Vec<NetKeyIndex, MAX_KEY_INDEXES>),
    Status(NetKeyStatusMessage),
    Update(NetKeyAddMessage),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetKeyAddMessage {
    pub net_key_index: NetKeyIndex,
    pub net_key: [u8; 16],
}

impl NetKeyAddMessage {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 18 {
            Ok(Self {
                net_key_index: NetKeyIndex::parse(parameters)?,
                net_key: parameters[2..]
                    .try_into()
                    .map_err(|_| ParseError::InvalidLength)?,
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.net_key_index.emit(xmit)?;
        xmit.extend_from_slice(&self.net_key)
            .map_err(|_| InsufficientBuffer)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetKeyStatusMessage {
    pub status: Status,
    pub net_key_index: NetKeyIndex,
}

impl StatusMessage for NetKeyStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

impl Message for NetKeyMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Add(_) => CONFIG_NETKEY_ADD,
            Self::Delete(_) => CONFIG_NETKEY_DELETE,
            Self::Get => CONFIG_NETKEY_GET,
            Self::List(_) => CONFIG_NETKEY_LIST,
            Self::Status(_) => CONFIG_NETKEY_STATUS,
            Self::Update(_) => CONFIG_NETKEY_UPDATE,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Add(inner) | Self::Update(inner) => inner.emit_parameters(xmit),
            Self::Delete(net_key_index) => net_key_index.emit(xmit),
            Self::Get => Ok(()),
            Self::List(indexes) => KeyIndex::emit_list(indexes, xmit),
            Self::Status(inner) => {
                inner.status.emit(xmit)?;
                inner.net_key_index.emit(xmit)
            }
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Add(_) | Self::Update(_) | Self::Delete(_) => &[CONFIG_NETKEY_STATUS],
            Self::Get => &[CONFIG_NETKEY_LIST],
            Self::List(_) | Self::Status(_) => &[],
        }
    }
}

impl NetKeyMessage {
    pub fn parse_add(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Add(NetKeyAddMessage::parse(parameters)?))
    }

    pub fn parse_update(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Update(NetKeyAddMessage::parse(parameters)?))
    }

    pub fn parse_delete(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 2 {
            Ok(Self::Delete(NetKeyIndex::parse(parameters)?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_list(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::List(parse_indexes(parameters)?))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 3 {
            Ok(Self::Status(NetKeyStatusMessage {
                status: parameters[0].into(),
                net_key_index: NetKeyIndex::parse(&parameters[1..])?,
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
    fn test_list() {
        assert_eq!(
            NetKeyMessage::List(Vec::new()),
            NetKeyMessage::parse_list(&[]).unwrap()
        );
        let list = NetKeyMessage::parse_list(&[0x00, 0x10, 0x00]).unwrap();
        match &list {
            NetKeyMessage::List(indexes) => {
                assert_eq!(&[NetKeyIndex::new(0), NetKeyIndex::new(1)], &**indexes)
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_status() {
        let status = NetKeyMessage::parse_status(&[0x04, 0xFF, 0x0F]).unwrap();
        match status {
            NetKeyMessage::Status(inner) => {
                assert_eq!(Status::InvalidNetKeyIndex, inner.status);
                assert_eq!(0x0FFF, inner.net_key_index.value());
            }
            _ => panic!("expected status"),
        }
    }
}

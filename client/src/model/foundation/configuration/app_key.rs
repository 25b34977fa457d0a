use crate::model::foundation::configuration::{
    parse_indexes, AppKeyIndex, KeyIndex, NetKeyAppKeyIndexesPair, NetKeyIndex, MAX_KEY_INDEXES,
};
use crate::model::Message;
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::status::{Status, StatusMessage};
use crate::InsufficientBuffer;
use crate::opcode;
use core::convert::TryInto;
use heapless::Vec;

opcode!( CONFIG_APPKEY_ADD 0x00 );
opcode!( CONFIG_APPKEY_DELETE 0x80, 0x00 );
opcode!( CONFIG_APPKEY_GET 0x80, 0x01 );
opcode!( CONFIG_APPKEY_LIST 0x80, 0x02 );
opcode!( CONFIG_APPKEY_STATUS 0x80, 0x03 );
opcode!( CONFIG_APPKEY_UPDATE 0x01 );

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppKeyMessage {
    Add(AppKeyAddMessage),
    Delete(AppKeyDeleteMessage),
    Get(AppKeyGetMessage),
    List(AppKeyListMessage),
    Status(AppKeyStatusMessage),
    Update(AppKeyUpdateMessage),
}

impl AppKeyMessage {
    pub fn parse_add(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Add(AppKeyAddMessage::parse(parameters)?))
    }

    pub fn parse_update(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Update(AppKeyAddMessage::parse(parameters)?))
    }

    pub fn parse_delete(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 3 {
            Ok(Self::Delete(AppKeyDeleteMessage {
                indexes: NetKeyAppKeyIndexesPair::parse(parameters)?,
            }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 2 {
            let net_key_index = NetKeyIndex::parse(parameters)?;
            Ok(Self::Get(AppKeyGetMessage { net_key_index }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_list(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() >= 3 {
            Ok(Self::List(AppKeyListMessage {
                status: parameters[0].into(),
                net_key_index: NetKeyIndex::parse(&parameters[1..=2])?,
                app_key_indexes: parse_indexes(&parameters[3..])?,
            }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 4 {
            Ok(Self::Status(AppKeyStatusMessage {
                status: parameters[0].into(),
                indexes: NetKeyAppKeyIndexesPair::parse(&parameters[1..])?,
            }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }
}

impl Message for AppKeyMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Add(_) => CONFIG_APPKEY_ADD,
            Self::Delete(_) => CONFIG_APPKEY_DELETE,
            Self::Get(_) => CONFIG_APPKEY_GET,
            Self::List(_) => CONFIG_APPKEY_LIST,
            Self::Status(_) => CONFIG_APPKEY_STATUS,
            Self::Update(_) => CONFIG_APPKEY_UPDATE,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            AppKeyMessage::Add(inner) => inner.emit_parameters(xmit),
            AppKeyMessage::Delete(inner) => inner.emit_parameters(xmit),
            AppKeyMessage::Get(inner) => inner.emit_parameters(xmit),
            AppKeyMessage::List(inner) => inner.emit_parameters(xmit),
            AppKeyMessage::Status(inner) => inner.emit_parameters(xmit),
            AppKeyMessage::Update(inner) => inner.emit_parameters(xmit),
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Add(_) | Self::Update(_) | Self::Delete(_) => &[CONFIG_APPKEY_STATUS],
            Self::Get(_) => &[CONFIG_APPKEY_LIST],
            Self::List(_) | Self::Status(_) => &[],
        }
    }
}

/// Parameters of both AppKey Add and AppKey Update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppKeyAddMessage {
    pub indexes: NetKeyAppKeyIndexesPair,
    pub app_key: [u8; 16],
}

pub type AppKeyUpdateMessage = AppKeyAddMessage;

impl AppKeyAddMessage {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 19 {
            let indexes = NetKeyAppKeyIndexesPair::parse(&parameters[0..=2])?;
            let app_key = parameters[3..]
                .try_into()
                .map_err(|_| ParseError::InvalidLength)?;
            Ok(Self { indexes, app_key })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.indexes.emit(xmit)?;
        xmit.extend_from_slice(&self.app_key)
            .map_err(|_| InsufficientBuffer)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppKeyDeleteMessage {
    pub indexes: NetKeyAppKeyIndexesPair,
}

impl AppKeyDeleteMessage {
    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.indexes.emit(xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppKeyGetMessage {
    pub net_key_index: NetKeyIndex,
}

impl AppKeyGetMessage {
    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.net_key_index.emit(xmit)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppKeyListMessage {
    pub status: Status,
    pub net_key_index: NetKeyIndex,
    pub app_key_indexes: Vec<AppKeyIndex, MAX_KEY_INDEXES>,
}

impl AppKeyListMessage {
    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.status.emit(xmit)?;
        self.net_key_index.emit(xmit)?;
        KeyIndex::emit_list(&self.app_key_indexes, xmit)
    }
}

impl StatusMessage for AppKeyListMessage {
    fn status(&self) -> Status {
        self.status
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppKeyStatusMessage {
    pub status: Status,
    pub indexes: NetKeyAppKeyIndexesPair,
}

impl AppKeyStatusMessage {
    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.status.emit(xmit)?;
        self.indexes.emit(xmit)?;
        Ok(())
    }
}

impl StatusMessage for AppKeyStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_indexes() {
        // NetKeyIndex 0x123 in the low 12 bits, AppKeyIndex 0x456 in the high 12 bits.
        let message = AppKeyMessage::parse_status(&[0x00, 0x23, 0x61, 0x45]).unwrap();
        match message {
            AppKeyMessage::Status(status) => {
                assert!(status.is_successful());
                assert_eq!(0x123, status.indexes.net_key().value());
                assert_eq!(0x456, status.indexes.app_key().value());
            }
            _ => panic!("expected status"),
        }
    }

    #[test]
    fn test_add_round_trip() {
        let add = AppKeyMessage::Add(AppKeyAddMessage {
            indexes: NetKeyAppKeyIndexesPair::new(NetKeyIndex::new(0), AppKeyIndex::new(1)),
            app_key: [0xAA; 16],
        });
        let mut xmit: Vec<u8, 32> = Vec::new();
        add.emit_parameters(&mut xmit).unwrap();
        assert_eq!(19, xmit.len());
        assert_eq!(&[0x00, 0x10, 0x00], &xmit[0..3]);
        assert_eq!(add, AppKeyMessage::parse_add(&xmit).unwrap());
        assert_eq!(&[CONFIG_APPKEY_STATUS], add.response_opcodes());
    }

    #[test]
    fn test_list() {
        let message =
            AppKeyMessage::parse_list(&[0x00, 0x01, 0x00, 0x01, 0x20, 0x00, 0x03, 0x00]).unwrap();
        match &message {
            AppKeyMessage::List(list) => {
                assert_eq!(1, list.net_key_index.value());
                assert_eq!(
                    &[AppKeyIndex::new(1), AppKeyIndex::new(2), AppKeyIndex::new(3)],
                    &*list.app_key_indexes
                );
            }
            _ => panic!("expected list"),
        }
        let mut xmit: Vec<u8, 16> = Vec::new();
        message.emit_parameters(&mut xmit).unwrap();
        assert_eq!(&[0x00, 0x01, 0x00, 0x01, 0x20, 0x00, 0x03, 0x00], &*xmit);

        assert_eq!(
            Err(ParseError::InvalidLength),
            AppKeyMessage::parse_list(&[0x00, 0x01, 0x00, 0x01])
        );
    }
}

use crate::address::{Address, UnicastAddress};
use crate::model::foundation::configuration::{parse_indexes, AppKeyIndex, KeyIndex, MAX_KEY_INDEXES};
use crate::model::{Message, ModelIdentifier};
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::status::{Status, StatusMessage};
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_MODEL_APP_BIND 0x80, 0x3D);
opcode!( CONFIG_MODEL_APP_STATUS 0x80, 0x3E);
opcode!( CONFIG_MODEL_APP_UNBIND 0x80, 0x3F);
opcode!( CONFIG_SIG_MODEL_APP_GET 0x80, 0x4B);
opcode!( CONFIG_SIG_MODEL_APP_LIST 0x80, 0x4C);
opcode!( CONFIG_VENDOR_MODEL_APP_GET 0x80, 0x4D );
opcode!( CONFIG_VENDOR_MODEL_APP_LIST 0x80, 0x4E );

pub const MODEL_APP_STATUS_SIG_MODEL_PDU_LENGTH: usize = 7;
pub const MODEL_APP_STATUS_VENDOR_MODEL_PDU_LENGTH: usize = 9;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelAppMessage {
    Bind(ModelAppPayload),
    Status(ModelAppStatusMessage),
    Unbind(ModelAppPayload),
    /// SIG or vendor Model App Get, chosen by the model identifier.
    Get(ModelAppGetMessage),
    /// SIG or vendor Model App List, chosen by the model identifier.
    List(ModelAppListMessage),
}

impl ModelAppMessage {
    pub fn parse_bind(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Bind(ModelAppPayload::parse(parameters)?))
    }

    pub fn parse_unbind(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Unbind(ModelAppPayload::parse(parameters)?))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        match parameters.len() {
            MODEL_APP_STATUS_SIG_MODEL_PDU_LENGTH | MODEL_APP_STATUS_VENDOR_MODEL_PDU_LENGTH => {
                Ok(Self::Status(ModelAppStatusMessage {
                    status: parameters[0].into(),
                    element_address: Address::parse_le(&parameters[1..])?,
                    app_key_index: AppKeyIndex::parse(&parameters[3..])?,
                    model_identifier: ModelIdentifier::parse(&parameters[5..])?,
                }))
            }
            _ => Err(ParseError::InvalidLength),
        }
    }

    pub fn parse_sig_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 4 {
            Ok(Self::Get(ModelAppGetMessage::parse(parameters)?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_vendor_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 6 {
            Ok(Self::Get(ModelAppGetMessage::parse(parameters)?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_sig_list(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::List(ModelAppListMessage::parse(parameters, 2)?))
    }

    pub fn parse_vendor_list(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::List(ModelAppListMessage::parse(parameters, 4)?))
    }
}

impl Message for ModelAppMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Bind(_) => CONFIG_MODEL_APP_BIND,
            Self::Status(_) => CONFIG_MODEL_APP_STATUS,
            Self::Unbind(_) => CONFIG_MODEL_APP_UNBIND,
            Self::Get(inner) if inner.model_identifier.is_sig() => CONFIG_SIG_MODEL_APP_GET,
            Self::Get(_) => CONFIG_VENDOR_MODEL_APP_GET,
            Self::List(inner) if inner.model_identifier.is_sig() => CONFIG_SIG_MODEL_APP_LIST,
            Self::List(_) => CONFIG_VENDOR_MODEL_APP_LIST,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            ModelAppMessage::Bind(inner) => inner.emit_parameters(xmit),
            ModelAppMessage::Status(inner) => inner.emit_parameters(xmit),
            ModelAppMessage::Unbind(inner) => inner.emit_parameters(xmit),
            ModelAppMessage::Get(inner) => {
                inner.element_address.emit_le(xmit)?;
                inner.model_identifier.emit(xmit)
            }
            ModelAppMessage::List(inner) => inner.emit_parameters(xmit),
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Bind(_) | Self::Unbind(_) => &[CONFIG_MODEL_APP_STATUS],
            Self::Get(inner) if inner.model_identifier.is_sig() => &[CONFIG_SIG_MODEL_APP_LIST],
            Self::Get(_) => &[CONFIG_VENDOR_MODEL_APP_LIST],
            Self::Status(_) | Self::List(_) => &[],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelAppPayload {
    pub element_address: UnicastAddress,
    pub app_key_index: AppKeyIndex,
    pub model_identifier: ModelIdentifier,
}

impl ModelAppPayload {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 6 || parameters.len() == 8 {
            let element_address = UnicastAddress::parse_le(parameters)?;
            let app_key_index = AppKeyIndex::parse(&parameters[2..=3])?;
            let model_identifier = ModelIdentifier::parse(&parameters[4..])?;
            Ok(Self {
                element_address,
                app_key_index,
                model_identifier,
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
        self.app_key_index.emit(xmit)?;
        self.model_identifier.emit(xmit)?;
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelAppStatusMessage {
    pub status: Status,
    pub element_address: Address,
    pub app_key_index: AppKeyIndex,
    pub model_identifier: ModelIdentifier,
}

impl ModelAppStatusMessage {
    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.status.emit(xmit)?;
        self.element_address.emit_le(xmit)?;
        self.app_key_index.emit(xmit)?;
        self.model_identifier.emit(xmit)?;
        Ok(())
    }
}

impl StatusMessage for ModelAppStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelAppGetMessage {
    pub element_address: UnicastAddress,
    pub model_identifier: ModelIdentifier,
}

impl ModelAppGetMessage {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self {
            element_address: UnicastAddress::parse_le(parameters)?,
            model_identifier: ModelIdentifier::parse(&parameters[2..])?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelAppListMessage {
    pub status: Status,
    pub element_address: Address,
    pub model_identifier: ModelIdentifier,
    pub app_key_indexes: Vec<AppKeyIndex, MAX_KEY_INDEXES>,
}

impl ModelAppListMessage {
    fn parse(parameters: &[u8], model_len: usize) -> Result<Self, ParseError> {
        let header = 3 + model_len;
        if parameters.len() >= header {
            Ok(Self {
                status: parameters[0].into(),
                element_address: Address::parse_le(&parameters[1..])?,
                model_identifier: ModelIdentifier::parse(&parameters[3..header])?,
                app_key_indexes: parse_indexes(&parameters[header..])?,
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
        self.model_identifier.emit(xmit)?;
        KeyIndex::emit_list(&self.app_key_indexes, xmit)
    }
}

impl StatusMessage for ModelAppListMessage {
    fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompanyIdentifier;

    #[test]
    fn test_status_lengths() {
        let sig = ModelAppMessage::parse_status(&[0x00, 0x05, 0x00, 0x01, 0x00, 0x00, 0x10]).unwrap();
        match sig {
            ModelAppMessage::Status(inner) => {
                assert!(inner.is_successful());
                assert_eq!(0x0005, inner.element_address.value());
                assert_eq!(1, inner.app_key_index.value());
                assert_eq!(ModelIdentifier::SIG(0x1000), inner.model_identifier);
            }
            _ => panic!("expected status"),
        }

        let vendor = ModelAppMessage::parse_status(&[
            0x02, 0x05, 0x00, 0x01, 0x00, 0x59, 0x00, 0x01, 0x00,
        ])
        .unwrap();
        match vendor {
            ModelAppMessage::Status(inner) => {
                assert_eq!(Status::InvalidModel, inner.status);
                assert_eq!(
                    ModelIdentifier::Vendor(CompanyIdentifier(0x0059), 0x0001),
                    inner.model_identifier
                );
            }
            _ => panic!("expected status"),
        }

        for len in [0usize, 6, 8, 10] {
            assert_eq!(
                Err(ParseError::InvalidLength),
                ModelAppMessage::parse_status(&[0u8; 10][..len])
            );
        }
    }

    #[test]
    fn test_get_selects_opcode_from_model() {
        let sig = ModelAppMessage::Get(ModelAppGetMessage {
            element_address: UnicastAddress::new(0x0005).unwrap(),
            model_identifier: ModelIdentifier::SIG(0x1000),
        });
        assert_eq!(CONFIG_SIG_MODEL_APP_GET, sig.opcode());
        assert_eq!(&[CONFIG_SIG_MODEL_APP_LIST], sig.response_opcodes());

        let vendor = ModelAppMessage::Get(ModelAppGetMessage {
            element_address: UnicastAddress::new(0x0005).unwrap(),
            model_identifier: ModelIdentifier::Vendor(CompanyIdentifier(0x0059), 0x0001),
        });
        assert_eq!(CONFIG_VENDOR_MODEL_APP_GET, vendor.opcode());
        let mut xmit: Vec<u8, 8> = Vec::new();
        vendor.emit_parameters(&mut xmit).unwrap();
        assert_eq!(vendor, ModelAppMessage::parse_vendor_get(&xmit).unwrap());
    }

    #[test]
    fn test_sig_list() {
        let list = ModelAppMessage::parse_sig_list(&[0x00, 0x05, 0x00, 0x00, 0x10, 0x01, 0x00]).unwrap();
        match list {
            ModelAppMessage::List(inner) => {
                assert_eq!(&[AppKeyIndex::new(1)], &*inner.app_key_indexes);
            }
            _ => panic!("expected list"),
        }
        assert_eq!(
            Err(ParseError::InvalidLength),
            ModelAppMessage::parse_sig_list(&[0x00, 0x05, 0x00, 0x00])
        );
    }
}

use crate::address::{Address, GroupAddress, LabelUuid, UnicastAddress};
use crate::model::{Message, ModelIdentifier};
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::status::{Status, StatusMessage};
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

opcode!( CONFIG_MODEL_SUBSCRIPTION_ADD 0x80, 0x1B);
opcode!( CONFIG_MODEL_SUBSCRIPTION_DELETE 0x80, 0x1C);
opcode!( CONFIG_MODEL_SUBSCRIPTION_DELETE_ALL 0x80, 0x1D);
opcode!( CONFIG_MODEL_SUBSCRIPTION_OVERWRITE 0x80, 0x1E);
opcode!( CONFIG_MODEL_SUBSCRIPTION_STATUS 0x80, 0x1F);
opcode!( CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_ADD 0x80, 0x20);
opcode!( CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_DELETE 0x80, 0x21);
opcode!( CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_OVERWRITE 0x80, 0x22);
opcode!( CONFIG_SIG_MODEL_SUBSCRIPTION_GET 0x80, 0x29);
opcode!( CONFIG_SIG_MODEL_SUBSCRIPTION_LIST 0x80, 0x2A);
opcode!( CONFIG_VENDOR_MODEL_SUBSCRIPTION_GET 0x80, 0x2B);
opcode!( CONFIG_VENDOR_MODEL_SUBSCRIPTION_LIST 0x80, 0x2C);

pub const MODEL_SUBSCRIPTION_STATUS_SIG_MODEL_PDU_LENGTH: usize = 7;
pub const MODEL_SUBSCRIPTION_STATUS_VENDOR_MODEL_PDU_LENGTH: usize = 9;

/// Subscription addresses that fit in one access payload.
pub const MAX_SUBSCRIPTION_ADDRESSES: usize = 192;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelSubscriptionMessage {
    Add(ModelSubscriptionPayload),
    Delete(ModelSubscriptionPayload),
    DeleteAll(ModelSubscriptionDeleteAllMessage),
    Overwrite(ModelSubscriptionPayload),
    Status(ModelSubscriptionStatusMessage),
    /// SIG or vendor Model Subscription Get, chosen by the model identifier.
    Get(ModelSubscriptionGetMessage),
    /// SIG or vendor Model Subscription List, chosen by the model identifier.
    List(ModelSubscriptionListMessage),
}

impl Message for ModelSubscriptionMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Add(inner) if inner.subscription_address.is_virtual() => {
                CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_ADD
            }
            Self::Add(_) => CONFIG_MODEL_SUBSCRIPTION_ADD,
            Self::Delete(inner) if inner.subscription_address.is_virtual() => {
                CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_DELETE
            }
            Self::Delete(_) => CONFIG_MODEL_SUBSCRIPTION_DELETE,
            Self::DeleteAll(_) => CONFIG_MODEL_SUBSCRIPTION_DELETE_ALL,
            Self::Overwrite(inner) if inner.subscription_address.is_virtual() => {
                CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_OVERWRITE
            }
            Self::Overwrite(_) => CONFIG_MODEL_SUBSCRIPTION_OVERWRITE,
            Self::Status(_) => CONFIG_MODEL_SUBSCRIPTION_STATUS,
            Self::Get(inner) if inner.model_identifier.is_sig() => {
                CONFIG_SIG_MODEL_SUBSCRIPTION_GET
            }
            Self::Get(_) => CONFIG_VENDOR_MODEL_SUBSCRIPTION_GET,
            Self::List(inner) if inner.model_identifier.is_sig() => {
                CONFIG_SIG_MODEL_SUBSCRIPTION_LIST
            }
            Self::List(_) => CONFIG_VENDOR_MODEL_SUBSCRIPTION_LIST,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Add(inner) | Self::Delete(inner) | Self::Overwrite(inner) => {
                inner.emit_parameters(xmit)
            }
            Self::DeleteAll(inner) => {
                inner.element_address.emit_le(xmit)?;
                inner.model_identifier.emit(xmit)
            }
            Self::Status(inner) => inner.emit_parameters(xmit),
            Self::Get(inner) => {
                inner.element_address.emit_le(xmit)?;
                inner.model_identifier.emit(xmit)
            }
            Self::List(inner) => inner.emit_parameters(xmit),
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Add(_) | Self::Delete(_) | Self::DeleteAll(_) | Self::Overwrite(_) => {
                &[CONFIG_MODEL_SUBSCRIPTION_STATUS]
            }
            Self::Get(inner) if inner.model_identifier.is_sig() => {
                &[CONFIG_SIG_MODEL_SUBSCRIPTION_LIST]
            }
            Self::Get(_) => &[CONFIG_VENDOR_MODEL_SUBSCRIPTION_LIST],
            Self::Status(_) | Self::List(_) => &[],
        }
    }
}

impl ModelSubscriptionMessage {
    pub fn parse_add(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Add(ModelSubscriptionPayload::parse(parameters)?))
    }

    pub fn parse_delete(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Delete(ModelSubscriptionPayload::parse(parameters)?))
    }

    pub fn parse_overwrite(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Overwrite(ModelSubscriptionPayload::parse(parameters)?))
    }

    pub fn parse_virtual_address_add(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Add(ModelSubscriptionPayload::parse_virtual_address(
            parameters,
        )?))
    }

    pub fn parse_virtual_address_delete(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Delete(ModelSubscriptionPayload::parse_virtual_address(
            parameters,
        )?))
    }

    pub fn parse_virtual_address_overwrite(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Overwrite(
            ModelSubscriptionPayload::parse_virtual_address(parameters)?,
        ))
    }

    pub fn parse_delete_all(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 4 || parameters.len() == 6 {
            Ok(Self::DeleteAll(ModelSubscriptionDeleteAllMessage {
                element_address: UnicastAddress::parse_le(parameters)?,
                model_identifier: ModelIdentifier::parse(&parameters[2..])?,
            }))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    /// Config Model Subscription Status.
    ///
    /// The status carries exactly one subscription address. Seven octets
    /// hold a SIG model identifier, nine octets a vendor one.
    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        match parameters.len() {
            MODEL_SUBSCRIPTION_STATUS_SIG_MODEL_PDU_LENGTH
            | MODEL_SUBSCRIPTION_STATUS_VENDOR_MODEL_PDU_LENGTH => {
                Ok(Self::Status(ModelSubscriptionStatusMessage {
                    status: parameters[0].into(),
                    element_address: Address::parse_le(&parameters[1..])?,
                    subscription_address: Address::parse_le(&parameters[3..])?,
                    model_identifier: ModelIdentifier::parse(&parameters[5..])?,
                }))
            }
            _ => Err(ParseError::InvalidLength),
        }
    }

    pub fn parse_sig_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 4 {
            Ok(Self::Get(ModelSubscriptionGetMessage::parse(parameters)?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_vendor_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 6 {
            Ok(Self::Get(ModelSubscriptionGetMessage::parse(parameters)?))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_sig_list(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::List(ModelSubscriptionListMessage::parse(
            parameters, 2,
        )?))
    }

    pub fn parse_vendor_list(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::List(ModelSubscriptionListMessage::parse(
            parameters, 4,
        )?))
    }
}

/// Address a model may be subscribed to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubscriptionAddress {
    Group(GroupAddress),
    Virtual(LabelUuid),
}

impl SubscriptionAddress {
    /// A group subscription. All-nodes is implicit and never subscribed to.
    pub fn group(address: GroupAddress) -> Result<Self, ParseError> {
        match address {
            GroupAddress::AllNodes => Err(ParseError::InvalidValue),
            address => Ok(Self::Group(address)),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, SubscriptionAddress::Virtual(_))
    }
}

impl From<SubscriptionAddress> for Address {
    fn from(addr: SubscriptionAddress) -> Self {
        match addr {
            SubscriptionAddress::Group(inner) => Address::Group(inner),
            SubscriptionAddress::Virtual(inner) => Address::LabelUuid(inner),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelSubscriptionPayload {
    pub element_address: UnicastAddress,
    pub subscription_address: SubscriptionAddress,
    pub model_identifier: ModelIdentifier,
}

impl ModelSubscriptionPayload {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 6 || parameters.len() == 8 {
            let element_address = UnicastAddress::parse_le(parameters)?;
            let subscription_address = match Address::parse_le(&parameters[2..])? {
                Address::Group(inner) => SubscriptionAddress::group(inner)?,
                _ => return Err(ParseError::InvalidValue),
            };
            Ok(Self {
                element_address,
                subscription_address,
                model_identifier: ModelIdentifier::parse(&parameters[4..])?,
            })
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    fn parse_virtual_address(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 20 || parameters.len() == 22 {
            Ok(Self {
                element_address: UnicastAddress::parse_le(parameters)?,
                subscription_address: SubscriptionAddress::Virtual(LabelUuid::parse(
                    &parameters[2..18],
                )?),
                model_identifier: ModelIdentifier::parse(&parameters[18..])?,
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
        match &self.subscription_address {
            SubscriptionAddress::Group(inner) => Address::Group(*inner).emit_le(xmit)?,
            SubscriptionAddress::Virtual(label) => label.emit(xmit)?,
        }
        self.model_identifier.emit(xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelSubscriptionDeleteAllMessage {
    pub element_address: UnicastAddress,
    pub model_identifier: ModelIdentifier,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelSubscriptionStatusMessage {
    pub status: Status,
    pub element_address: Address,
    /// Unassigned when the request carried no single address.
    pub subscription_address: Address,
    pub model_identifier: ModelIdentifier,
}

impl ModelSubscriptionStatusMessage {
    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.status.emit(xmit)?;
        self.element_address.emit_le(xmit)?;
        self.subscription_address.emit_le(xmit)?;
        self.model_identifier.emit(xmit)
    }
}

impl StatusMessage for ModelSubscriptionStatusMessage {
    fn status(&self) -> Status {
        self.status
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelSubscriptionGetMessage {
    pub element_address: UnicastAddress,
    pub model_identifier: ModelIdentifier,
}

impl ModelSubscriptionGetMessage {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self {
            element_address: UnicastAddress::parse_le(parameters)?,
            model_identifier: ModelIdentifier::parse(&parameters[2..])?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelSubscriptionListMessage {
    pub status: Status,
    pub element_address: Address,
    pub model_identifier: ModelIdentifier,
    pub addresses: Vec<Address, MAX_SUBSCRIPTION_ADDRESSES>,
}

impl ModelSubscriptionListMessage {
    fn parse(parameters: &[u8], model_len: usize) -> Result<Self, ParseError> {
        let header = 3 + model_len;
        if parameters.len() < header || (parameters.len() - header) % 2 != 0 {
            return Err(ParseError::InvalidLength);
        }
        let mut addresses = Vec::new();
        for chunk in parameters[header..].chunks_exact(2) {
            addresses
                .push(Address::parse_le(chunk)?)
                .map_err(|_| ParseError::InsufficientBuffer)?;
        }
        Ok(Self {
            status: parameters[0].into(),
            element_address: Address::parse_le(&parameters[1..])?,
            model_identifier: ModelIdentifier::parse(&parameters[3..header])?,
            addresses,
        })
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        self.status.emit(xmit)?;
        self.element_address.emit_le(xmit)?;
        self.model_identifier.emit(xmit)?;
        for addr in &self.addresses {
            addr.emit_le(xmit)?;
        }
        Ok(())
    }
}

impl StatusMessage for ModelSubscriptionListMessage {
    fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompanyIdentifier;

    fn status_of(message: ModelSubscriptionMessage) -> ModelSubscriptionStatusMessage {
        match message {
            ModelSubscriptionMessage::Status(inner) => inner,
            _ => panic!("expected status"),
        }
    }

    fn list_of(message: ModelSubscriptionMessage) -> ModelSubscriptionListMessage {
        match message {
            ModelSubscriptionMessage::List(inner) => inner,
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_sig_status_success() {
        let status = status_of(
            ModelSubscriptionMessage::parse_status(&[0x00, 0x01, 0x00, 0x02, 0xC0, 0x01, 0x10])
                .unwrap(),
        );
        assert_eq!(0x00, status.status_code());
        assert_eq!(0x0001, status.element_address.value());
        assert_eq!(0xC002, status.subscription_address.value());
        assert_eq!(ModelIdentifier::SIG(0x1001), status.model_identifier);
        assert!(status.is_successful());
    }

    #[test]
    fn test_vendor_status_invalid_address() {
        let status = status_of(
            ModelSubscriptionMessage::parse_status(&[
                0x01, 0x01, 0x00, 0x00, 0x00, 0x01, 0x10, 0x05, 0x00,
            ])
            .unwrap(),
        );
        assert_eq!(0x01, status.status_code());
        assert_eq!("Invalid Address", status.status_name());
        assert_eq!(0x0001, status.element_address.value());
        assert_eq!(Address::Unassigned, status.subscription_address);
        assert_eq!(0x10010005, status.model_identifier.as_u32());
        assert!(!status.is_successful());
    }

    #[test]
    fn test_status_rejects_other_lengths() {
        let bytes = [0u8; 12];
        for len in 0..bytes.len() {
            let result = ModelSubscriptionMessage::parse_status(&bytes[..len]);
            if len == 7 || len == 9 {
                assert!(result.is_ok());
            } else {
                assert_eq!(Err(ParseError::InvalidLength), result, "length {}", len);
            }
        }
    }

    #[test]
    fn test_status_broadcast_and_zero_company() {
        let params = [0x00, 0x05, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00];
        let message = ModelSubscriptionMessage::parse_status(&params).unwrap();
        let status = status_of(message.clone());
        assert_eq!(Address::Group(GroupAddress::AllNodes), status.subscription_address);
        assert_eq!(
            ModelIdentifier::Vendor(CompanyIdentifier(0), 0),
            status.model_identifier
        );
        let mut xmit: Vec<u8, 16> = Vec::new();
        message.emit_parameters(&mut xmit).unwrap();
        assert_eq!(&params, &*xmit);
    }

    #[test]
    fn test_sig_list_three_entries() {
        let list = list_of(
            ModelSubscriptionMessage::parse_sig_list(&[
                0x00, 0x05, 0x00, 0x00, 0x10, 0x01, 0xC0, 0x02, 0xC0, 0x03, 0xC0,
            ])
            .unwrap(),
        );
        assert_eq!(0x0005, list.element_address.value());
        assert_eq!(ModelIdentifier::SIG(0x1000), list.model_identifier);
        let values: std::vec::Vec<u16> = list.addresses.iter().map(Address::value).collect();
        assert_eq!(vec![0xC001, 0xC002, 0xC003], values);
    }

    #[test]
    fn test_sig_list_length_law() {
        let empty = list_of(
            ModelSubscriptionMessage::parse_sig_list(&[0x00, 0x05, 0x00, 0x00, 0x10]).unwrap(),
        );
        assert!(empty.addresses.is_empty());

        assert_eq!(
            Err(ParseError::InvalidLength),
            ModelSubscriptionMessage::parse_sig_list(&[0x00, 0x05, 0x00, 0x00, 0x10, 0x01])
        );
        assert_eq!(
            Err(ParseError::InvalidLength),
            ModelSubscriptionMessage::parse_sig_list(&[0x00, 0x05, 0x00, 0x00])
        );
    }

    #[test]
    fn test_vendor_list() {
        let list = list_of(
            ModelSubscriptionMessage::parse_vendor_list(&[
                0x00, 0x05, 0x00, 0x59, 0x00, 0x01, 0x00, 0x01, 0xC0,
            ])
            .unwrap(),
        );
        assert_eq!(
            ModelIdentifier::Vendor(CompanyIdentifier(0x0059), 0x0001),
            list.model_identifier
        );
        assert_eq!(1, list.addresses.len());
        assert_eq!(
            Err(ParseError::InvalidLength),
            ModelSubscriptionMessage::parse_vendor_list(&[0x00, 0x05, 0x00, 0x59, 0x00, 0x01, 0x00, 0x01])
        );
    }

    #[test]
    fn test_add_selects_opcode_from_address() {
        let add = ModelSubscriptionMessage::parse_add(&[0x05, 0x00, 0x01, 0xC0, 0x00, 0x10]).unwrap();
        assert_eq!(CONFIG_MODEL_SUBSCRIPTION_ADD, add.opcode());
        assert_eq!(&[CONFIG_MODEL_SUBSCRIPTION_STATUS], add.response_opcodes());

        let label = LabelUuid::new([0x22; 16]).unwrap();
        let add = ModelSubscriptionMessage::Add(ModelSubscriptionPayload {
            element_address: UnicastAddress::new(0x0005).unwrap(),
            subscription_address: SubscriptionAddress::Virtual(label),
            model_identifier: ModelIdentifier::SIG(0x1000),
        });
        assert_eq!(CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_ADD, add.opcode());
        let mut xmit: Vec<u8, 32> = Vec::new();
        add.emit_parameters(&mut xmit).unwrap();
        assert_eq!(20, xmit.len());
        assert_eq!(add, ModelSubscriptionMessage::parse_virtual_address_add(&xmit).unwrap());
    }

    #[test]
    fn test_add_rejects_non_group_addresses() {
        // unassigned, unicast, virtual and all-nodes
        for addr in [[0x00, 0x00], [0x01, 0x00], [0x01, 0x80], [0xFF, 0xFF]] {
            let params = [0x05, 0x00, addr[0], addr[1], 0x00, 0x10];
            assert_eq!(
                Err(ParseError::InvalidValue),
                ModelSubscriptionMessage::parse_add(&params)
            );
        }
    }

    #[test]
    fn test_all_nodes_is_not_a_subscription() {
        assert_eq!(
            Err(ParseError::InvalidValue),
            SubscriptionAddress::group(GroupAddress::AllNodes)
        );
        assert_eq!(
            Ok(SubscriptionAddress::Group(GroupAddress::AllRelays)),
            SubscriptionAddress::group(GroupAddress::AllRelays)
        );
    }

    #[test]
    fn test_get_selects_list_response() {
        let get = ModelSubscriptionMessage::parse_vendor_get(&[0x05, 0x00, 0x59, 0x00, 0x01, 0x00]).unwrap();
        assert_eq!(CONFIG_VENDOR_MODEL_SUBSCRIPTION_GET, get.opcode());
        assert_eq!(&[CONFIG_VENDOR_MODEL_SUBSCRIPTION_LIST], get.response_opcodes());
        assert_eq!(
            Err(ParseError::InvalidLength),
            ModelSubscriptionMessage::parse_sig_get(&[0x05, 0x00, 0x59, 0x00, 0x01, 0x00])
        );
    }
}

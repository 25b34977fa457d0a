use crate::model::foundation::configuration::app_key::*;
use crate::model::foundation::configuration::beacon::*;
use crate::model::foundation::configuration::composition_data::*;
use crate::model::foundation::configuration::default_ttl::*;
use crate::model::foundation::configuration::friend::*;
use crate::model::foundation::configuration::gatt_proxy::*;
use crate::model::foundation::configuration::heartbeat::*;
use crate::model::foundation::configuration::key_refresh_phase::*;
use crate::model::foundation::configuration::low_power::*;
use crate::model::foundation::configuration::model_app::*;
use crate::model::foundation::configuration::model_publication::*;
use crate::model::foundation::configuration::model_subscription::*;
use crate::model::foundation::configuration::net_key::*;
use crate::model::foundation::configuration::network_transmit::*;
use crate::model::foundation::configuration::node_identity::*;
use crate::model::foundation::configuration::node_reset::*;
use crate::model::foundation::configuration::relay::*;
use crate::model::{Message, Model, ModelIdentifier};
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use heapless::Vec;
use serde::{Deserialize, Serialize};

pub mod app_key;
pub mod beacon;
pub mod composition_data;
pub mod default_ttl;
pub mod friend;
pub mod gatt_proxy;
pub mod heartbeat;
pub mod key_refresh_phase;
pub mod low_power;
pub mod model_app;
pub mod model_publication;
pub mod model_subscription;
pub mod net_key;
pub mod network_transmit;
pub mod node_identity;
pub mod node_reset;
pub mod relay;

pub const CONFIGURATION_SERVER: ModelIdentifier = ModelIdentifier::SIG(0x0000);
pub const CONFIGURATION_CLIENT: ModelIdentifier = ModelIdentifier::SIG(0x0001);

/// Upper bound on key indexes packed into one access payload.
pub const MAX_KEY_INDEXES: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationMessage {
    AppKey(AppKeyMessage),
    Beacon(BeaconMessage),
    CompositionData(CompositionDataMessage),
    DefaultTTL(DefaultTTLMessage),
    Friend(FriendMessage),
    GattProxy(GattProxyMessage),
    HeartbeatPublication(HeartbeatPublicationMessage),
    HeartbeatSubscription(HeartbeatSubscriptionMessage),
    KeyRefreshPhase(KeyRefreshPhaseMessage),
    LowPowerNodePollTimeout(LowPowerNodePollTimeoutMessage),
    ModelApp(ModelAppMessage),
    ModelPublication(ModelPublicationMessage),
    ModelSubscription(ModelSubscriptionMessage),
    NetKey(NetKeyMessage),
    NetworkTransmit(NetworkTransmitMessage),
    NodeIdentity(NodeIdentityMessage),
    NodeReset(NodeResetMessage),
    Relay(RelayMessage),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            ConfigurationMessage::AppKey($inner) => $body,
            ConfigurationMessage::Beacon($inner) => $body,
            ConfigurationMessage::CompositionData($inner) => $body,
            ConfigurationMessage::DefaultTTL($inner) => $body,
            ConfigurationMessage::Friend($inner) => $body,
            ConfigurationMessage::GattProxy($inner) => $body,
            ConfigurationMessage::HeartbeatPublication($inner) => $body,
            ConfigurationMessage::HeartbeatSubscription($inner) => $body,
            ConfigurationMessage::KeyRefreshPhase($inner) => $body,
            ConfigurationMessage::LowPowerNodePollTimeout($inner) => $body,
            ConfigurationMessage::ModelApp($inner) => $body,
            ConfigurationMessage::ModelPublication($inner) => $body,
            ConfigurationMessage::ModelSubscription($inner) => $body,
            ConfigurationMessage::NetKey($inner) => $body,
            ConfigurationMessage::NetworkTransmit($inner) => $body,
            ConfigurationMessage::NodeIdentity($inner) => $body,
            ConfigurationMessage::NodeReset($inner) => $body,
            ConfigurationMessage::Relay($inner) => $body,
        }
    };
}

impl Message for ConfigurationMessage {
    fn opcode(&self) -> Opcode {
        dispatch!(self, inner => inner.opcode())
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        dispatch!(self, inner => inner.emit_parameters(xmit))
    }

    fn response_opcodes(&self) -> &[Opcode] {
        dispatch!(self, inner => inner.response_opcodes())
    }
}

macro_rules! parse_as {
    ($variant:ident, $parse:expr, $parameters:ident) => {
        Ok(Some(ConfigurationMessage::$variant($parse($parameters)?)))
    };
}

/// Decodes the requests a configuration server receives.
#[derive(Default)]
pub struct ConfigurationServer;

impl Model for ConfigurationServer {
    const IDENTIFIER: ModelIdentifier = CONFIGURATION_SERVER;
    const OPCODES: &'static [Opcode] = &[
        CONFIG_APPKEY_ADD,
        CONFIG_APPKEY_UPDATE,
        CONFIG_APPKEY_DELETE,
        CONFIG_APPKEY_GET,
        CONFIG_BEACON_GET,
        CONFIG_BEACON_SET,
        CONFIG_COMPOSITION_DATA_GET,
        CONFIG_DEFAULT_TTL_GET,
        CONFIG_DEFAULT_TTL_SET,
        CONFIG_FRIEND_GET,
        CONFIG_FRIEND_SET,
        CONFIG_GATT_PROXY_GET,
        CONFIG_GATT_PROXY_SET,
        CONFIG_HEARTBEAT_PUBLICATION_GET,
        CONFIG_HEARTBEAT_PUBLICATION_SET,
        CONFIG_HEARTBEAT_SUBSCRIPTION_GET,
        CONFIG_HEARTBEAT_SUBSCRIPTION_SET,
        CONFIG_KEY_REFRESH_PHASE_GET,
        CONFIG_KEY_REFRESH_PHASE_SET,
        CONFIG_LOW_POWER_NODE_POLLTIMEOUT_GET,
        CONFIG_MODEL_APP_BIND,
        CONFIG_MODEL_APP_UNBIND,
        CONFIG_SIG_MODEL_APP_GET,
        CONFIG_VENDOR_MODEL_APP_GET,
        CONFIG_MODEL_PUBLICATION_GET,
        CONFIG_MODEL_PUBLICATION_SET,
        CONFIG_MODEL_PUBLICATION_VIRTUAL_ADDRESS_SET,
        CONFIG_MODEL_SUBSCRIPTION_ADD,
        CONFIG_MODEL_SUBSCRIPTION_DELETE,
        CONFIG_MODEL_SUBSCRIPTION_DELETE_ALL,
        CONFIG_MODEL_SUBSCRIPTION_OVERWRITE,
        CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_ADD,
        CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_DELETE,
        CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_OVERWRITE,
        CONFIG_SIG_MODEL_SUBSCRIPTION_GET,
        CONFIG_VENDOR_MODEL_SUBSCRIPTION_GET,
        CONFIG_NETKEY_ADD,
        CONFIG_NETKEY_UPDATE,
        CONFIG_NETKEY_DELETE,
        CONFIG_NETKEY_GET,
        CONFIG_NETWORK_TRANSMIT_GET,
        CONFIG_NETWORK_TRANSMIT_SET,
        CONFIG_NODE_IDENTITY_GET,
        CONFIG_NODE_IDENTITY_SET,
        CONFIG_NODE_RESET,
        CONFIG_RELAY_GET,
        CONFIG_RELAY_SET,
    ];

    type Message = ConfigurationMessage;

    fn parse(
        &self,
        opcode: &Opcode,
        parameters: &[u8],
    ) -> Result<Option<Self::Message>, ParseError> {
        match *opcode {
            // App Key
            CONFIG_APPKEY_ADD => parse_as!(AppKey, AppKeyMessage::parse_add, parameters),
            CONFIG_APPKEY_UPDATE => parse_as!(AppKey, AppKeyMessage::parse_update, parameters),
            CONFIG_APPKEY_DELETE => parse_as!(AppKey, AppKeyMessage::parse_delete, parameters),
            CONFIG_APPKEY_GET => parse_as!(AppKey, AppKeyMessage::parse_get, parameters),
            // Beacon
            CONFIG_BEACON_GET => parse_as!(Beacon, BeaconMessage::parse_get, parameters),
            CONFIG_BEACON_SET => parse_as!(Beacon, BeaconMessage::parse_set, parameters),
            // Composition Data
            CONFIG_COMPOSITION_DATA_GET => {
                parse_as!(CompositionData, CompositionDataMessage::parse_get, parameters)
            }
            // Default TTL
            CONFIG_DEFAULT_TTL_GET => parse_as!(DefaultTTL, DefaultTTLMessage::parse_get, parameters),
            CONFIG_DEFAULT_TTL_SET => parse_as!(DefaultTTL, DefaultTTLMessage::parse_set, parameters),
            // Friend
            CONFIG_FRIEND_GET => parse_as!(Friend, FriendMessage::parse_get, parameters),
            CONFIG_FRIEND_SET => parse_as!(Friend, FriendMessage::parse_set, parameters),
            // GATT Proxy
            CONFIG_GATT_PROXY_GET => parse_as!(GattProxy, GattProxyMessage::parse_get, parameters),
            CONFIG_GATT_PROXY_SET => parse_as!(GattProxy, GattProxyMessage::parse_set, parameters),
            // Heartbeat
            CONFIG_HEARTBEAT_PUBLICATION_GET => parse_as!(
                HeartbeatPublication,
                HeartbeatPublicationMessage::parse_get,
                parameters
            ),
            CONFIG_HEARTBEAT_PUBLICATION_SET => parse_as!(
                HeartbeatPublication,
                HeartbeatPublicationMessage::parse_set,
                parameters
            ),
            CONFIG_HEARTBEAT_SUBSCRIPTION_GET => parse_as!(
                HeartbeatSubscription,
                HeartbeatSubscriptionMessage::parse_get,
                parameters
            ),
            CONFIG_HEARTBEAT_SUBSCRIPTION_SET => parse_as!(
                HeartbeatSubscription,
                HeartbeatSubscriptionMessage::parse_set,
                parameters
            ),
            // Key Refresh Phase
            CONFIG_KEY_REFRESH_PHASE_GET => {
                parse_as!(KeyRefreshPhase, KeyRefreshPhaseMessage::parse_get, parameters)
            }
            CONFIG_KEY_REFRESH_PHASE_SET => {
                parse_as!(KeyRefreshPhase, KeyRefreshPhaseMessage::parse_set, parameters)
            }
            // Low Power Node
            CONFIG_LOW_POWER_NODE_POLLTIMEOUT_GET => parse_as!(
                LowPowerNodePollTimeout,
                LowPowerNodePollTimeoutMessage::parse_get,
                parameters
            ),
            // Model App
            CONFIG_MODEL_APP_BIND => parse_as!(ModelApp, ModelAppMessage::parse_bind, parameters),
            CONFIG_MODEL_APP_UNBIND => {
                parse_as!(ModelApp, ModelAppMessage::parse_unbind, parameters)
            }
            CONFIG_SIG_MODEL_APP_GET => {
                parse_as!(ModelApp, ModelAppMessage::parse_sig_get, parameters)
            }
            CONFIG_VENDOR_MODEL_APP_GET => {
                parse_as!(ModelApp, ModelAppMessage::parse_vendor_get, parameters)
            }
            // Model Publication
            CONFIG_MODEL_PUBLICATION_GET => {
                parse_as!(ModelPublication, ModelPublicationMessage::parse_get, parameters)
            }
            CONFIG_MODEL_PUBLICATION_SET => {
                parse_as!(ModelPublication, ModelPublicationMessage::parse_set, parameters)
            }
            CONFIG_MODEL_PUBLICATION_VIRTUAL_ADDRESS_SET => parse_as!(
                ModelPublication,
                ModelPublicationMessage::parse_virtual_address_set,
                parameters
            ),
            // Model Subscription
            CONFIG_MODEL_SUBSCRIPTION_ADD => {
                parse_as!(ModelSubscription, ModelSubscriptionMessage::parse_add, parameters)
            }
            CONFIG_MODEL_SUBSCRIPTION_DELETE => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_delete,
                parameters
            ),
            CONFIG_MODEL_SUBSCRIPTION_DELETE_ALL => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_delete_all,
                parameters
            ),
            CONFIG_MODEL_SUBSCRIPTION_OVERWRITE => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_overwrite,
                parameters
            ),
            CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_ADD => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_virtual_address_add,
                parameters
            ),
            CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_DELETE => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_virtual_address_delete,
                parameters
            ),
            CONFIG_MODEL_SUBSCRIPTION_VIRTUAL_ADDRESS_OVERWRITE => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_virtual_address_overwrite,
                parameters
            ),
            CONFIG_SIG_MODEL_SUBSCRIPTION_GET => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_sig_get,
                parameters
            ),
            CONFIG_VENDOR_MODEL_SUBSCRIPTION_GET => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_vendor_get,
                parameters
            ),
            // Net Key
            CONFIG_NETKEY_ADD => parse_as!(NetKey, NetKeyMessage::parse_add, parameters),
            CONFIG_NETKEY_UPDATE => parse_as!(NetKey, NetKeyMessage::parse_update, parameters),
            CONFIG_NETKEY_DELETE => parse_as!(NetKey, NetKeyMessage::parse_delete, parameters),
            CONFIG_NETKEY_GET => parse_as!(NetKey, NetKeyMessage::parse_get, parameters),
            // Network Transmit
            CONFIG_NETWORK_TRANSMIT_GET => {
                parse_as!(NetworkTransmit, NetworkTransmitMessage::parse_get, parameters)
            }
            CONFIG_NETWORK_TRANSMIT_SET => {
                parse_as!(NetworkTransmit, NetworkTransmitMessage::parse_set, parameters)
            }
            // Node Identity
            CONFIG_NODE_IDENTITY_GET => {
                parse_as!(NodeIdentity, NodeIdentityMessage::parse_get, parameters)
            }
            CONFIG_NODE_IDENTITY_SET => {
                parse_as!(NodeIdentity, NodeIdentityMessage::parse_set, parameters)
            }
            // Node Reset
            CONFIG_NODE_RESET => parse_as!(NodeReset, NodeResetMessage::parse_reset, parameters),
            // Relay
            CONFIG_RELAY_GET => parse_as!(Relay, RelayMessage::parse_get, parameters),
            CONFIG_RELAY_SET => parse_as!(Relay, RelayMessage::parse_set, parameters),
            _ => Ok(None),
        }
    }
}

/// Decodes the status and list messages a configuration client receives.
#[derive(Default)]
pub struct ConfigurationClient;

impl Model for ConfigurationClient {
    const IDENTIFIER: ModelIdentifier = CONFIGURATION_CLIENT;
    const OPCODES: &'static [Opcode] = &[
        CONFIG_APPKEY_LIST,
        CONFIG_APPKEY_STATUS,
        CONFIG_BEACON_STATUS,
        CONFIG_COMPOSITION_DATA_STATUS,
        CONFIG_DEFAULT_TTL_STATUS,
        CONFIG_FRIEND_STATUS,
        CONFIG_GATT_PROXY_STATUS,
        CONFIG_HEARTBEAT_PUBLICATION_STATUS,
        CONFIG_HEARTBEAT_SUBSCRIPTION_STATUS,
        CONFIG_KEY_REFRESH_PHASE_STATUS,
        CONFIG_LOW_POWER_NODE_POLLTIMEOUT_STATUS,
        CONFIG_MODEL_APP_STATUS,
        CONFIG_SIG_MODEL_APP_LIST,
        CONFIG_VENDOR_MODEL_APP_LIST,
        CONFIG_MODEL_PUBLICATION_STATUS,
        CONFIG_MODEL_SUBSCRIPTION_STATUS,
        CONFIG_SIG_MODEL_SUBSCRIPTION_LIST,
        CONFIG_VENDOR_MODEL_SUBSCRIPTION_LIST,
        CONFIG_NETKEY_LIST,
        CONFIG_NETKEY_STATUS,
        CONFIG_NETWORK_TRANSMIT_STATUS,
        CONFIG_NODE_IDENTITY_STATUS,
        CONFIG_NODE_RESET_STATUS,
        CONFIG_RELAY_STATUS,
    ];

    type Message = ConfigurationMessage;

    fn parse(
        &self,
        opcode: &Opcode,
        parameters: &[u8],
    ) -> Result<Option<Self::Message>, ParseError> {
        match *opcode {
            CONFIG_APPKEY_LIST => parse_as!(AppKey, AppKeyMessage::parse_list, parameters),
            CONFIG_APPKEY_STATUS => parse_as!(AppKey, AppKeyMessage::parse_status, parameters),
            CONFIG_BEACON_STATUS => parse_as!(Beacon, BeaconMessage::parse_status, parameters),
            CONFIG_COMPOSITION_DATA_STATUS => {
                parse_as!(CompositionData, CompositionDataMessage::parse_status, parameters)
            }
            CONFIG_DEFAULT_TTL_STATUS => {
                parse_as!(DefaultTTL, DefaultTTLMessage::parse_status, parameters)
            }
            CONFIG_FRIEND_STATUS => parse_as!(Friend, FriendMessage::parse_status, parameters),
            CONFIG_GATT_PROXY_STATUS => {
                parse_as!(GattProxy, GattProxyMessage::parse_status, parameters)
            }
            CONFIG_HEARTBEAT_PUBLICATION_STATUS => parse_as!(
                HeartbeatPublication,
                HeartbeatPublicationMessage::parse_status,
                parameters
            ),
            CONFIG_HEARTBEAT_SUBSCRIPTION_STATUS => parse_as!(
                HeartbeatSubscription,
                HeartbeatSubscriptionMessage::parse_status,
                parameters
            ),
            CONFIG_KEY_REFRESH_PHASE_STATUS => {
                parse_as!(KeyRefreshPhase, KeyRefreshPhaseMessage::parse_status, parameters)
            }
            CONFIG_LOW_POWER_NODE_POLLTIMEOUT_STATUS => parse_as!(
                LowPowerNodePollTimeout,
                LowPowerNodePollTimeoutMessage::parse_status,
                parameters
            ),
            CONFIG_MODEL_APP_STATUS => {
                parse_as!(ModelApp, ModelAppMessage::parse_status, parameters)
            }
            CONFIG_SIG_MODEL_APP_LIST => {
                parse_as!(ModelApp, ModelAppMessage::parse_sig_list, parameters)
            }
            CONFIG_VENDOR_MODEL_APP_LIST => {
                parse_as!(ModelApp, ModelAppMessage::parse_vendor_list, parameters)
            }
            CONFIG_MODEL_PUBLICATION_STATUS => parse_as!(
                ModelPublication,
                ModelPublicationMessage::parse_status,
                parameters
            ),
            CONFIG_MODEL_SUBSCRIPTION_STATUS => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_status,
                parameters
            ),
            CONFIG_SIG_MODEL_SUBSCRIPTION_LIST => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_sig_list,
                parameters
            ),
            CONFIG_VENDOR_MODEL_SUBSCRIPTION_LIST => parse_as!(
                ModelSubscription,
                ModelSubscriptionMessage::parse_vendor_list,
                parameters
            ),
            CONFIG_NETKEY_LIST => parse_as!(NetKey, NetKeyMessage::parse_list, parameters),
            CONFIG_NETKEY_STATUS => parse_as!(NetKey, NetKeyMessage::parse_status, parameters),
            CONFIG_NETWORK_TRANSMIT_STATUS => {
                parse_as!(NetworkTransmit, NetworkTransmitMessage::parse_status, parameters)
            }
            CONFIG_NODE_IDENTITY_STATUS => {
                parse_as!(NodeIdentity, NodeIdentityMessage::parse_status, parameters)
            }
            CONFIG_NODE_RESET_STATUS => {
                parse_as!(NodeReset, NodeResetMessage::parse_status, parameters)
            }
            CONFIG_RELAY_STATUS => parse_as!(Relay, RelayMessage::parse_status, parameters),
            _ => Ok(None),
        }
    }
}

// ------------------------------------------------------------------------
// ------------------------------------------------------------------------

/// A 12-bit global key index.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(from = "u16")]
pub struct KeyIndex(u16);

impl From<u16> for KeyIndex {
    fn from(index: u16) -> Self {
        Self::new(index)
    }
}

impl KeyIndex {
    /// Only the low 12 bits are kept.
    pub fn new(index: u16) -> Self {
        Self(index & 0x0FFF)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// A single index occupies two octets; the upper four bits are padding and must be zero.
    pub(crate) fn parse_one(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() >= 2 {
            let val = u16::from_le_bytes([parameters[0], parameters[1]]);
            if val & 0xF000 != 0 {
                Err(ParseError::InvalidValue)
            } else {
                Ok(Self(val))
            }
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub(crate) fn emit_one<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.extend_from_slice(&self.0.to_le_bytes())
            .map_err(|_| InsufficientBuffer)
    }

    /// Two indexes share three octets: the first in the low 12 bits of the
    /// little-endian 24-bit value, the second in the high 12 bits.
    pub(crate) fn parse_two(parameters: &[u8]) -> Result<(Self, Self), ParseError> {
        if parameters.len() >= 3 {
            let packed = u32::from_le_bytes([parameters[0], parameters[1], parameters[2], 0]);
            let first = (packed & 0x0FFF) as u16;
            let second = ((packed >> 12) & 0x0FFF) as u16;
            Ok((Self(first), Self(second)))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub(crate) fn emit_two<const N: usize>(
        indexes: (&KeyIndex, &KeyIndex),
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        let packed = (indexes.0 .0 as u32 & 0x0FFF) | ((indexes.1 .0 as u32 & 0x0FFF) << 12);
        xmit.extend_from_slice(&packed.to_le_bytes()[0..3])
            .map_err(|_| InsufficientBuffer)
    }

    pub(crate) fn emit_list<T: Copy + Into<KeyIndex>, const N: usize>(
        indexes: &[T],
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        for chunk in indexes.chunks(2) {
            let first: KeyIndex = chunk[0].into();
            if chunk.len() == 2 {
                let second: KeyIndex = chunk[1].into();
                KeyIndex::emit_two((&first, &second), xmit)?;
            } else {
                first.emit_one(xmit)?;
            }
        }
        Ok(())
    }
}

/// Unpack a list of key indexes: pairs in three octets, an odd trailing index in two.
pub(crate) fn parse_indexes<T: From<KeyIndex>, const N: usize>(
    parameters: &[u8],
) -> Result<Vec<T, N>, ParseError> {
    if parameters.len() % 3 == 1 {
        return Err(ParseError::InvalidLength);
    }
    let mut indexes = Vec::new();
    for chunk in parameters.chunks(3) {
        if chunk.len() == 3 {
            let (first, second) = KeyIndex::parse_two(chunk)?;
            indexes
                .push(first.into())
                .map_err(|_| ParseError::InsufficientBuffer)?;
            indexes
                .push(second.into())
                .map_err(|_| ParseError::InsufficientBuffer)?;
        } else {
            indexes
                .push(KeyIndex::parse_one(chunk)?.into())
                .map_err(|_| ParseError::InsufficientBuffer)?;
        }
    }
    Ok(indexes)
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetKeyIndex(KeyIndex);

impl NetKeyIndex {
    pub fn new(index: u16) -> Self {
        Self(KeyIndex::new(index))
    }

    pub fn value(&self) -> u16 {
        self.0.value()
    }

    pub(crate) fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self(KeyIndex::parse_one(parameters)?))
    }

    pub(crate) fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        self.0.emit_one(xmit)
    }
}

impl From<KeyIndex> for NetKeyIndex {
    fn from(index: KeyIndex) -> Self {
        Self(index)
    }
}

impl From<NetKeyIndex> for KeyIndex {
    fn from(index: NetKeyIndex) -> Self {
        index.0
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppKeyIndex(KeyIndex);

impl AppKeyIndex {
    pub fn new(index: u16) -> Self {
        Self(KeyIndex::new(index))
    }

    pub fn value(&self) -> u16 {
        self.0.value()
    }

    pub(crate) fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self(KeyIndex::parse_one(parameters)?))
    }

    pub(crate) fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        self.0.emit_one(xmit)
    }
}

impl From<KeyIndex> for AppKeyIndex {
    fn from(index: KeyIndex) -> Self {
        Self(index)
    }
}

impl From<AppKeyIndex> for KeyIndex {
    fn from(index: AppKeyIndex) -> Self {
        index.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetKeyAppKeyIndexesPair(NetKeyIndex, AppKeyIndex);

impl NetKeyAppKeyIndexesPair {
    pub fn new(net_key: NetKeyIndex, app_key: AppKeyIndex) -> Self {
        Self(net_key, app_key)
    }

    pub(crate) fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        KeyIndex::emit_two((&self.0 .0, &self.1 .0), xmit)
    }

    pub fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 3 {
            let (net_key, app_key) = KeyIndex::parse_two(parameters)?;
            Ok(Self(NetKeyIndex(net_key), AppKeyIndex(app_key)))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn net_key(&self) -> NetKeyIndex {
        self.0
    }

    pub fn app_key(&self) -> AppKeyIndex {
        self.1
    }
}

/// State of an optional node feature (relay, proxy, friend, node identity).
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeatureState {
    SupportedDisabled = 0x00,
    SupportedEnabled = 0x01,
    NotSupported = 0x02,
}

impl FeatureState {
    /// Values a client may request. `NotSupported` is only ever reported.
    pub fn parse_set(data: u8) -> Result<Self, ParseError> {
        match data {
            0x00 => Ok(Self::SupportedDisabled),
            0x01 => Ok(Self::SupportedEnabled),
            _ => Err(ParseError::InvalidValue),
        }
    }

    pub fn parse_status(data: u8) -> Result<Self, ParseError> {
        match data {
            0x02 => Ok(Self::NotSupported),
            _ => Self::parse_set(data),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::SupportedEnabled)
    }

    pub(crate) fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        xmit.push(*self as u8).map_err(|_| InsufficientBuffer)
    }
}

/// A transmit count and interval pair packed into one octet: count in the
/// low three bits, interval steps in the high five.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Retransmit {
    pub count: u8,
    pub interval_steps: u8,
}

impl Retransmit {
    pub fn parse(data: u8) -> Self {
        Self {
            count: data & 0b00000111,
            interval_steps: (data & 0b11111000) >> 3,
        }
    }

    pub fn as_u8(&self) -> u8 {
        (self.count & 0b111) | ((self.interval_steps & 0b11111) << 3)
    }

    pub(crate) fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        xmit.push(self.as_u8()).map_err(|_| InsufficientBuffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_index_padding() {
        assert_eq!(KeyIndex(0x0ABC), KeyIndex::parse_one(&[0xBC, 0x0A]).unwrap());
        assert_eq!(
            Err(ParseError::InvalidValue),
            KeyIndex::parse_one(&[0xBC, 0x1A])
        );
        assert_eq!(Err(ParseError::InvalidLength), KeyIndex::parse_one(&[0xBC]));
    }

    #[test]
    fn test_deserialized_index_is_masked() {
        let index: KeyIndex = serde_json::from_str("4660").unwrap();
        assert_eq!(0x0234, index.value());
        assert_eq!("564", serde_json::to_string(&index).unwrap());

        let net_key: NetKeyIndex = serde_json::from_str("65535").unwrap();
        assert_eq!(0x0FFF, net_key.value());
    }

    #[test]
    fn test_pair_packing() {
        let mut xmit: Vec<u8, 3> = Vec::new();
        KeyIndex::emit_two((&KeyIndex::new(0x123), &KeyIndex::new(0x456)), &mut xmit).unwrap();
        assert_eq!(&[0x23, 0x61, 0x45], &*xmit);
        assert_eq!(
            (KeyIndex(0x123), KeyIndex(0x456)),
            KeyIndex::parse_two(&xmit).unwrap()
        );
    }

    #[test]
    fn test_index_lists() {
        let indexes: Vec<AppKeyIndex, 4> = parse_indexes(&[]).unwrap();
        assert!(indexes.is_empty());

        let indexes: Vec<AppKeyIndex, 4> = parse_indexes(&[0x01, 0x20, 0x00, 0x03, 0x00]).unwrap();
        assert_eq!(3, indexes.len());
        let mut xmit: Vec<u8, 8> = Vec::new();
        KeyIndex::emit_list(&indexes, &mut xmit).unwrap();
        assert_eq!(&[0x01, 0x20, 0x00, 0x03, 0x00], &*xmit);

        let overflow: Result<Vec<AppKeyIndex, 1>, _> = parse_indexes(&[0x01, 0x20, 0x00]);
        assert_eq!(Err(ParseError::InsufficientBuffer), overflow);
    }

    #[test]
    fn test_feature_state() {
        assert_eq!(Err(ParseError::InvalidValue), FeatureState::parse_set(0x02));
        assert_eq!(
            FeatureState::NotSupported,
            FeatureState::parse_status(0x02).unwrap()
        );
        assert_eq!(Err(ParseError::InvalidValue), FeatureState::parse_status(0x03));
    }

    #[test]
    fn test_retransmit() {
        let retransmit = Retransmit::parse(0b01010_011);
        assert_eq!(3, retransmit.count);
        assert_eq!(10, retransmit.interval_steps);
        assert_eq!(0b01010_011, retransmit.as_u8());
    }
}

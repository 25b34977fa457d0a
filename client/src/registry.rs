//! Opcode to decoder dispatch.

use crate::error::MeshError;
use crate::model::foundation::configuration::{
    ConfigurationClient, ConfigurationMessage, ConfigurationServer,
};
use crate::model::generic::level::{GenericLevelClient, GenericLevelMessage, GenericLevelServer};
use crate::model::generic::onoff::{GenericOnOffClient, GenericOnOffMessage, GenericOnOffServer};
use crate::model::vendor::VendorMessage;
use crate::model::{Message, Model};
use crate::pdu::access::{AccessMessage, Opcode, SzMic};
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use heapless::{LinearMap, Vec};

/// Registered opcodes, vendor opcodes included.
pub const MAX_OPCODES: usize = 256;

/// Any message this crate can encode or decode.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeshMessage {
    Configuration(ConfigurationMessage),
    GenericOnOff(GenericOnOffMessage),
    GenericLevel(GenericLevelMessage),
    Vendor(VendorMessage),
}

impl Message for MeshMessage {
    fn opcode(&self) -> Opcode {
        match self {
            MeshMessage::Configuration(inner) => inner.opcode(),
            MeshMessage::GenericOnOff(inner) => inner.opcode(),
            MeshMessage::GenericLevel(inner) => inner.opcode(),
            MeshMessage::Vendor(inner) => inner.opcode(),
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            MeshMessage::Configuration(inner) => inner.emit_parameters(xmit),
            MeshMessage::GenericOnOff(inner) => inner.emit_parameters(xmit),
            MeshMessage::GenericLevel(inner) => inner.emit_parameters(xmit),
            MeshMessage::Vendor(inner) => inner.emit_parameters(xmit),
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            MeshMessage::Configuration(inner) => inner.response_opcodes(),
            MeshMessage::GenericOnOff(inner) => inner.response_opcodes(),
            MeshMessage::GenericLevel(inner) => inner.response_opcodes(),
            MeshMessage::Vendor(inner) => inner.response_opcodes(),
        }
    }

    fn szmic(&self) -> SzMic {
        match self {
            MeshMessage::Configuration(inner) => inner.szmic(),
            MeshMessage::GenericOnOff(inner) => inner.szmic(),
            MeshMessage::GenericLevel(inner) => inner.szmic(),
            MeshMessage::Vendor(inner) => inner.szmic(),
        }
    }
}

impl From<ConfigurationMessage> for MeshMessage {
    fn from(inner: ConfigurationMessage) -> Self {
        MeshMessage::Configuration(inner)
    }
}

impl From<GenericOnOffMessage> for MeshMessage {
    fn from(inner: GenericOnOffMessage) -> Self {
        MeshMessage::GenericOnOff(inner)
    }
}

impl From<GenericLevelMessage> for MeshMessage {
    fn from(inner: GenericLevelMessage) -> Self {
        MeshMessage::GenericLevel(inner)
    }
}

impl From<VendorMessage> for MeshMessage {
    fn from(inner: VendorMessage) -> Self {
        MeshMessage::Vendor(inner)
    }
}

pub type Decoder = fn(&Opcode, &[u8]) -> Result<Option<MeshMessage>, ParseError>;

fn decode_with<M>(opcode: &Opcode, parameters: &[u8]) -> Result<Option<MeshMessage>, ParseError>
where
    M: Model + Default,
    M::Message: Into<MeshMessage>,
{
    Ok(M::default().parse(opcode, parameters)?.map(Into::into))
}

/// Decoder for vendor opcodes whose parameters are kept raw.
pub fn decode_vendor(
    opcode: &Opcode,
    parameters: &[u8],
) -> Result<Option<MeshMessage>, ParseError> {
    Ok(Some(VendorMessage::parse(opcode, parameters)?.into()))
}

/// Decoders keyed by opcode, searched linearly.
pub struct Registry {
    decoders: LinearMap<Opcode, Decoder, MAX_OPCODES>,
}

impl Registry {
    /// A registry that knows no opcodes.
    pub fn empty() -> Self {
        Self {
            decoders: LinearMap::new(),
        }
    }

    /// Add or replace the decoder for `opcode`, returning the one replaced.
    pub fn register(
        &mut self,
        opcode: Opcode,
        decoder: Decoder,
    ) -> Result<Option<Decoder>, InsufficientBuffer> {
        self.decoders
            .insert(opcode, decoder)
            .map_err(|_| InsufficientBuffer)
    }

    /// Register every opcode `M` recognizes.
    pub fn register_model<M>(&mut self) -> Result<(), InsufficientBuffer>
    where
        M: Model + Default,
        M::Message: Into<MeshMessage>,
    {
        for opcode in M::OPCODES {
            self.register(*opcode, decode_with::<M>)?;
        }
        Ok(())
    }

    pub fn contains(&self, opcode: &Opcode) -> bool {
        self.decoders.contains_key(opcode)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn decode(&self, opcode: &Opcode, parameters: &[u8]) -> Result<MeshMessage, MeshError> {
        let decoder = self
            .decoders
            .get(opcode)
            .ok_or(MeshError::UnknownOpcode(*opcode))?;
        match decoder(opcode, parameters) {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(MeshError::UnknownOpcode(*opcode)),
            Err(err) => Err(MeshError::MalformedPdu(err)),
        }
    }

    pub fn decode_access(&self, message: &AccessMessage) -> Result<MeshMessage, MeshError> {
        self.decode(&message.opcode(), message.parameters())
    }

    /// Check that `parameters`, the encoding of `message`, decode back to
    /// `message`. Vendor messages and unregistered opcodes pass unchecked.
    pub fn verify(&self, message: &MeshMessage, parameters: &[u8]) -> Result<(), MeshError> {
        let opcode = message.opcode();
        if matches!(message, MeshMessage::Vendor(_)) || !self.contains(&opcode) {
            return Ok(());
        }
        if self.decode(&opcode, parameters)? == *message {
            Ok(())
        } else {
            Err(MeshError::MalformedPdu(ParseError::InvalidValue))
        }
    }
}

impl Default for Registry {
    /// Every configuration and generic opcode, in both directions.
    fn default() -> Self {
        let mut registry = Self::empty();
        // well below MAX_OPCODES, registration cannot run out of room
        let _ = registry.register_all();
        registry
    }
}

impl Registry {
    fn register_all(&mut self) -> Result<(), InsufficientBuffer> {
        self.register_model::<ConfigurationServer>()?;
        self.register_model::<ConfigurationClient>()?;
        self.register_model::<GenericOnOffServer>()?;
        self.register_model::<GenericOnOffClient>()?;
        self.register_model::<GenericLevelServer>()?;
        self.register_model::<GenericLevelClient>()?;
        Ok(())
    }
}

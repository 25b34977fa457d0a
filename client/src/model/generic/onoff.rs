use crate::model::generic::Transition;
use crate::model::{Message, Model, ModelIdentifier};
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

#[derive(Clone, Default)]
pub struct GenericOnOffServer;

#[derive(Clone, Default)]
pub struct GenericOnOffClient;

pub const GENERIC_ONOFF_SERVER: ModelIdentifier = ModelIdentifier::SIG(0x1000);
pub const GENERIC_ONOFF_CLIENT: ModelIdentifier = ModelIdentifier::SIG(0x1001);

opcode!( GENERIC_ON_OFF_GET 0x82, 0x01 );
opcode!( GENERIC_ON_OFF_SET 0x82, 0x02 );
opcode!( GENERIC_ON_OFF_SET_UNACKNOWLEDGE 0x82, 0x03 );
opcode!( GENERIC_ON_OFF_STATUS 0x82, 0x04 );

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GenericOnOffMessage {
    Get,
    Set(Set),
    SetUnacknowledged(Set),
    Status(Status),
}

impl Message for GenericOnOffMessage {
    fn opcode(&self) -> Opcode {
        match self {
            GenericOnOffMessage::Get => GENERIC_ON_OFF_GET,
            GenericOnOffMessage::Set(_) => GENERIC_ON_OFF_SET,
            GenericOnOffMessage::SetUnacknowledged(_) => GENERIC_ON_OFF_SET_UNACKNOWLEDGE,
            GenericOnOffMessage::Status(_) => GENERIC_ON_OFF_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            GenericOnOffMessage::Get => Ok(()),
            GenericOnOffMessage::Set(inner) => inner.emit_parameters(xmit),
            GenericOnOffMessage::SetUnacknowledged(inner) => inner.emit_parameters(xmit),
            GenericOnOffMessage::Status(inner) => inner.emit_parameters(xmit),
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            GenericOnOffMessage::Get | GenericOnOffMessage::Set(_) => &[GENERIC_ON_OFF_STATUS],
            _ => &[],
        }
    }
}

impl GenericOnOffMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            Ok(Self::Get)
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_set(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Set(Set::parse(parameters)?))
    }

    pub fn parse_set_unacknowledged(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::SetUnacknowledged(Set::parse(parameters)?))
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Status(Status::parse(parameters)?))
    }
}

impl Model for GenericOnOffServer {
    const IDENTIFIER: ModelIdentifier = GENERIC_ONOFF_SERVER;
    const OPCODES: &'static [Opcode] = &[
        GENERIC_ON_OFF_GET,
        GENERIC_ON_OFF_SET,
        GENERIC_ON_OFF_SET_UNACKNOWLEDGE,
    ];
    type Message = GenericOnOffMessage;

    fn parse(
        &self,
        opcode: &Opcode,
        parameters: &[u8],
    ) -> Result<Option<Self::Message>, ParseError> {
        match *opcode {
            GENERIC_ON_OFF_GET => Ok(Some(GenericOnOffMessage::parse_get(parameters)?)),
            GENERIC_ON_OFF_SET => Ok(Some(GenericOnOffMessage::parse_set(parameters)?)),
            GENERIC_ON_OFF_SET_UNACKNOWLEDGE => Ok(Some(
                GenericOnOffMessage::parse_set_unacknowledged(parameters)?,
            )),
            _ => {
                // not applicable to this role
                Ok(None)
            }
        }
    }
}

impl Model for GenericOnOffClient {
    const IDENTIFIER: ModelIdentifier = GENERIC_ONOFF_CLIENT;
    const OPCODES: &'static [Opcode] = &[GENERIC_ON_OFF_STATUS];
    type Message = GenericOnOffMessage;

    fn parse(
        &self,
        opcode: &Opcode,
        parameters: &[u8],
    ) -> Result<Option<Self::Message>, ParseError> {
        match *opcode {
            GENERIC_ON_OFF_STATUS => Ok(Some(GenericOnOffMessage::parse_status(parameters)?)),
            _ => {
                // not applicable to this role
                Ok(None)
            }
        }
    }
}

fn parse_on_off(value: u8) -> Result<bool, ParseError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ParseError::InvalidValue),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Set {
    pub on_off: bool,
    pub tid: u8,
    pub transition: Option<Transition>,
}

impl Set {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() < 2 {
            return Err(ParseError::InvalidLength);
        }
        Ok(Self {
            on_off: parse_on_off(parameters[0])?,
            tid: parameters[1],
            transition: Transition::parse_optional(&parameters[2..])?,
        })
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.push(self.on_off as u8).map_err(|_| InsufficientBuffer)?;
        xmit.push(self.tid).map_err(|_| InsufficientBuffer)?;
        Transition::emit_optional(&self.transition, xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub present_on_off: bool,
    /// Target state and remaining time, present while a transition runs.
    pub target: Option<(bool, u8)>,
}

impl Status {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        match parameters.len() {
            1 => Ok(Self {
                present_on_off: parse_on_off(parameters[0])?,
                target: None,
            }),
            3 => Ok(Self {
                present_on_off: parse_on_off(parameters[0])?,
                target: Some((parse_on_off(parameters[1])?, parameters[2])),
            }),
            _ => Err(ParseError::InvalidLength),
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.push(self.present_on_off as u8)
            .map_err(|_| InsufficientBuffer)?;
        if let Some((target_on_off, remaining_time)) = self.target {
            xmit.push(target_on_off as u8)
                .map_err(|_| InsufficientBuffer)?;
            xmit.push(remaining_time).map_err(|_| InsufficientBuffer)?;
        }
        Ok(())
    }
}

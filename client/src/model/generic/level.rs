use crate::model::generic::Transition;
use crate::model::{Message, Model, ModelIdentifier};
use crate::pdu::access::Opcode;
use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;

#[derive(Clone, Default)]
pub struct GenericLevelServer;

#[derive(Clone, Default)]
pub struct GenericLevelClient;

pub const GENERIC_LEVEL_SERVER: ModelIdentifier = ModelIdentifier::SIG(0x1002);
pub const GENERIC_LEVEL_CLIENT: ModelIdentifier = ModelIdentifier::SIG(0x1003);

opcode!( GENERIC_LEVEL_GET 0x82, 0x05 );
opcode!( GENERIC_LEVEL_SET 0x82, 0x06 );
opcode!( GENERIC_LEVEL_SET_UNACKNOWLEDGE 0x82, 0x07 );
opcode!( GENERIC_LEVEL_STATUS 0x82, 0x08 );
opcode!( GENERIC_DELTA_SET 0x82, 0x09 );
opcode!( GENERIC_DELTA_SET_UNACKNOWLEDGE 0x82, 0x0A );
opcode!( GENERIC_MOVE_SET 0x82, 0x0B );
opcode!( GENERIC_MOVE_SET_UNACKNOWLEDGE 0x82, 0x0C );

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GenericLevelMessage {
    Get,
    Set(LevelSet),
    SetUnacknowledged(LevelSet),
    Status(LevelStatus),
    DeltaSet(DeltaSet),
    DeltaSetUnacknowledged(DeltaSet),
    /// Move Set shares the Set layout; `level` is the delta per step.
    MoveSet(LevelSet),
    MoveSetUnacknowledged(LevelSet),
}

impl Message for GenericLevelMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get => GENERIC_LEVEL_GET,
            Self::Set(_) => GENERIC_LEVEL_SET,
            Self::SetUnacknowledged(_) => GENERIC_LEVEL_SET_UNACKNOWLEDGE,
            Self::Status(_) => GENERIC_LEVEL_STATUS,
            Self::DeltaSet(_) => GENERIC_DELTA_SET,
            Self::DeltaSetUnacknowledged(_) => GENERIC_DELTA_SET_UNACKNOWLEDGE,
            Self::MoveSet(_) => GENERIC_MOVE_SET,
            Self::MoveSetUnacknowledged(_) => GENERIC_MOVE_SET_UNACKNOWLEDGE,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            Self::Get => Ok(()),
            Self::Set(inner)
            | Self::SetUnacknowledged(inner)
            | Self::MoveSet(inner)
            | Self::MoveSetUnacknowledged(inner) => inner.emit_parameters(xmit),
            Self::Status(inner) => inner.emit_parameters(xmit),
            Self::DeltaSet(inner) | Self::DeltaSetUnacknowledged(inner) => {
                inner.emit_parameters(xmit)
            }
        }
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get | Self::Set(_) | Self::DeltaSet(_) | Self::MoveSet(_) => {
                &[GENERIC_LEVEL_STATUS]
            }
            _ => &[],
        }
    }
}

impl Model for GenericLevelServer {
    const IDENTIFIER: ModelIdentifier = GENERIC_LEVEL_SERVER;
    const OPCODES: &'static [Opcode] = &[
        GENERIC_LEVEL_GET,
        GENERIC_LEVEL_SET,
        GENERIC_LEVEL_SET_UNACKNOWLEDGE,
        GENERIC_DELTA_SET,
        GENERIC_DELTA_SET_UNACKNOWLEDGE,
        GENERIC_MOVE_SET,
        GENERIC_MOVE_SET_UNACKNOWLEDGE,
    ];
    type Message = GenericLevelMessage;

    fn parse(
        &self,
        opcode: &Opcode,
        parameters: &[u8],
    ) -> Result<Option<Self::Message>, ParseError> {
        let message = match *opcode {
            GENERIC_LEVEL_GET if parameters.is_empty() => GenericLevelMessage::Get,
            GENERIC_LEVEL_GET => return Err(ParseError::InvalidLength),
            GENERIC_LEVEL_SET => GenericLevelMessage::Set(LevelSet::parse(parameters)?),
            GENERIC_LEVEL_SET_UNACKNOWLEDGE => {
                GenericLevelMessage::SetUnacknowledged(LevelSet::parse(parameters)?)
            }
            GENERIC_DELTA_SET => GenericLevelMessage::DeltaSet(DeltaSet::parse(parameters)?),
            GENERIC_DELTA_SET_UNACKNOWLEDGE => {
                GenericLevelMessage::DeltaSetUnacknowledged(DeltaSet::parse(parameters)?)
            }
            GENERIC_MOVE_SET => GenericLevelMessage::MoveSet(LevelSet::parse(parameters)?),
            GENERIC_MOVE_SET_UNACKNOWLEDGE => {
                GenericLevelMessage::MoveSetUnacknowledged(LevelSet::parse(parameters)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(message))
    }
}

impl Model for GenericLevelClient {
    const IDENTIFIER: ModelIdentifier = GENERIC_LEVEL_CLIENT;
    const OPCODES: &'static [Opcode] = &[GENERIC_LEVEL_STATUS];
    type Message = GenericLevelMessage;

    fn parse(
        &self,
        opcode: &Opcode,
        parameters: &[u8],
    ) -> Result<Option<Self::Message>, ParseError> {
        match *opcode {
            GENERIC_LEVEL_STATUS => Ok(Some(GenericLevelMessage::Status(LevelStatus::parse(
                parameters,
            )?))),
            _ => Ok(None),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelSet {
    pub level: i16,
    pub tid: u8,
    pub transition: Option<Transition>,
}

impl LevelSet {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() < 3 {
            return Err(ParseError::InvalidLength);
        }
        Ok(Self {
            level: i16::from_le_bytes([parameters[0], parameters[1]]),
            tid: parameters[2],
            transition: Transition::parse_optional(&parameters[3..])?,
        })
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.extend_from_slice(&self.level.to_le_bytes())
            .map_err(|_| InsufficientBuffer)?;
        xmit.push(self.tid).map_err(|_| InsufficientBuffer)?;
        Transition::emit_optional(&self.transition, xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeltaSet {
    pub delta_level: i32,
    pub tid: u8,
    pub transition: Option<Transition>,
}

impl DeltaSet {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() < 5 {
            return Err(ParseError::InvalidLength);
        }
        Ok(Self {
            delta_level: i32::from_le_bytes([
                parameters[0],
                parameters[1],
                parameters[2],
                parameters[3],
            ]),
            tid: parameters[4],
            transition: Transition::parse_optional(&parameters[5..])?,
        })
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.extend_from_slice(&self.delta_level.to_le_bytes())
            .map_err(|_| InsufficientBuffer)?;
        xmit.push(self.tid).map_err(|_| InsufficientBuffer)?;
        Transition::emit_optional(&self.transition, xmit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelStatus {
    pub present_level: i16,
    /// Target level and remaining time, present while a transition runs.
    pub target: Option<(i16, u8)>,
}

impl LevelStatus {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        let present_level = match parameters.len() {
            2 | 5 => i16::from_le_bytes([parameters[0], parameters[1]]),
            _ => return Err(ParseError::InvalidLength),
        };
        let target = if parameters.len() == 5 {
            Some((
                i16::from_le_bytes([parameters[2], parameters[3]]),
                parameters[4],
            ))
        } else {
            None
        };
        Ok(Self {
            present_level,
            target,
        })
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.extend_from_slice(&self.present_level.to_le_bytes())
            .map_err(|_| InsufficientBuffer)?;
        if let Some((target_level, remaining_time)) = self.target {
            xmit.extend_from_slice(&target_level.to_le_bytes())
                .map_err(|_| InsufficientBuffer)?;
            xmit.push(remaining_time).map_err(|_| InsufficientBuffer)?;
        }
        Ok(())
    }
}

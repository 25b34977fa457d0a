use crate::pdu::ParseError;
use crate::InsufficientBuffer;
use heapless::Vec;

pub mod level;
pub mod onoff;

/// Optional Transition Time and Delay pair trailing generic set messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// Number of steps in the low six bits, step resolution in the high two.
    pub transition_time: u8,
    /// Message execution delay in 5 ms steps.
    pub delay: u8,
}

impl Transition {
    const UNKNOWN_STEPS: u8 = 0x3F;

    /// Fails when the step count is the reserved "unknown" value.
    pub fn new(transition_time: u8, delay: u8) -> Result<Self, ParseError> {
        if transition_time & Self::UNKNOWN_STEPS == Self::UNKNOWN_STEPS {
            Err(ParseError::InvalidValue)
        } else {
            Ok(Self {
                transition_time,
                delay,
            })
        }
    }

    /// Parse whatever follows the mandatory fields: nothing, or exactly the pair.
    pub(crate) fn parse_optional(parameters: &[u8]) -> Result<Option<Self>, ParseError> {
        match parameters.len() {
            0 => Ok(None),
            2 => Ok(Some(Self::new(parameters[0], parameters[1])?)),
            _ => Err(ParseError::InvalidLength),
        }
    }

    pub(crate) fn emit_optional<const N: usize>(
        transition: &Option<Self>,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        if let Some(transition) = transition {
            xmit.push(transition.transition_time)
                .map_err(|_| InsufficientBuffer)?;
            xmit.push(transition.delay).map_err(|_| InsufficientBuffer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_transition() {
        assert_eq!(Ok(None), Transition::parse_optional(&[]));
        assert_eq!(
            Ok(Some(Transition {
                transition_time: 0x41,
                delay: 0x05
            })),
            Transition::parse_optional(&[0x41, 0x05])
        );
        assert_eq!(
            Err(ParseError::InvalidLength),
            Transition::parse_optional(&[0x41])
        );
        assert_eq!(
            Err(ParseError::InvalidValue),
            Transition::parse_optional(&[0x7F, 0x00])
        );
    }

    #[test]
    fn test_unknown_steps_rejected_on_construction() {
        assert_eq!(Err(ParseError::InvalidValue), Transition::new(0x3F, 0x00));
        assert_eq!(Err(ParseError::InvalidValue), Transition::new(0xFF, 0x10));
        assert_eq!(
            Ok(Transition {
                transition_time: 0x3E,
                delay: 0x00
            }),
            Transition::new(0x3E, 0x00)
        );
    }
}

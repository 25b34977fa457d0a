//! Per-exchange state machine.
//!
//! Each request sent through the [`MessageHandler`] gets one
//! [`MessageState`], created in [`Phase::Created`] and moved to
//! [`Phase::InFlight`] once the transport accepts it. A state leaves the
//! handler in exactly one terminal phase and, apart from cancellation,
//! with exactly one callback.

use crate::address::LabelUuid;

mod deadline;
mod handler;
mod message_state;

pub use handler::{Event, Inbox, MessageCallbacks, MessageHandler};
pub use message_state::MessageState;

/// Lifecycle of an outstanding exchange.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Built, waiting for the transport to accept it.
    Created,
    InFlight,
    Acked,
    TimedOut,
    Failed,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::Created | Phase::InFlight)
    }
}

/// Where a message goes and where it claims to come from.
///
/// Addresses are raw until a [`MessageState`] validates them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Target {
    pub src: u16,
    pub dst: u16,
    /// Required when `dst` is a virtual address.
    pub label: Option<LabelUuid>,
    pub ttl: Option<u8>,
}

impl Target {
    pub fn new(src: u16, dst: u16) -> Self {
        Self {
            src,
            dst,
            label: None,
            ttl: None,
        }
    }

    /// Address the label's virtual address.
    pub fn virtual_destination(src: u16, label: LabelUuid) -> Self {
        Self {
            src,
            dst: label.virtual_address().value(),
            label: Some(label),
            ttl: None,
        }
    }

    pub fn with_label(mut self, label: LabelUuid) -> Self {
        self.label.replace(label);
        self
    }

    pub fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl.replace(ttl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(!Phase::Created.is_terminal());
        assert!(!Phase::InFlight.is_terminal());
        assert!(Phase::Acked.is_terminal());
        assert!(Phase::TimedOut.is_terminal());
        assert!(Phase::Failed.is_terminal());
        assert!(Phase::Cancelled.is_terminal());
    }

    #[test]
    fn test_virtual_destination() {
        let label = LabelUuid::new([0x33; 16]).unwrap();
        let target = Target::virtual_destination(0x0001, label).with_ttl(3);
        assert_eq!(label.virtual_address().value(), target.dst);
        assert!(target.dst & 0xC000 == 0x8000);
        assert_eq!(Some(3), target.ttl);
    }
}

use crate::address::{Address, UnicastAddress};
use crate::app::AccessKey;
use crate::error::MeshError;
use crate::model::Message;
use crate::pdu::access::{AccessMessage, AccessPayload, Opcode};
use crate::registry::{MeshMessage, Registry};
use crate::state::{Phase, Target};
use crate::transport::{MeshTransport, OutboundAccess, Submission, Token, TransportError};
use crate::util::{is_valid_destination, is_virtual_address};
use embassy_time::{Duration, Instant};
use heapless::Vec;

/// Reply opcodes a single request may be answered with.
pub const MAX_EXPECTED_OPCODES: usize = 4;

/// One outstanding exchange: the framed message, who it went to, and what
/// it is waiting for.
pub struct MessageState<M> {
    token: Token,
    src: UnicastAddress,
    dst: Address,
    opcode: Opcode,
    message: M,
    expected: Vec<Opcode, MAX_EXPECTED_OPCODES>,
    retries: u8,
    deadline: Option<Instant>,
    phase: Phase,
}

impl<M> MessageState<M> {
    /// Validate the target, encode `message` and let the transport frame it.
    ///
    /// A message whose encoding `registry` would not decode back to the same
    /// message is rejected as `MalformedPdu` before anything is framed.
    pub fn new<T, R>(
        token: Token,
        target: &Target,
        message: &R,
        key: &AccessKey,
        retries: u8,
        registry: &Registry,
        transport: &mut T,
    ) -> Result<Self, MeshError>
    where
        T: MeshTransport<Message = M>,
        R: Message + Clone + Into<MeshMessage>,
    {
        let src = UnicastAddress::new(target.src)
            .map_err(|_| MeshError::InvalidAddress(target.src as u32))?;
        let dst = Self::destination(target)?;

        let payload = AccessPayload::from_message(message)?;
        registry.verify(&message.clone().into(), &payload.parameters)?;
        let outbound = OutboundAccess {
            src,
            dst,
            label: target.label,
            ttl: target.ttl,
            key: *key,
            akf: key.akf(),
            aid: key.aid(),
            szmic: message.szmic(),
            payload,
        };
        let opcode = outbound.opcode();
        let framed = transport.create_mesh_message(&outbound)?;

        let expected = Vec::from_slice(message.response_opcodes())
            .map_err(|_| MeshError::InsufficientBuffer)?;

        Ok(Self {
            token,
            src,
            dst,
            opcode,
            message: framed,
            expected,
            retries,
            deadline: None,
            phase: Phase::Created,
        })
    }

    fn destination(target: &Target) -> Result<Address, MeshError> {
        let dst = target.dst as u32;
        if !is_valid_destination(dst) {
            return Err(MeshError::InvalidAddress(dst));
        }
        if is_virtual_address(dst) {
            let label = target.label.ok_or(MeshError::MissingLabel(target.dst))?;
            if label.virtual_address().value() != target.dst {
                return Err(MeshError::InvalidAddress(dst));
            }
            Ok(Address::LabelUuid(label))
        } else if target.label.is_some() {
            // labels only travel with virtual destinations
            Err(MeshError::InvalidAddress(dst))
        } else {
            Ok(Address::from(target.dst))
        }
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn src(&self) -> UnicastAddress {
        self.src
    }

    pub fn dst(&self) -> Address {
        self.dst
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn message(&self) -> &M {
        &self.message
    }

    pub fn expected(&self) -> &[Opcode] {
        &self.expected
    }

    /// Whether a reply is awaited at all.
    pub fn is_acknowledged(&self) -> bool {
        !self.expected.is_empty()
    }

    pub fn retries_remaining(&self) -> u8 {
        self.retries
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        if phase.is_terminal() {
            self.deadline.take();
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.phase == Phase::InFlight && matches!(self.deadline, Some(deadline) if deadline <= now)
    }

    /// True if `reply` answers this state: its opcode is expected and it
    /// comes from the destination, or the destination was a group.
    pub fn correlates(&self, reply: &AccessMessage) -> bool {
        self.phase == Phase::InFlight
            && self.expected.contains(&reply.opcode())
            && (self.dst.is_group()
                || self.dst.is_virtual()
                || self.dst.value() == reply.src.value())
    }

    /// Hand the framed message to the transport. The deadline is armed
    /// from acceptance.
    pub(crate) fn submit<T>(
        &mut self,
        transport: &mut T,
        timeout: Option<Duration>,
        now: Instant,
    ) -> Result<Submission, TransportError>
    where
        T: MeshTransport<Message = M>,
    {
        let submission = transport.submit(self.token, &self.message)?;
        if submission == Submission::Accepted {
            let timeout = timeout.unwrap_or_else(|| transport.ack_timeout(&self.message));
            self.phase = Phase::InFlight;
            self.deadline.replace(now + timeout);
        }
        Ok(submission)
    }

    /// Resubmit after a missed deadline, spending one retry whatever the
    /// transport answers.
    pub(crate) fn retransmit<T>(
        &mut self,
        transport: &mut T,
        timeout: Option<Duration>,
        now: Instant,
    ) -> Result<Submission, TransportError>
    where
        T: MeshTransport<Message = M>,
    {
        self.retries = self.retries.saturating_sub(1);
        let submission = self.submit(transport, timeout, now)?;
        if submission == Submission::Congested {
            // try again at the next deadline
            let timeout = timeout.unwrap_or_else(|| transport.ack_timeout(&self.message));
            self.deadline.replace(now + timeout);
        }
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::LabelUuid;
    use crate::app::DeviceKey;
    use crate::address::GroupAddress;
    use crate::model::foundation::configuration::model_subscription::{
        ModelSubscriptionMessage, ModelSubscriptionPayload, SubscriptionAddress,
    };
    use crate::model::foundation::configuration::ConfigurationMessage;
    use crate::model::generic::onoff::{
        GenericOnOffMessage, Set, GENERIC_ON_OFF_GET, GENERIC_ON_OFF_STATUS,
    };
    use crate::model::generic::Transition;
    use crate::model::vendor::VendorMessage;
    use crate::model::ModelIdentifier;
    use crate::pdu::access::SzMic;
    use crate::pdu::ParseError;

    struct Framer {
        framed: usize,
        accept: bool,
    }

    impl MeshTransport for Framer {
        type Message = OutboundAccess;

        fn create_mesh_message(
            &mut self,
            access: &OutboundAccess,
        ) -> Result<Self::Message, TransportError> {
            self.framed += 1;
            Ok(access.clone())
        }

        fn submit(&mut self, _: Token, _: &Self::Message) -> Result<Submission, TransportError> {
            if self.accept {
                Ok(Submission::Accepted)
            } else {
                Ok(Submission::Congested)
            }
        }

        fn ack_timeout(&self, _: &Self::Message) -> Duration {
            Duration::from_millis(100)
        }
    }

    fn key() -> AccessKey {
        AccessKey::Device(DeviceKey::new([0x11; 16]))
    }

    fn build(target: Target) -> Result<MessageState<OutboundAccess>, MeshError> {
        let mut framer = Framer {
            framed: 0,
            accept: true,
        };
        MessageState::new(
            Token::new(1),
            &target,
            &GenericOnOffMessage::Get,
            &key(),
            2,
            &Registry::default(),
            &mut framer,
        )
    }

    fn build_message<R>(message: &R, framer: &mut Framer) -> Result<MessageState<OutboundAccess>, MeshError>
    where
        R: Message + Clone + Into<MeshMessage>,
    {
        MessageState::new(
            Token::new(1),
            &Target::new(0x0001, 0x0005),
            message,
            &key(),
            2,
            &Registry::default(),
            framer,
        )
    }

    #[test]
    fn test_undecodable_requests_are_not_framed() {
        let mut framer = Framer {
            framed: 0,
            accept: true,
        };
        let all_nodes = ConfigurationMessage::ModelSubscription(ModelSubscriptionMessage::Add(
            ModelSubscriptionPayload {
                element_address: UnicastAddress::new(0x0005).unwrap(),
                subscription_address: SubscriptionAddress::Group(GroupAddress::AllNodes),
                model_identifier: ModelIdentifier::SIG(0x1000),
            },
        ));
        assert_eq!(
            Err(MeshError::MalformedPdu(ParseError::InvalidValue)),
            build_message(&all_nodes, &mut framer).map(|s| s.token())
        );

        let unknown_steps = GenericOnOffMessage::Set(Set {
            on_off: true,
            tid: 1,
            transition: Some(Transition {
                transition_time: 0x7F,
                delay: 0,
            }),
        });
        assert_eq!(
            Err(MeshError::MalformedPdu(ParseError::InvalidValue)),
            build_message(&unknown_steps, &mut framer).map(|s| s.token())
        );
        assert_eq!(0, framer.framed);

        let valid = GenericOnOffMessage::Set(Set {
            on_off: true,
            tid: 1,
            transition: Some(Transition::new(0x41, 0).unwrap()),
        });
        assert!(build_message(&valid, &mut framer).is_ok());
        assert_eq!(1, framer.framed);
    }

    #[test]
    fn test_vendor_szmic_reaches_transport() {
        let mut framer = Framer {
            framed: 0,
            accept: true,
        };
        let vendor = VendorMessage::new(Opcode::ThreeOctet(0xC1, 0x59, 0x00), &[0; 15])
            .unwrap()
            .with_szmic(SzMic::Bit64);
        let state = build_message(&vendor, &mut framer).unwrap();
        assert_eq!(SzMic::Bit64, state.message().szmic);
        assert_eq!(3, state.message().segments());

        let state = build_message(&GenericOnOffMessage::Get, &mut framer).unwrap();
        assert_eq!(SzMic::Bit32, state.message().szmic);
    }

    #[test]
    fn test_construction_frames_message() {
        let state = build(Target::new(0x0001, 0x0005).with_ttl(4)).unwrap();
        assert_eq!(Phase::Created, state.phase());
        assert_eq!(GENERIC_ON_OFF_GET, state.opcode());
        assert_eq!(&[GENERIC_ON_OFF_STATUS], state.expected());
        assert_eq!(Some(4), state.message().ttl);
        assert!(!state.message().akf);
        assert_eq!(None, state.deadline());
    }

    #[test]
    fn test_address_validation() {
        assert_eq!(
            Err(MeshError::InvalidAddress(0x8001)),
            build(Target::new(0x8001, 0x0005)).map(|s| s.token())
        );
        assert_eq!(
            Err(MeshError::InvalidAddress(0)),
            build(Target::new(0x0000, 0x0005)).map(|s| s.token())
        );
        assert_eq!(
            Err(MeshError::InvalidAddress(0)),
            build(Target::new(0x0001, 0x0000)).map(|s| s.token())
        );
        assert_eq!(
            Err(MeshError::MissingLabel(0x8001)),
            build(Target::new(0x0001, 0x8001)).map(|s| s.token())
        );
    }

    #[test]
    fn test_label_must_match_destination() {
        let label = LabelUuid::new([0x44; 16]).unwrap();
        let state = build(Target::virtual_destination(0x0001, label)).unwrap();
        assert_eq!(Address::LabelUuid(label), state.dst());
        assert_eq!(Some(label), state.message().label);

        let other = label.virtual_address().value() ^ 0x0001;
        assert_eq!(
            Err(MeshError::InvalidAddress(other as u32)),
            build(Target::new(0x0001, other).with_label(label)).map(|s| s.token())
        );
        assert_eq!(
            Err(MeshError::InvalidAddress(0x0005)),
            build(Target::new(0x0001, 0x0005).with_label(label)).map(|s| s.token())
        );
    }

    #[test]
    fn test_deadline_armed_on_acceptance() {
        let mut state = build(Target::new(0x0001, 0x0005)).unwrap();
        let mut framer = Framer {
            framed: 0,
            accept: false,
        };
        let now = Instant::from_millis(1_000);
        assert_eq!(Ok(Submission::Congested), state.submit(&mut framer, None, now));
        assert_eq!(Phase::Created, state.phase());
        assert_eq!(None, state.deadline());

        framer.accept = true;
        assert_eq!(Ok(Submission::Accepted), state.submit(&mut framer, None, now));
        assert_eq!(Phase::InFlight, state.phase());
        assert_eq!(Some(Instant::from_millis(1_100)), state.deadline());
        assert!(!state.is_expired(Instant::from_millis(1_099)));
        assert!(state.is_expired(Instant::from_millis(1_100)));
        assert_eq!(0, framer.framed);
    }

    #[test]
    fn test_correlation() {
        let mut state = build(Target::new(0x0001, 0x0005)).unwrap();
        let mut framer = Framer {
            framed: 0,
            accept: true,
        };
        let status = AccessMessage::parse(
            UnicastAddress::new(0x0005).unwrap(),
            Address::from(0x0001),
            &[0x82, 0x04, 0x01],
        )
        .unwrap();
        // not yet in flight
        assert!(!state.correlates(&status));
        state
            .submit(&mut framer, Some(Duration::from_millis(10)), Instant::from_millis(0))
            .unwrap();
        assert!(state.correlates(&status));

        let stranger = AccessMessage::parse(
            UnicastAddress::new(0x0006).unwrap(),
            Address::from(0x0001),
            &[0x82, 0x04, 0x01],
        )
        .unwrap();
        assert!(!state.correlates(&stranger));
    }
}

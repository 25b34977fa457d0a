mod common;

use btmesh_config_client::address::{GroupAddress, UnicastAddress};
use btmesh_config_client::config::HandlerConfig;
use btmesh_config_client::model::foundation::configuration::model_subscription::{
    ModelSubscriptionMessage, ModelSubscriptionPayload, SubscriptionAddress,
};
use btmesh_config_client::model::foundation::configuration::ConfigurationMessage;
use btmesh_config_client::model::generic::onoff::{
    GenericOnOffMessage, Set, GENERIC_ON_OFF_SET_UNACKNOWLEDGE,
};
use btmesh_config_client::model::ModelIdentifier;
use btmesh_config_client::pdu::ParseError;
use btmesh_config_client::registry::MeshMessage;
use btmesh_config_client::state::{MessageHandler, Phase, Target};
use btmesh_config_client::status::StatusMessage;
use btmesh_config_client::transport::{Token, TransportError};
use btmesh_config_client::MeshError;
use common::{device_key, reply, MockTransport, Recorder};
use embassy_time::Instant;

const ON_OFF_STATUS_ON: &[u8] = &[0x82, 0x04, 0x01];

fn handler(config: HandlerConfig) -> MessageHandler<MockTransport, Recorder> {
    MessageHandler::new(MockTransport::default(), Recorder::default(), config)
}

fn get(handler: &mut MessageHandler<MockTransport, Recorder>, dst: u16) -> Token {
    handler
        .send(
            Target::new(0x0001, dst),
            &GenericOnOffMessage::Get,
            &device_key(),
            Instant::from_millis(0),
        )
        .unwrap()
}

#[test]
fn oldest_matching_state_wins() {
    let mut handler = handler(HandlerConfig::default());
    let first = get(&mut handler, 0x0005);
    let second = get(&mut handler, 0x0005);
    assert_ne!(first, second);

    assert_eq!(
        Ok(Some(first)),
        handler.on_access_message(&reply(0x0005, ON_OFF_STATUS_ON))
    );
    assert_eq!(None, handler.phase(first));
    assert_eq!(Some(Phase::InFlight), handler.phase(second));
    assert_eq!(first, handler.callbacks().statuses[0].0);

    assert_eq!(
        Ok(Some(second)),
        handler.on_access_message(&reply(0x0005, ON_OFF_STATUS_ON))
    );
    assert!(handler.is_empty());
    assert_eq!(2, handler.callbacks().statuses.len());
}

#[test]
fn reply_from_other_node_is_unsolicited() {
    let mut handler = handler(HandlerConfig::default());
    let token = get(&mut handler, 0x0005);

    assert_eq!(
        Ok(None),
        handler.on_access_message(&reply(0x0006, ON_OFF_STATUS_ON))
    );
    assert_eq!(1, handler.callbacks().unsolicited.len());
    assert_eq!(0, handler.callbacks().callbacks());
    assert_eq!(Some(Phase::InFlight), handler.phase(token));
}

#[test]
fn group_destination_accepts_any_responder() {
    let mut handler = handler(HandlerConfig::default());
    let token = get(&mut handler, 0xC001);

    assert_eq!(
        Ok(Some(token)),
        handler.on_access_message(&reply(0x0042, ON_OFF_STATUS_ON))
    );
    match &handler.callbacks().statuses[0].1 {
        MeshMessage::GenericOnOff(GenericOnOffMessage::Status(status)) => {
            assert!(status.present_on_off);
            assert_eq!(None, status.target);
        }
        other => panic!("expected on/off status, got {:?}", other),
    }
}

#[test]
fn unknown_opcode_reaches_its_own_callback() {
    let mut handler = handler(HandlerConfig::default());
    let token = get(&mut handler, 0x0005);

    let result = handler.on_access_message(&reply(0x0005, &[0x82, 0x40, 0x00]));
    assert!(matches!(result, Err(MeshError::UnknownOpcode(_))));
    assert_eq!(1, handler.callbacks().unknown);
    assert_eq!(0, handler.callbacks().callbacks());
    assert_eq!(Some(Phase::InFlight), handler.phase(token));
}

#[test]
fn malformed_reply_fails_the_matching_state() {
    let mut handler = handler(HandlerConfig::default());
    let token = get(&mut handler, 0x0005);

    assert_eq!(
        Ok(Some(token)),
        handler.on_access_message(&reply(0x0005, &[0x82, 0x04, 0x01, 0x00]))
    );
    assert_eq!(
        vec![(token, MeshError::MalformedPdu(ParseError::InvalidLength))],
        handler.callbacks().errors
    );
    assert!(handler.callbacks().statuses.is_empty());
    assert_eq!(None, handler.phase(token));
}

#[test]
fn malformed_unsolicited_reply_is_dropped() {
    let mut handler = handler(HandlerConfig::default());
    assert_eq!(
        Err(MeshError::MalformedPdu(ParseError::InvalidValue)),
        handler.on_access_message(&reply(0x0005, &[0x82, 0x04, 0x07]))
    );
    assert_eq!(0, handler.callbacks().callbacks());
    assert!(handler.callbacks().unsolicited.is_empty());
}

#[test]
fn failing_status_is_still_a_status() {
    let mut handler = handler(HandlerConfig::default());
    let add = ConfigurationMessage::ModelSubscription(ModelSubscriptionMessage::Add(
        ModelSubscriptionPayload {
            element_address: UnicastAddress::new(0x0005).unwrap(),
            subscription_address: SubscriptionAddress::Group(GroupAddress::new(0xC002).unwrap()),
            model_identifier: ModelIdentifier::SIG(0x1000),
        },
    ));
    let token = handler
        .send(
            Target::new(0x0001, 0x0005),
            &add,
            &device_key(),
            Instant::from_millis(0),
        )
        .unwrap();

    assert_eq!(
        Ok(Some(token)),
        handler.on_access_message(&reply(
            0x0005,
            &[0x80, 0x1F, 0x05, 0x05, 0x00, 0x02, 0xC0, 0x00, 0x10]
        ))
    );
    match &handler.callbacks().statuses[0].1 {
        MeshMessage::Configuration(ConfigurationMessage::ModelSubscription(
            ModelSubscriptionMessage::Status(status),
        )) => {
            assert!(!status.is_successful());
            assert_eq!("Insufficient Resources", status.status_name());
        }
        other => panic!("expected subscription status, got {:?}", other),
    }
}

#[test]
fn congestion_queues_in_order() {
    let mut handler = handler(HandlerConfig {
        queue_depth: 2,
        ..Default::default()
    });
    handler.transport_mut().congested = true;
    let first = get(&mut handler, 0x0005);
    let second = get(&mut handler, 0x0006);
    assert_eq!(2, handler.pending());
    assert_eq!(Some(Phase::Created), handler.phase(first));

    assert_eq!(
        Err(MeshError::Congested),
        handler.send(
            Target::new(0x0001, 0x0007),
            &GenericOnOffMessage::Get,
            &device_key(),
            Instant::from_millis(0),
        )
    );
    assert_eq!(2, handler.len());

    handler.transport_mut().congested = false;
    handler.on_transport_ready(Instant::from_millis(10));
    assert_eq!(0, handler.pending());
    let order: Vec<Token> = handler
        .transport()
        .submitted
        .iter()
        .map(|(token, _)| *token)
        .collect();
    assert_eq!(vec![first, second], order);
    assert_eq!(Some(Phase::InFlight), handler.phase(second));
    // deadlines are armed from acceptance, not creation
    assert_eq!(Some(Instant::from_millis(210)), handler.next_deadline());
}

#[test]
fn new_sends_wait_behind_the_queue() {
    let mut handler = handler(HandlerConfig::default());
    handler.transport_mut().congested = true;
    let first = get(&mut handler, 0x0005);
    handler.transport_mut().congested = false;

    let second = get(&mut handler, 0x0005);
    assert_eq!(2, handler.pending());
    assert!(handler.transport().submitted.is_empty());

    handler.poll(Instant::from_millis(1));
    assert_eq!(first, handler.transport().submitted[0].0);
    assert_eq!(second, handler.transport().submitted[1].0);
}

#[test]
fn congested_retransmission_spends_a_retry() {
    let mut handler = handler(HandlerConfig::default());
    let token = get(&mut handler, 0x0005);
    handler.transport_mut().congested = true;

    handler.poll(Instant::from_millis(200));
    assert_eq!(1, handler.state(token).unwrap().retries_remaining());
    assert_eq!(Some(Instant::from_millis(400)), handler.next_deadline());
    handler.poll(Instant::from_millis(400));
    handler.poll(Instant::from_millis(600));
    assert_eq!(vec![token], handler.callbacks().timeouts);
    assert_eq!(1, handler.transport().submitted.len());
}

#[test]
fn transport_failures() {
    let mut handler = handler(HandlerConfig::default());
    let token = get(&mut handler, 0x0005);
    handler.on_transport_failure(token, TransportError::new("segment lost"));
    assert_eq!(
        vec![(
            token,
            MeshError::TransportFailed(TransportError::new("segment lost"))
        )],
        handler.callbacks().errors
    );
    assert!(handler.is_empty());

    // a second failure for a released token is ignored
    handler.on_transport_failure(token, TransportError::new("again"));
    assert_eq!(1, handler.callbacks().errors.len());

    handler.transport_mut().broken = true;
    let result = handler.send(
        Target::new(0x0001, 0x0005),
        &GenericOnOffMessage::Get,
        &device_key(),
        Instant::from_millis(0),
    );
    assert!(matches!(result, Err(MeshError::TransportFailed(_))));
    assert!(handler.is_empty());
}

#[test]
fn retransmission_failure_is_reported_once() {
    let mut handler = handler(HandlerConfig::default());
    let token = get(&mut handler, 0x0005);
    handler.transport_mut().broken = true;
    handler.poll(Instant::from_millis(200));
    handler.poll(Instant::from_millis(400));
    assert_eq!(1, handler.callbacks().errors.len());
    assert_eq!(token, handler.callbacks().errors[0].0);
    assert!(handler.callbacks().timeouts.is_empty());
}

#[test]
fn cancellation_is_silent() {
    let mut handler = handler(HandlerConfig::default());
    let first = get(&mut handler, 0x0005);
    get(&mut handler, 0x0005);
    let other = get(&mut handler, 0x0006);

    assert_eq!(2, handler.cancel_destination(0x0005));
    assert_eq!(1, handler.len());
    assert!(!handler.cancel(first));
    assert!(handler.cancel(other));
    assert!(!handler.cancel(other));

    handler.poll(Instant::from_millis(10_000));
    assert_eq!(0, handler.callbacks().callbacks());

    // a late reply for a cancelled exchange is just unsolicited
    assert_eq!(
        Ok(None),
        handler.on_access_message(&reply(0x0005, ON_OFF_STATUS_ON))
    );
}

#[test]
fn cancel_all_clears_queue() {
    let mut handler = handler(HandlerConfig::default());
    get(&mut handler, 0x0005);
    handler.transport_mut().congested = true;
    get(&mut handler, 0x0006);
    assert_eq!(2, handler.cancel_all());
    assert_eq!(0, handler.pending());
    assert_eq!(None, handler.next_deadline());
}

#[test]
fn unacknowledged_messages_are_released_on_acceptance() {
    let mut handler = handler(HandlerConfig::default());
    let set = GenericOnOffMessage::SetUnacknowledged(Set {
        on_off: true,
        tid: 7,
        transition: None,
    });
    let token = handler
        .send(
            Target::new(0x0001, 0xC001),
            &set,
            &device_key(),
            Instant::from_millis(0),
        )
        .unwrap();
    assert!(handler.is_empty());
    assert_eq!(None, handler.phase(token));
    assert_eq!(
        vec![(token, GENERIC_ON_OFF_SET_UNACKNOWLEDGE)],
        handler.transport().submitted
    );
}

#[test]
fn invalid_addresses_are_rejected_before_framing() {
    let mut handler = handler(HandlerConfig::default());
    for (src, dst, expected) in [
        (0x0000, 0x0005, 0x0000),
        (0x8000, 0x0005, 0x8000),
        (0xC000, 0x0005, 0xC000),
        (0x0001, 0x0000, 0x0000),
    ] {
        assert_eq!(
            Err(MeshError::InvalidAddress(expected)),
            handler.send(
                Target::new(src, dst),
                &GenericOnOffMessage::Get,
                &device_key(),
                Instant::from_millis(0),
            )
        );
    }
    assert_eq!(0, handler.transport().framed);
    assert!(handler.is_empty());
}

#[test]
fn element_address_may_equal_source() {
    let mut handler = handler(HandlerConfig::default());
    let token = get(&mut handler, 0x0001);
    assert_eq!(
        Ok(Some(token)),
        handler.on_access_message(&reply(0x0001, ON_OFF_STATUS_ON))
    );
}

#[test]
fn default_ttl_drives_timeout() {
    let mut handler = handler(HandlerConfig {
        default_ttl: Some(5),
        ..Default::default()
    });
    let token = get(&mut handler, 0x0005);
    assert_eq!(Some(Instant::from_millis(450)), handler.next_deadline());

    let explicit = handler
        .send(
            Target::new(0x0001, 0x0005).with_ttl(0),
            &GenericOnOffMessage::Get,
            &device_key(),
            Instant::from_millis(0),
        )
        .unwrap();
    assert_eq!(
        Some(Instant::from_millis(200)),
        handler.state(explicit).unwrap().deadline()
    );
    assert_eq!(
        Some(Instant::from_millis(450)),
        handler.state(token).unwrap().deadline()
    );
}

#[test]
fn configured_timeout_overrides_transport() {
    let mut handler = handler(HandlerConfig {
        ack_timeout_ms: Some(1_000),
        retry_count: 0,
        ..Default::default()
    });
    let token = get(&mut handler, 0x0005);
    handler.poll(Instant::from_millis(999));
    assert!(handler.callbacks().timeouts.is_empty());
    handler.poll(Instant::from_millis(1_000));
    assert_eq!(vec![token], handler.callbacks().timeouts);
}

#![allow(dead_code)]

use btmesh_config_client::address::{Address, UnicastAddress};
use btmesh_config_client::app::{AccessKey, DeviceKey};
use btmesh_config_client::pdu::access::{AccessMessage, Opcode};
use btmesh_config_client::registry::MeshMessage;
use btmesh_config_client::state::MessageCallbacks;
use btmesh_config_client::transport::{
    default_ack_timeout, MeshTransport, OutboundAccess, Submission, Token, TransportError,
};
use btmesh_config_client::MeshError;
use embassy_time::Duration;

/// Transport that frames by cloning and records every submission.
#[derive(Default)]
pub struct MockTransport {
    pub congested: bool,
    pub broken: bool,
    pub framed: usize,
    pub submitted: Vec<(Token, Opcode)>,
}

impl MeshTransport for MockTransport {
    type Message = OutboundAccess;

    fn create_mesh_message(
        &mut self,
        access: &OutboundAccess,
    ) -> Result<Self::Message, TransportError> {
        self.framed += 1;
        Ok(access.clone())
    }

    fn submit(
        &mut self,
        token: Token,
        message: &Self::Message,
    ) -> Result<Submission, TransportError> {
        if self.broken {
            Err(TransportError::new("bearer down"))
        } else if self.congested {
            Ok(Submission::Congested)
        } else {
            self.submitted.push((token, message.opcode()));
            Ok(Submission::Accepted)
        }
    }

    fn ack_timeout(&self, message: &Self::Message) -> Duration {
        default_ack_timeout(message.ttl.unwrap_or(0), message.segments())
    }
}

#[derive(Default)]
pub struct Recorder {
    pub statuses: Vec<(Token, MeshMessage)>,
    pub timeouts: Vec<Token>,
    pub errors: Vec<(Token, MeshError)>,
    pub unsolicited: Vec<MeshMessage>,
    pub unknown: usize,
}

impl Recorder {
    pub fn callbacks(&self) -> usize {
        self.statuses.len() + self.timeouts.len() + self.errors.len()
    }
}

impl MessageCallbacks for Recorder {
    fn on_status(&mut self, token: Token, status: MeshMessage) {
        self.statuses.push((token, status));
    }

    fn on_timeout(&mut self, token: Token) {
        self.timeouts.push(token);
    }

    fn on_error(&mut self, token: Token, error: MeshError) {
        self.errors.push((token, error));
    }

    fn on_unsolicited(&mut self, _message: &AccessMessage, decoded: MeshMessage) {
        self.unsolicited.push(decoded);
    }

    fn on_unknown_opcode(&mut self, _message: &AccessMessage) {
        self.unknown += 1;
    }
}

pub fn device_key() -> AccessKey {
    AccessKey::Device(DeviceKey::new([
        0x9d, 0x6d, 0xd0, 0xe9, 0x6e, 0xb2, 0x5d, 0xc1, 0x9a, 0x40, 0xed, 0x99, 0x14, 0xf8, 0xf0,
        0x3f,
    ]))
}

/// An access message from `src` to the client at 0x0001.
pub fn reply(src: u16, pdu: &[u8]) -> AccessMessage {
    AccessMessage::parse(
        UnicastAddress::new(src).unwrap(),
        Address::from(0x0001),
        pdu,
    )
    .unwrap()
}

#![macro_use]
//! Bluetooth Mesh configuration client.
//!
//! The crate covers the access layer of a mesh provisioner or configuration
//! client: it encodes Configuration and Generic model messages, decodes the
//! status messages nodes send back, and tracks every outstanding request
//! until its status arrives, its retry budget runs out, the transport fails,
//! or the owner cancels it.
//!
//! Network PDU assembly, encryption and the bearer are left to the host,
//! which plugs in through [`transport::MeshTransport`] and receives results
//! through [`state::MessageCallbacks`].
//!
//! # Example
//!
//! ```ignore
//! let mut handler = MessageHandler::new(transport, callbacks, HandlerConfig::default());
//!
//! let get = ModelSubscriptionMessage::Get(ModelSubscriptionGetMessage {
//!     element_address: UnicastAddress::new(0x0005)?,
//!     model_identifier: ModelIdentifier::SIG(0x1000),
//! });
//!
//! let token = handler.send(
//!     Target::new(0x0001, 0x0005),
//!     &ConfigurationMessage::ModelSubscription(get),
//!     &AccessKey::Device(device_key),
//!     Instant::now(),
//! )?;
//!
//! // replies and transport readiness arrive through the inbox
//! handler.settle(&inbox).await;
//! ```

pub(crate) mod fmt;

pub mod address;
pub mod app;
pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod pdu;
pub mod registry;
pub mod state;
pub mod status;
pub mod transport;
pub mod util;

pub use error::MeshError;
pub use pdu::InsufficientBuffer;

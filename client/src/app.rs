use crate::crypto;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApplicationKeyIdentifier(u8);

impl ApplicationKeyIdentifier {
    pub const NONE: ApplicationKeyIdentifier = ApplicationKeyIdentifier(0);
}

impl From<u8> for ApplicationKeyIdentifier {
    fn from(val: u8) -> Self {
        Self(val & 0b00111111)
    }
}

impl From<ApplicationKeyIdentifier> for u8 {
    fn from(val: ApplicationKeyIdentifier) -> Self {
        val.0
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApplicationKey {
    key: [u8; 16],
    aid: ApplicationKeyIdentifier,
}

impl ApplicationKey {
    pub fn new(key: [u8; 16]) -> Self {
        // k4 only fails on a bad key length, and the key is always 16 bytes.
        let aid = crypto::k4(&key).map(Into::into).unwrap_or_default();
        Self { key, aid }
    }

    pub fn aid(&self) -> ApplicationKeyIdentifier {
        self.aid
    }

    pub fn key(&self) -> &[u8; 16] {
        &self.key
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceKey([u8; 16]);

impl DeviceKey {
    pub fn new(key: [u8; 16]) -> Self {
        Self(key)
    }

    pub fn key(&self) -> &[u8; 16] {
        &self.0
    }
}

/// Key securing an access PDU at the upper transport layer.
///
/// Configuration messages travel under the target node's device key,
/// everything else under an application key.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessKey {
    Device(DeviceKey),
    Application(ApplicationKey),
}

impl AccessKey {
    pub fn akf(&self) -> bool {
        matches!(self, AccessKey::Application(_))
    }

    pub fn aid(&self) -> ApplicationKeyIdentifier {
        match self {
            AccessKey::Device(_) => ApplicationKeyIdentifier::NONE,
            AccessKey::Application(key) => key.aid(),
        }
    }

    pub fn key(&self) -> &[u8; 16] {
        match self {
            AccessKey::Device(key) => key.key(),
            AccessKey::Application(key) => key.key(),
        }
    }
}

impl From<ApplicationKey> for AccessKey {
    fn from(key: ApplicationKey) -> Self {
        AccessKey::Application(key)
    }
}

impl From<DeviceKey> for AccessKey {
    fn from(key: DeviceKey) -> Self {
        AccessKey::Device(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 16] = [
        0x32, 0x16, 0xd1, 0x50, 0x98, 0x84, 0xb5, 0x33, 0x24, 0x85, 0x41, 0x79, 0x2b, 0x87, 0x7f,
        0x98,
    ];

    #[test]
    fn test_application_key_framing() {
        let key: AccessKey = ApplicationKey::new(KEY).into();
        assert!(key.akf());
        assert_eq!(0x38, u8::from(key.aid()));
    }

    #[test]
    fn test_device_key_framing() {
        let key: AccessKey = DeviceKey::new(KEY).into();
        assert!(!key.akf());
        assert_eq!(ApplicationKeyIdentifier::NONE, key.aid());
        assert_eq!(&KEY, key.key());
    }
}

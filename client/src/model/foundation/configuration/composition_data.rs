use crate::model::{CompanyIdentifier, Message, ModelIdentifier};
use crate::pdu::access::{Opcode, MAX_ACCESS_PAYLOAD};
use crate::pdu::ParseError;
use crate::util::u16_le;
use crate::InsufficientBuffer;
use crate::opcode;
use heapless::Vec;
use serde::{Deserialize, Serialize};

opcode!( CONFIG_COMPOSITION_DATA_GET 0x80, 0x08 );
opcode!( CONFIG_COMPOSITION_DATA_STATUS 0x02 );

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompositionDataMessage {
    Get(u8),
    Status(CompositionStatus),
}

impl CompositionDataMessage {
    pub fn parse_get(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.len() == 1 {
            Ok(Self::Get(parameters[0]))
        } else {
            Err(ParseError::InvalidLength)
        }
    }

    pub fn parse_status(parameters: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::Status(CompositionStatus::parse(parameters)?))
    }
}

impl Message for CompositionDataMessage {
    fn opcode(&self) -> Opcode {
        match self {
            Self::Get(_) => CONFIG_COMPOSITION_DATA_GET,
            Self::Status(_) => CONFIG_COMPOSITION_DATA_STATUS,
        }
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        match self {
            CompositionDataMessage::Get(page) => {
                xmit.push(*page).map_err(|_| InsufficientBuffer)?
            }
            CompositionDataMessage::Status(inner) => inner.emit_parameters(xmit)?,
        }
        Ok(())
    }

    fn response_opcodes(&self) -> &[Opcode] {
        match self {
            Self::Get(_) => &[CONFIG_COMPOSITION_DATA_STATUS],
            Self::Status(_) => &[],
        }
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProductIdentifier(pub u16);

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VersionIdentifier(pub u16);

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Location(pub u16);

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Features {
    pub relay: bool,
    pub proxy: bool,
    pub friend: bool,
    pub low_power: bool,
    /// Bits 4..16, carried through untouched.
    pub reserved: u16,
}

impl Features {
    fn parse(data: u16) -> Self {
        Self {
            relay: data & 0b0001 != 0,
            proxy: data & 0b0010 != 0,
            friend: data & 0b0100 != 0,
            low_power: data & 0b1000 != 0,
            reserved: data & 0xFFF0,
        }
    }

    fn as_u16(&self) -> u16 {
        let mut val = self.reserved & 0xFFF0;
        if self.relay {
            val |= 0b0001;
        }
        if self.proxy {
            val |= 0b0010;
        }
        if self.friend {
            val |= 0b0100;
        }
        if self.low_power {
            val |= 0b1000;
        }
        val
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ElementDescriptor {
    pub loc: Location,
    models: std::vec::Vec<ModelIdentifier>,
}

impl ElementDescriptor {
    /// SIG models are kept ahead of vendor models, each group in the order
    /// given, matching their layout on the wire.
    pub fn new(loc: Location, models: impl IntoIterator<Item = ModelIdentifier>) -> Self {
        let (mut sig, vendor): (std::vec::Vec<_>, std::vec::Vec<_>) =
            models.into_iter().partition(ModelIdentifier::is_sig);
        sig.extend(vendor);
        Self { loc, models: sig }
    }

    pub fn models(&self) -> &[ModelIdentifier] {
        &self.models
    }

    pub fn sig_models(&self) -> impl Iterator<Item = &ModelIdentifier> {
        self.models.iter().filter(|e| e.is_sig())
    }

    pub fn vendor_models(&self) -> impl Iterator<Item = &ModelIdentifier> {
        self.models.iter().filter(|e| !e.is_sig())
    }
}

/// Composition data page 0.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Composition {
    pub cid: CompanyIdentifier,
    pub pid: ProductIdentifier,
    pub vid: VersionIdentifier,
    pub crpl: u16,
    pub features: Features,
    pub elements: std::vec::Vec<ElementDescriptor>,
}

impl Composition {
    fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < 10 {
            return Err(ParseError::InvalidLength);
        }
        let mut elements = std::vec::Vec::new();
        let mut cur = &data[10..];
        while !cur.is_empty() {
            if cur.len() < 4 {
                return Err(ParseError::InvalidLength);
            }
            let loc = Location(u16_le(cur[0], cur[1]));
            let num_sig = cur[2] as usize;
            let num_vendor = cur[3] as usize;
            let len = 4 + num_sig * 2 + num_vendor * 4;
            if cur.len() < len {
                return Err(ParseError::InvalidLength);
            }
            let mut models = std::vec::Vec::with_capacity(num_sig + num_vendor);
            for model in cur[4..4 + num_sig * 2].chunks(2) {
                models.push(ModelIdentifier::parse(model)?);
            }
            for model in cur[4 + num_sig * 2..len].chunks(4) {
                models.push(ModelIdentifier::parse(model)?);
            }
            elements.push(ElementDescriptor { loc, models });
            cur = &cur[len..];
        }
        Ok(Self {
            cid: CompanyIdentifier(u16_le(data[0], data[1])),
            pid: ProductIdentifier(u16_le(data[2], data[3])),
            vid: VersionIdentifier(u16_le(data[4], data[5])),
            crpl: u16_le(data[6], data[7]),
            features: Features::parse(u16_le(data[8], data[9])),
            elements,
        })
    }

    fn emit<const N: usize>(&self, xmit: &mut Vec<u8, N>) -> Result<(), InsufficientBuffer> {
        for val in [
            self.cid.0,
            self.pid.0,
            self.vid.0,
            self.crpl,
            self.features.as_u16(),
        ] {
            xmit.extend_from_slice(&val.to_le_bytes())
                .map_err(|_| InsufficientBuffer)?;
        }
        for element in self.elements.iter() {
            xmit.extend_from_slice(&element.loc.0.to_le_bytes())
                .map_err(|_| InsufficientBuffer)?;
            for count in [element.sig_models().count(), element.vendor_models().count()] {
                let count = u8::try_from(count).map_err(|_| InsufficientBuffer)?;
                xmit.push(count).map_err(|_| InsufficientBuffer)?;
            }
            for model in element.sig_models() {
                model.emit(xmit)?
            }
            for model in element.vendor_models() {
                model.emit(xmit)?
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompositionData {
    Page0(Composition),
    /// Pages this crate does not interpret.
    Other(Vec<u8, MAX_ACCESS_PAYLOAD>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompositionStatus {
    pub page: u8,
    pub data: CompositionData,
}

impl CompositionStatus {
    fn parse(parameters: &[u8]) -> Result<Self, ParseError> {
        if parameters.is_empty() {
            return Err(ParseError::InvalidLength);
        }
        let page = parameters[0];
        let data = if page == 0 {
            CompositionData::Page0(Composition::parse(&parameters[1..])?)
        } else {
            CompositionData::Other(
                Vec::from_slice(&parameters[1..]).map_err(|_| ParseError::InsufficientBuffer)?,
            )
        };
        Ok(Self { page, data })
    }

    fn emit_parameters<const N: usize>(
        &self,
        xmit: &mut Vec<u8, N>,
    ) -> Result<(), InsufficientBuffer> {
        xmit.push(self.page).map_err(|_| InsufficientBuffer)?;
        match &self.data {
            CompositionData::Page0(composition) => composition.emit(xmit),
            CompositionData::Other(data) => {
                xmit.extend_from_slice(data).map_err(|_| InsufficientBuffer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sample page 0 from the mesh profile: two elements, the second with a vendor model.
    const PAGE0: &[u8] = &[
        0x00, 0x0C, 0x00, 0x1A, 0x00, 0x01, 0x00, 0x08, 0x00, 0x03, 0x00, 0x00, 0x00, 0x04, 0x00,
        0x00, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x10, 0x00, 0x00, 0x01, 0x01, 0x00, 0x10, 0x3F,
        0x00, 0x2A, 0x00,
    ];

    #[test]
    fn test_page0() {
        let status = CompositionDataMessage::parse_status(PAGE0).unwrap();
        match &status {
            CompositionDataMessage::Status(CompositionStatus {
                page: 0,
                data: CompositionData::Page0(composition),
            }) => {
                assert_eq!(CompanyIdentifier(0x000C), composition.cid);
                assert!(composition.features.relay);
                assert!(composition.features.proxy);
                assert_eq!(2, composition.elements.len());
                assert_eq!(
                    vec![
                        ModelIdentifier::SIG(0x0000),
                        ModelIdentifier::SIG(0x0002),
                        ModelIdentifier::SIG(0x0003),
                        ModelIdentifier::SIG(0x1000),
                    ],
                    composition.elements[0].models
                );
                assert_eq!(
                    vec![
                        ModelIdentifier::SIG(0x1000),
                        ModelIdentifier::Vendor(CompanyIdentifier(0x003F), 0x002A),
                    ],
                    composition.elements[1].models
                );
            }
            _ => panic!("expected page 0"),
        }
        let mut xmit: Vec<u8, 64> = Vec::new();
        status.emit_parameters(&mut xmit).unwrap();
        assert_eq!(PAGE0, &*xmit);
    }

    fn page0(elements: std::vec::Vec<ElementDescriptor>) -> CompositionDataMessage {
        CompositionDataMessage::Status(CompositionStatus {
            page: 0,
            data: CompositionData::Page0(Composition {
                cid: CompanyIdentifier(0x000C),
                pid: ProductIdentifier(0x001A),
                vid: VersionIdentifier(0x0001),
                crpl: 8,
                features: Features::parse(0),
                elements,
            }),
        })
    }

    #[test]
    fn test_mixed_model_order_round_trips() {
        let element = ElementDescriptor::new(
            Location(0x0100),
            [
                ModelIdentifier::Vendor(CompanyIdentifier(0x003F), 0x002A),
                ModelIdentifier::SIG(0x1000),
                ModelIdentifier::SIG(0x0000),
            ],
        );
        assert_eq!(
            &[
                ModelIdentifier::SIG(0x1000),
                ModelIdentifier::SIG(0x0000),
                ModelIdentifier::Vendor(CompanyIdentifier(0x003F), 0x002A),
            ],
            element.models()
        );
        let status = page0(vec![element]);
        let mut xmit: Vec<u8, 64> = Vec::new();
        status.emit_parameters(&mut xmit).unwrap();
        assert_eq!(status, CompositionDataMessage::parse_status(&xmit).unwrap());
    }

    #[test]
    fn test_model_count_overflow() {
        let element = ElementDescriptor::new(Location(0), (0..256).map(ModelIdentifier::SIG));
        let mut xmit: Vec<u8, 1024> = Vec::new();
        assert_eq!(Err(InsufficientBuffer), page0(vec![element]).emit_parameters(&mut xmit));
    }

    #[test]
    fn test_truncated_element() {
        assert_eq!(
            Err(ParseError::InvalidLength),
            CompositionDataMessage::parse_status(&PAGE0[..PAGE0.len() - 1])
        );
    }

    #[test]
    fn test_other_page() {
        let status = CompositionDataMessage::parse_status(&[0x80, 0x01, 0x02]).unwrap();
        let mut xmit: Vec<u8, 8> = Vec::new();
        status.emit_parameters(&mut xmit).unwrap();
        assert_eq!(&[0x80, 0x01, 0x02], &*xmit);
    }
}

//! Byte and address helpers shared by the codec.
//!
//! Mesh addresses travel little-endian inside access parameters but are
//! always displayed as big-endian hex.

/// Combine two unsigned bytes, high byte first.
pub fn u16_be(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

/// Combine two unsigned bytes, low byte first.
pub fn u16_le(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}

/// Big-endian 32-bit decode.
///
/// Vendor model identifiers are stored as two little-endian halves; callers
/// reorder the parameter bytes as `[b1, b0, b3, b2]` before decoding.
pub fn bytes_to_u32(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// True for every value usable as a 16-bit mesh address other than the
/// unassigned address.
pub fn is_address_in_range(address: u32) -> bool {
    (0x0001..=0xFFFF).contains(&address)
}

pub fn is_unicast_address(address: u32) -> bool {
    (0x0001..=0x7FFF).contains(&address)
}

pub fn is_virtual_address(address: u32) -> bool {
    (0x8000..=0xBFFF).contains(&address)
}

/// Dynamic, reserved and fixed group addresses.
pub fn is_group_address(address: u32) -> bool {
    (0xC000..=0xFFFF).contains(&address)
}

/// Any address a message may be sent to. Virtual addresses additionally
/// need their label UUID.
pub fn is_valid_destination(address: u32) -> bool {
    is_address_in_range(address)
}

/// Stable upper-case hex rendering, optionally `0x` prefixed.
pub fn format_address(address: u16, prefixed: bool) -> String {
    if prefixed {
        format!("0x{:04X}", address)
    } else {
        format!("{:04X}", address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order() {
        assert_eq!(0x0102, u16_be(0x01, 0x02));
        assert_eq!(0x0201, u16_le(0x01, 0x02));
        assert_eq!(0x10010005, bytes_to_u32([0x10, 0x01, 0x00, 0x05]));
    }

    #[test]
    fn test_address_range() {
        assert!(!is_address_in_range(0));
        assert!(is_address_in_range(1));
        assert!(is_address_in_range(0xFFFF));
        assert!(!is_address_in_range(0x10000));
        assert!(!is_address_in_range(u32::MAX));
    }

    #[test]
    fn test_address_range_exhaustive() {
        for a in 0..=0x1_0010u32 {
            assert_eq!((1..=0xFFFF).contains(&a), is_address_in_range(a));
        }
    }

    #[test]
    fn test_classification_is_disjoint() {
        for a in 1..=0xFFFFu32 {
            let hits = [
                is_unicast_address(a),
                is_virtual_address(a),
                is_group_address(a),
            ]
            .iter()
            .filter(|e| **e)
            .count();
            assert_eq!(1, hits, "address {:04x}", a);
        }
    }

    #[test]
    fn test_valid_destination() {
        assert!(!is_valid_destination(0x0000));
        assert!(is_valid_destination(0x0005));
        assert!(is_valid_destination(0x8001));
        assert!(is_valid_destination(0xFFFF));
        assert!(!is_valid_destination(0x1_0000));
    }

    #[test]
    fn test_format_address() {
        assert_eq!("0x0001", format_address(0x0001, true));
        assert_eq!("C002", format_address(0xC002, false));
        assert_eq!("0xFFFF", format_address(0xFFFF, true));
    }
}

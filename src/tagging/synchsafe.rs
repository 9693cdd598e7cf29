//! Synchsafe integers: 28 usable bits spread over four bytes, the high bit of every
//! byte always zero so a size can never look like an MPEG sync marker.

use crate::tagging::error::TagWriteError;

pub const MAX_SYNCHSAFE: u32 = 0x0FFF_FFFF;

pub fn encode(value: u64) -> Result<[u8; 4], TagWriteError> {
    if value > MAX_SYNCHSAFE as u64 {
        return Err(TagWriteError::SynchsafeOverflow {
            value,
            max: MAX_SYNCHSAFE,
        });
    }
    let value = value as u32;
    Ok([
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ])
}

pub fn decode(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, byte| (acc << 7) | (*byte & 0x7F) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_boundaries() {
        assert_eq!(encode(0).unwrap(), [0, 0, 0, 0]);
        assert_eq!(encode(127).unwrap(), [0, 0, 0, 0x7F]);
        assert_eq!(encode(128).unwrap(), [0, 0, 1, 0]);
        assert_eq!(encode(16_383).unwrap(), [0, 0, 0x7F, 0x7F]);
        assert_eq!(encode(16_384).unwrap(), [0, 1, 0, 0]);
        assert_eq!(encode(2_097_151).unwrap(), [0, 0x7F, 0x7F, 0x7F]);
        assert_eq!(encode(2_097_152).unwrap(), [1, 0, 0, 0]);
        assert_eq!(encode(MAX_SYNCHSAFE as u64).unwrap(), [0x7F; 4]);
    }

    #[test]
    fn high_bit_is_never_set() {
        for value in [1u64, 255, 4096, 65_535, 1_000_000, 123_456_789] {
            let bytes = encode(value).unwrap();
            assert!(bytes.iter().all(|b| b & 0x80 == 0), "{value}: {bytes:?}");
            assert_eq!(decode(bytes) as u64, value);
        }
    }

    #[test]
    fn overflow_is_an_error() {
        assert_eq!(
            encode(MAX_SYNCHSAFE as u64 + 1),
            Err(TagWriteError::SynchsafeOverflow {
                value: MAX_SYNCHSAFE as u64 + 1,
                max: MAX_SYNCHSAFE
            })
        );
    }
}

//! Bitstream replay: net bias and preview level traces.

use super::bits::unpack_bits;
use super::{LEVEL_MAX, STEP};

/// Net level change produced by playing `bytes` from level 0.
///
/// A looped sample with a large bias drifts towards a rail on every pass.
pub fn decode_bias(bytes: &[u8]) -> i32 {
    unpack_bits(bytes)
        .into_iter()
        .fold(0, |level, bit| if bit { level + STEP } else { level - STEP })
}

/// Output level after every bit, as the hardware would produce it.
///
/// The DMC ignores steps that would leave its 0-127 counter, so unlike
/// [`decode_bias`] this trace is clamped.
pub fn decode_levels(bytes: &[u8], starting_level: i32) -> Vec<i32> {
    let mut level = starting_level.clamp(0, LEVEL_MAX);
    unpack_bits(bytes)
        .into_iter()
        .map(|bit| {
            let next = if bit { level + STEP } else { level - STEP };
            if (0..=LEVEL_MAX).contains(&next) {
                level = next;
            }
            level
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bias() {
        assert_eq!(decode_bias(&[0xFF]), 16);
        assert_eq!(decode_bias(&[0x00]), -16);
        assert_eq!(decode_bias(&[0xAA, 0x55]), 0);
        assert_eq!(decode_bias(&[]), 0);
    }

    #[test]
    fn test_decode_levels_clamps_at_rails() {
        let levels = decode_levels(&[0xFF], 124);
        assert_eq!(levels, vec![126, 126, 126, 126, 126, 126, 126, 126]);

        let levels = decode_levels(&[0x00], 3);
        assert_eq!(levels[0], 1);
        assert!(levels.iter().all(|&l| l == 1));
    }

    #[test]
    fn test_decode_levels_follows_bits() {
        let levels = decode_levels(&[0b0000_0011], 64);
        assert_eq!(levels, vec![66, 68, 66, 64, 62, 60, 58, 56]);
    }
}

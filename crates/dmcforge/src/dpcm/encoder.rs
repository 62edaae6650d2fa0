//! Greedy 1-bit delta encoder.

use thiserror::Error;

use super::bits::pack_bits;
use super::STEP;

/// Scale from the 0-255 PCM working range to the 0-127 quantizer range.
pub const PCM_TO_LEVEL: f64 = 0.5;

/// Error type for DPCM encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Nothing to encode; the starting level cannot be derived.
    #[error("Cannot encode an empty PCM buffer")]
    EmptyInput,
}

impl CodecError {
    /// Stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::EmptyInput => "DPCM_001",
        }
    }
}

/// Encode PCM samples (0-255 working range) into packed DMC bytes.
///
/// The quantizer starts at `starting_level`, or at the first sample's level
/// when `None`. It is deliberately unclamped: callers keep it in range by
/// scaling amplitude, not by clipping. The stream is padded to a byte
/// boundary with alternating bits so the padding does not drag the level away
/// from where the data left it.
pub fn encode(samples: &[f64], starting_level: Option<f64>) -> Result<Vec<u8>, CodecError> {
    let first = samples.first().ok_or(CodecError::EmptyInput)?;
    let mut level = starting_level.unwrap_or(first * PCM_TO_LEVEL);
    let step = STEP as f64;

    let mut bits = Vec::with_capacity(samples.len().next_multiple_of(8));
    for &sample in samples {
        let target = sample * PCM_TO_LEVEL;
        if target > level {
            bits.push(true);
            level += step;
        } else {
            bits.push(false);
            level -= step;
        }
    }

    while bits.len() % 8 != 0 {
        bits.push(bits.len() % 2 == 1);
    }

    Ok(pack_bits(&bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dpcm::{decode_bias, unpack_bits};

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(encode(&[], None), Err(CodecError::EmptyInput));
        assert_eq!(encode(&[], Some(0.0)), Err(CodecError::EmptyInput));
    }

    #[test]
    fn test_rising_ramp_emits_ones() {
        let ramp: Vec<f64> = (0..8).map(|i| 100.0 + i as f64 * 8.0).collect();
        assert_eq!(encode(&ramp, Some(0.0)).unwrap(), vec![0xFF]);
    }

    #[test]
    fn test_falling_ramp_emits_zeros() {
        let ramp: Vec<f64> = (0..16).map(|i| 200.0 - i as f64 * 8.0).collect();
        assert_eq!(encode(&ramp, Some(127.0)).unwrap(), vec![0x00, 0x00]);
    }

    #[test]
    fn test_padding_alternates() {
        // three real bits, five padding bits at positions 3..8 -> 1,0,1,0,1
        let bytes = encode(&[255.0, 255.0, 255.0], Some(0.0)).unwrap();
        let bits = unpack_bits(&bytes);
        assert_eq!(bits, vec![true, true, true, true, false, true, false, true]);
    }

    #[test]
    fn test_starting_level_defaults_to_first_sample() {
        // level starts at 64, target 64 is not above it, so the first bit is 0
        let bytes = encode(&[128.0; 8], None).unwrap();
        let bits = unpack_bits(&bytes);
        assert!(!bits[0]);
        assert!(bits[1]);
    }

    #[test]
    fn test_deterministic() {
        let pcm: Vec<f64> = (0..500).map(|i| 128.0 + 100.0 * (i as f64 * 0.1).sin()).collect();
        assert_eq!(encode(&pcm, Some(0.0)), encode(&pcm, Some(0.0)));
    }

    #[test]
    fn test_constant_input_has_bounded_bias() {
        for len in [1usize, 5, 8, 13, 136] {
            let pcm = vec![128.0; len];
            let bytes = encode(&pcm, None).unwrap();
            let padding = bytes.len() * 8 - len;
            let bias = decode_bias(&bytes);
            assert!(
                bias.abs() <= (STEP * (padding as i32 + 1)),
                "len {} bias {}",
                len,
                bias
            );
        }
    }
}

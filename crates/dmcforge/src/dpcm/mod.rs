//! DMC delta bitstream codec.
//!
//! Each bit moves the DMC output level by ±2. Bits are packed
//! least-significant-bit first, and a stream always fills whole bytes.

mod bits;
mod decoder;
mod encoder;

pub use bits::{pack_bits, unpack_bits};
pub use decoder::{decode_bias, decode_levels};
pub use encoder::{encode, CodecError, PCM_TO_LEVEL};

/// Level change for one delta bit.
pub const STEP: i32 = 2;

/// Highest value of the hardware's 7-bit output counter.
pub const LEVEL_MAX: i32 = 127;

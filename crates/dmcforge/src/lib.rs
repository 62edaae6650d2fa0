//! dmcforge - DPCM sample generation for the NES DMC channel
//!
//! This crate turns waveforms and recordings into 1-bit delta samples for the
//! DMC and packages them as FamiTracker (`.fti`) instruments.
//!
//! # Features
//!
//! - **Phase-locked loops**: picks a DMC sample length whose loop seam lands on
//!   a period boundary of the target pitch
//! - **DPCM codec**: greedy ±2 delta quantizer with alternating byte padding
//! - **Repitching**: nearest-neighbour resampling of one recording to many notes
//! - **Lower-range fill**: reuses samples at slower DMC rates instead of re-encoding
//! - **FTI writer/reader**: bit-exact DPCM-only instrument files
//!
//! # Determinism
//!
//! Every stage is a pure function of its inputs. Given the same notes and
//! configuration, the instrument bytes (and their BLAKE3 hash) are identical.
//!
//! # Example
//!
//! ```
//! use dmcforge::{generate_instrument, GeneratorConfig, HardwareTables, Waveform};
//! use dmcforge::note::parse_note_list;
//!
//! let notes = parse_note_list("c4-e4").unwrap();
//! let result = generate_instrument(
//!     &Waveform::Sawtooth,
//!     &notes,
//!     &GeneratorConfig::default(),
//!     &HardwareTables::default(),
//! )
//! .unwrap();
//!
//! let bytes = result.instrument.to_bytes().unwrap();
//! assert_eq!(&bytes[..6], b"FTI2.4");
//! ```
//!
//! # Module Structure
//!
//! - [`hardware`]: DMC rate and semitone equivalency tables
//! - [`tuning`]: loop-length analysis
//! - [`dpcm`]: bitstream encoder and decoders
//! - [`resample`]: nearest-neighbour repitching
//! - [`waveform`]: periodic generators
//! - [`note`]: note names and frequencies
//! - [`wav`]: WAV input and preview output
//! - [`fti`]: instrument file format
//! - [`assemble`]: generation pipelines

pub mod assemble;
pub mod config;
pub mod dpcm;
pub mod fti;
pub mod hardware;
pub mod note;
pub mod resample;
pub mod tuning;
pub mod wav;
pub mod waveform;

// Re-export main types
pub use assemble::{
    fill_lower_range, generate_instrument, repitch_instrument, split_recording, GenerateError,
    GenerateResult, NoteReport, SplitResult,
};
pub use config::{GeneratorConfig, RepitchConfig, SplitConfig};
pub use fti::{FtiError, FtiInstrument, NoteMapping, SampleRecord};
pub use hardware::{HardwareTables, Region};
pub use waveform::{Waveform, Wavetable};

/// Crate version for report identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

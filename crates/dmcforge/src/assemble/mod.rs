//! Instrument assembly: turns notes and audio into an [`FtiInstrument`].
//!
//! Three pipelines share the same builder and fill pass:
//! - [`generate_instrument`] - phase-locked loops synthesized from a waveform
//! - [`repitch_instrument`] - one recording resampled to every target note
//! - [`split_recording`] - one long recording cut into fixed-length chunks

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::dpcm::CodecError;
use crate::fti::{FtiError, FtiInstrument, NoteMapping, SampleRecord};
use crate::note::NoteError;
use crate::resample::ResampleError;
use crate::wav::WavError;

mod fill;
mod looped;
mod repitch;
mod split;

pub use fill::{fill_lower_range, FILL_NOTE_FLOOR};
pub use looped::{generate_instrument, generate_pcm};
pub use repitch::repitch_instrument;
pub use split::{split_recording, SplitResult};

/// Error type for instrument generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Invalid parameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Note(#[from] NoteError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Resample(#[from] ResampleError),

    #[error(transparent)]
    Wav(#[from] WavError),

    #[error(transparent)]
    Fti(#[from] FtiError),
}

impl GenerateError {
    /// Stable error code; wrapped errors keep their own.
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::InvalidParameter(_) => "GEN_001",
            GenerateError::Config(err) => err.code(),
            GenerateError::Note(err) => err.code(),
            GenerateError::Codec(err) => err.code(),
            GenerateError::Resample(_) => "GEN_002",
            GenerateError::Wav(err) => err.code(),
            GenerateError::Fti(err) => err.code(),
        }
    }

    /// Coarse grouping used in CLI error output.
    pub fn category(&self) -> &'static str {
        match self {
            GenerateError::Config(_) | GenerateError::InvalidParameter(_) => "config",
            GenerateError::Note(_) => "input",
            GenerateError::Wav(_) => "audio",
            GenerateError::Fti(_) => "instrument",
            GenerateError::Codec(_) | GenerateError::Resample(_) => "dpcm",
        }
    }
}

/// Per-note diagnostics from a generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteReport {
    /// MIDI note.
    pub note: u8,
    /// Sample name written to the catalog.
    pub name: String,
    /// 1-based catalog index.
    pub sample_index: u8,
    /// Encoded size in bytes.
    pub size: usize,
    /// Net level drift of the encoded sample.
    pub bias: i32,
    /// Loop seam error, for looped samples only.
    pub tuning_error: Option<f64>,
    pub repetitions: Option<u32>,
    pub effective_frequency: Option<f64>,
    /// Amplitude after the safe-amplitude cap, for looped samples only.
    pub amplitude: Option<f64>,
    /// No loop length met the error threshold.
    pub fallback: bool,
    /// Data was cut to the maximum sample length.
    pub truncated: bool,
}

/// Result of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub instrument: FtiInstrument,
    /// One report per encoded note, in note order.
    pub reports: Vec<NoteReport>,
    /// Mappings added by the lower-range fill pass.
    pub filled: usize,
}

/// Accumulates samples and mappings, assigning 1-based catalog indices in order.
#[derive(Debug, Default)]
pub struct InstrumentBuilder {
    instrument: FtiInstrument,
}

impl InstrumentBuilder {
    /// Start an empty instrument called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            instrument: FtiInstrument::new(name),
        }
    }

    /// Whether an explicit mapping already covers `note`.
    pub fn has_note(&self, note: u8) -> bool {
        self.instrument.mapping_for(note).is_some()
    }

    /// Add a sample and a mapping for it; returns the sample's catalog index.
    pub fn add(&mut self, note: u8, sample: SampleRecord, pitch: u8, looping: bool, delta: i8) -> u8 {
        let index = self.instrument.add_sample(sample);
        self.instrument.add_mapping(
            NoteMapping::new(note, index, pitch)
                .looping(looping)
                .with_delta(delta),
        );
        index
    }

    /// Mappings added so far, for the fill pass.
    pub fn mappings_mut(&mut self) -> &mut Vec<NoteMapping> {
        &mut self.instrument.mappings
    }

    /// Hand over the instrument once every mapping resolves to a sample.
    pub fn finish(self) -> FtiInstrument {
        self.instrument.assert_catalog();
        self.instrument
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assigns_indices_in_order() {
        let mut builder = InstrumentBuilder::new("b");
        assert_eq!(builder.add(60, SampleRecord::new("C4", vec![0]), 0xF, true, -1), 1);
        assert_eq!(builder.add(62, SampleRecord::new("D4", vec![0]), 0xF, true, -1), 2);
        assert!(builder.has_note(62));
        assert!(!builder.has_note(61));

        let instrument = builder.finish();
        assert_eq!(instrument.mappings[1].sample_index, 2);
        assert!(instrument.mappings.iter().all(|m| m.looping));
    }

    #[test]
    fn test_error_codes_delegate() {
        let err: GenerateError = CodecError::EmptyInput.into();
        assert_eq!(err.code(), "DPCM_001");
        assert_eq!(err.category(), "dpcm");

        let err: GenerateError = NoteError::InvalidName("x".to_string()).into();
        assert_eq!(err.code(), "NOTE_001");
    }
}

//! Melodic instruments resampled from a single recording.

use tracing::{info, warn};

use super::{fill_lower_range, GenerateError, GenerateResult, InstrumentBuilder, NoteReport};
use crate::config::RepitchConfig;
use crate::dpcm::{decode_bias, encode};
use crate::fti::{SampleRecord, MAX_MAPPED_NOTE, MIN_MAPPED_NOTE};
use crate::hardware::HardwareTables;
use crate::note::{midi_to_freq, note_name, note_name_to_midi, NoteError};
use crate::resample::resample_note;
use crate::wav::PcmClip;

/// Build a one-shot instrument by repitching `source` to every note in `notes`.
///
/// `source` is assumed to play `config.reference_note`. Each note gets its own
/// sample encoded for DMC rate `config.quality`; results longer than
/// `config.max_length_bytes` are truncated. Notes an instrument cannot
/// address are rejected before anything is encoded.
pub fn repitch_instrument(
    source: &PcmClip,
    notes: &[u8],
    config: &RepitchConfig,
    tables: &HardwareTables,
) -> Result<GenerateResult, GenerateError> {
    config.validate()?;
    if notes.is_empty() {
        return Err(GenerateError::InvalidParameter("no notes to generate".to_string()));
    }
    if let Some(&note) = notes
        .iter()
        .find(|&&n| !(MIN_MAPPED_NOTE..=MAX_MAPPED_NOTE).contains(&n))
    {
        return Err(NoteError::OutOfRange {
            name: note_name(note),
            note: note as i32,
            min: MIN_MAPPED_NOTE,
            max: MAX_MAPPED_NOTE,
        }
        .into());
    }
    if source.samples.is_empty() || source.sample_rate == 0 {
        return Err(GenerateError::InvalidParameter(
            "source recording is empty".to_string(),
        ));
    }

    let source_freq = midi_to_freq(note_name_to_midi(&config.reference_note)?);
    let target_rate = tables.rate(config.quality);
    let max_samples = config.max_length_bytes * 8;

    let mut builder = InstrumentBuilder::new(&config.name);
    let mut reports = Vec::with_capacity(notes.len());

    for &note in notes {
        let name = note_name(note);
        if builder.has_note(note) {
            warn!(note = %name, "note listed more than once, skipping");
            continue;
        }

        let mut pcm = resample_note(
            &source.samples,
            source.sample_rate as f64,
            target_rate,
            source_freq,
            midi_to_freq(note),
        )?;
        let truncated = pcm.len() > max_samples;
        if truncated {
            warn!(
                note = %name,
                samples = pcm.len(),
                max = max_samples,
                "resampled data exceeds the maximum sample length, truncating"
            );
            pcm.truncate(max_samples);
        }

        let data = encode(&pcm, Some(0.0))?;
        let bias = decode_bias(&data);
        let size = data.len();
        let sample_index = builder.add(
            note,
            SampleRecord::new(format!("{}{}", config.prefix, name), data),
            config.quality,
            false,
            config.delta_counter,
        );

        info!(note = %name, size, bias, truncated, "encoded repitched sample");

        reports.push(NoteReport {
            note,
            name,
            sample_index,
            size,
            bias,
            tuning_error: None,
            repetitions: None,
            effective_frequency: None,
            amplitude: None,
            fallback: false,
            truncated,
        });
    }

    let filled = if config.repitch_fill {
        fill_lower_range(builder.mappings_mut(), tables)
    } else {
        0
    };

    Ok(GenerateResult {
        instrument: builder.finish(),
        reports,
        filled,
    })
}

//! Phase-locked looping instruments synthesized from a waveform.

use tracing::{info, warn};

use super::{fill_lower_range, GenerateError, GenerateResult, InstrumentBuilder, NoteReport};
use crate::config::GeneratorConfig;
use crate::dpcm::{decode_bias, encode};
use crate::fti::SampleRecord;
use crate::hardware::HardwareTables;
use crate::note::{midi_to_freq, note_name, NoteError, GENERATOR_NOTE_MAX, GENERATOR_NOTE_MIN};
use crate::tuning::{analyze, safe_amplitude, TuningCandidate};
use crate::waveform::{self, Waveform, BIAS_OFFSET};

/// PCM for one loop of `candidate`, in the 0-255 working range.
///
/// The waveform runs at the candidate's effective frequency so the loop holds
/// a whole number of periods. Values are not clamped.
pub fn generate_pcm(
    candidate: &TuningCandidate,
    waveform: &Waveform,
    playback_rate: f64,
    amplitude: f64,
    target_bias: f64,
) -> Vec<f64> {
    (0..candidate.patch_samples as usize)
        .map(|i| {
            let sample = waveform::sample(waveform, i, candidate.effective_frequency, playback_rate);
            (sample * amplitude + BIAS_OFFSET * target_bias) * 256.0
        })
        .collect()
}

/// Build a looping instrument with one phase-locked sample per note.
///
/// Notes must lie in the generator range (C0-A7); repeated notes are skipped.
pub fn generate_instrument(
    waveform: &Waveform,
    notes: &[u8],
    config: &GeneratorConfig,
    tables: &HardwareTables,
) -> Result<GenerateResult, GenerateError> {
    config.validate()?;
    if notes.is_empty() {
        return Err(GenerateError::InvalidParameter("no notes to generate".to_string()));
    }
    if let Some(&note) = notes
        .iter()
        .find(|&&n| !(GENERATOR_NOTE_MIN..=GENERATOR_NOTE_MAX).contains(&n))
    {
        return Err(NoteError::OutOfRange {
            name: note_name(note),
            note: note as i32,
            min: GENERATOR_NOTE_MIN,
            max: GENERATOR_NOTE_MAX,
        }
        .into());
    }

    let mut builder = InstrumentBuilder::new(&config.name);
    let mut reports = Vec::with_capacity(notes.len());

    for &note in notes {
        let name = note_name(note);
        if builder.has_note(note) {
            warn!(note = %name, "note listed more than once, skipping");
            continue;
        }

        let table = analyze(midi_to_freq(note), config.playback_rate, config.max_length);
        let choice = table.select_smallest(config.error_threshold);
        let tuning = choice.candidate;
        if choice.fallback {
            warn!(
                note = %name,
                threshold = config.error_threshold,
                error = tuning.tuning_error,
                "no loop length met the error threshold, using the best one"
            );
        }

        let amplitude = if config.safe_amplitude {
            safe_amplitude(tuning.effective_frequency, config.playback_rate, config.safety_margin)
                * config.volume
        } else {
            config.volume
        };

        let pcm = generate_pcm(
            &tuning,
            waveform,
            config.playback_rate,
            amplitude,
            config.target_bias,
        );
        let data = encode(&pcm, Some(0.0))?;
        let bias = decode_bias(&data);
        let size = data.len();

        let sample_index = builder.add(
            note,
            SampleRecord::new(format!("{}{}", config.prefix, name), data),
            config.pitch,
            true,
            config.delta_counter,
        );

        info!(
            note = %name,
            error = tuning.tuning_error,
            size,
            reps = tuning.repetitions,
            freq = tuning.effective_frequency,
            amplitude,
            bias,
            "encoded looped sample"
        );

        reports.push(NoteReport {
            note,
            name,
            sample_index,
            size,
            bias,
            tuning_error: Some(tuning.tuning_error),
            repetitions: Some(tuning.repetitions),
            effective_frequency: Some(tuning.effective_frequency),
            amplitude: Some(amplitude),
            fallback: choice.fallback,
            truncated: false,
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

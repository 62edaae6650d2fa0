//! Phase-lock tuning analysis for looped DPCM patches.
//!
//! A DMC sample is always `16 * L + 1` bytes long, so a loop can only take a
//! handful of discrete lengths. For a target pitch we score every length by how
//! close its loop seam lands to a period boundary of the target waveform, then
//! pick the shortest length that is good enough.

use serde::Serialize;

use crate::hardware::MAX_LENGTH_INDEX;
use crate::note::{midi_to_freq, GENERATOR_NOTE_COUNT, GENERATOR_NOTE_MIN};

/// Default `safe_amplitude` headroom factor.
pub const DEFAULT_SAFETY_MARGIN: f64 = 0.9;

/// Quantizer levels covered by one full bottom-to-top-to-bottom excursion.
const FULL_EXCURSION_SAMPLES: f64 = 128.0;

/// Size in bytes of a DMC sample with the given length index.
pub fn patch_bytes(length_index: u32) -> u32 {
    16 * length_index + 1
}

/// Size in 1-bit samples of a DMC sample with the given length index.
pub fn patch_samples(length_index: u32) -> u32 {
    patch_bytes(length_index) * 8
}

/// Fraction of a target period by which the loop seam misses a period boundary.
///
/// Always in `[0, 1)`.
pub fn phase_offset(length_index: u32, target_frequency: f64, playback_rate: f64) -> f64 {
    let patch_duration = patch_samples(length_index) as f64 / playback_rate;
    let period = 1.0 / target_frequency;
    let offset = (patch_duration % period) * target_frequency;
    // fmod followed by the rescale can land a hair on 1.0
    if offset >= 1.0 {
        0.0
    } else {
        offset
    }
}

/// Distance of the loop seam from the nearest period boundary, in `[0, 0.5]`.
pub fn tuning_error(length_index: u32, target_frequency: f64, playback_rate: f64) -> f64 {
    0.5 - (phase_offset(length_index, target_frequency, playback_rate) - 0.5).abs()
}

/// Nearest whole number of target periods that fit in one loop.
pub fn repetitions(length_index: u32, target_frequency: f64, playback_rate: f64) -> u32 {
    let samples = patch_samples(length_index) as f64;
    (samples / (playback_rate / target_frequency)).round() as u32
}

/// Pitch actually produced when the loop holds `repetitions` periods.
pub fn effective_frequency(length_index: u32, repetitions: u32, playback_rate: f64) -> f64 {
    let samples = patch_samples(length_index) as f64;
    playback_rate / (samples / repetitions.max(1) as f64)
}

/// Largest amplitude the ±2 quantizer can track within one period of `target_frequency`.
///
/// High notes have too few samples per period for a full-scale swing; asking
/// for more turns every waveform into a triangle.
pub fn safe_amplitude(target_frequency: f64, playback_rate: f64, safety_margin: f64) -> f64 {
    let period_in_samples = playback_rate / target_frequency;
    (period_in_samples / FULL_EXCURSION_SAMPLES * safety_margin).min(1.0)
}

/// One scored loop length for a target pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TuningCandidate {
    /// DMC length register value `L`.
    pub length_index: u32,
    /// Loop size in bytes, `16L + 1`.
    pub patch_bytes: u32,
    /// Loop size in delta bits.
    pub patch_samples: u32,
    /// Fraction of a period the loop seam lands past a period boundary.
    pub phase_offset: f64,
    /// Seam distance from the nearest boundary, 0 (perfect) to 0.5.
    pub tuning_error: f64,
    /// Nearest whole number of periods that fit in one loop.
    pub repetitions: u32,
    /// Pitch the loop actually plays when it holds `repetitions` periods.
    pub effective_frequency: f64,
}

impl TuningCandidate {
    /// Score length index `L` for `target_frequency` at `playback_rate`.
    pub fn new(length_index: u32, target_frequency: f64, playback_rate: f64) -> Self {
        let repetitions = repetitions(length_index, target_frequency, playback_rate);
        Self {
            length_index,
            patch_bytes: patch_bytes(length_index),
            patch_samples: patch_samples(length_index),
            phase_offset: phase_offset(length_index, target_frequency, playback_rate),
            tuning_error: tuning_error(length_index, target_frequency, playback_rate),
            repetitions,
            effective_frequency: effective_frequency(length_index, repetitions, playback_rate),
        }
    }
}

/// Result of picking a candidate from a [`TuningTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningChoice {
    /// The selected loop length.
    pub candidate: TuningCandidate,
    /// No candidate met the threshold and the best-scoring one was used instead.
    pub fallback: bool,
}

/// All candidate loop lengths for one target pitch, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningTable {
    /// Pitch being tuned for, in Hz.
    pub target_frequency: f64,
    /// DMC rate the loops play at, in Hz.
    pub playback_rate: f64,
    /// Candidates sorted by tuning error, then by length.
    pub candidates: Vec<TuningCandidate>,
}

impl TuningTable {
    /// The best-scoring candidate.
    pub fn best(&self) -> &TuningCandidate {
        &self.candidates[0]
    }

    /// Pick the shortest candidate with `tuning_error < threshold`.
    ///
    /// Falls back to the best-scoring candidate when nothing qualifies, so a
    /// negative threshold still yields a usable entry.
    pub fn select_smallest(&self, threshold: f64) -> TuningChoice {
        let acceptable = self
            .candidates
            .iter()
            .filter(|c| c.tuning_error < threshold)
            .min_by_key(|c| c.length_index);

        match acceptable {
            Some(candidate) => TuningChoice {
                candidate: *candidate,
                fallback: false,
            },
            None => TuningChoice {
                candidate: *self.best(),
                fallback: true,
            },
        }
    }
}

/// Score every length index in `1..max_length` for `target_frequency`.
///
/// `max_length` is clamped so the table covers at least length index 1 and at
/// most the hardware limit of 255.
pub fn analyze(target_frequency: f64, playback_rate: f64, max_length: u32) -> TuningTable {
    let upper = max_length.clamp(2, MAX_LENGTH_INDEX + 1);
    let mut candidates: Vec<TuningCandidate> = (1..upper)
        .map(|length_index| TuningCandidate::new(length_index, target_frequency, playback_rate))
        .collect();

    candidates.sort_by(|a, b| {
        a.tuning_error
            .total_cmp(&b.tuning_error)
            .then(a.length_index.cmp(&b.length_index))
    });

    TuningTable {
        target_frequency,
        playback_rate,
        candidates,
    }
}

/// Tuning tables for every note the generator supports, indexed from C0.
pub fn note_tables(playback_rate: f64, max_length: u32) -> Vec<TuningTable> {
    (0..GENERATOR_NOTE_COUNT)
        .map(|offset| {
            let midi = GENERATOR_NOTE_MIN + offset as u8;
            analyze(midi_to_freq(midi), playback_rate, max_length)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 33144.0;

    #[test]
    fn test_patch_sizes() {
        assert_eq!(patch_bytes(1), 17);
        assert_eq!(patch_samples(1), 136);
        for l in 1..=255 {
            assert_eq!(patch_bytes(l), 16 * l + 1);
            assert_eq!(patch_samples(l), patch_bytes(l) * 8);
        }
    }

    #[test]
    fn test_a4_golden_values() {
        let candidate = TuningCandidate::new(1, 440.0, RATE);
        assert!((candidate.phase_offset - 0.805_454_984_310_885_8).abs() < 1e-12);
        assert!((candidate.tuning_error - 0.194_545_015_689_114_2).abs() < 1e-12);
        assert_eq!(candidate.repetitions, 2);
        assert!((candidate.effective_frequency - RATE / 68.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_bounds() {
        for midi in [12u8, 36, 60, 69, 93, 105] {
            let table = analyze(midi_to_freq(midi), RATE, 255);
            for c in &table.candidates {
                assert!((0.0..1.0).contains(&c.phase_offset), "{:?}", c);
                assert!((0.0..=0.5).contains(&c.tuning_error), "{:?}", c);
            }
        }
    }

    #[test]
    fn test_table_is_sorted() {
        let table = analyze(261.63, RATE, 255);
        assert_eq!(table.candidates.len(), 254);
        for pair in table.candidates.windows(2) {
            let ordered = pair[0].tuning_error < pair[1].tuning_error
                || (pair[0].tuning_error == pair[1].tuning_error
                    && pair[0].length_index < pair[1].length_index);
            assert!(ordered);
        }
    }

    #[test]
    fn test_tiny_max_length_still_has_a_candidate() {
        let table = analyze(440.0, RATE, 0);
        assert_eq!(table.candidates.len(), 1);
        assert_eq!(table.best().length_index, 1);
    }

    #[test]
    fn test_select_smallest_negative_threshold() {
        let table = analyze(440.0, RATE, 255);
        let choice = table.select_smallest(-1.0);
        assert!(choice.fallback);
        assert_eq!(choice.candidate, *table.best());
        assert!(table.candidates.contains(&choice.candidate));
    }

    #[test]
    fn test_select_smallest_prefers_short_samples() {
        let table = analyze(440.0, RATE, 255);
        let choice = table.select_smallest(0.5 + f64::EPSILON);
        assert!(!choice.fallback);
        assert_eq!(choice.candidate.length_index, 1);

        let strict = table.select_smallest(0.01);
        assert!(strict.candidate.tuning_error < 0.01 || strict.fallback);
        for c in table.candidates.iter().filter(|c| c.tuning_error < 0.01) {
            assert!(strict.candidate.length_index <= c.length_index);
        }
    }

    #[test]
    fn test_safe_amplitude() {
        // 33144 / 100 = 331 samples per period, well above a full excursion
        assert_eq!(safe_amplitude(100.0, RATE, DEFAULT_SAFETY_MARGIN), 1.0);

        let high = safe_amplitude(2000.0, RATE, DEFAULT_SAFETY_MARGIN);
        let expected = (RATE / 2000.0) / 128.0 * 0.9;
        assert!((high - expected).abs() < 1e-12);
        assert!(high > 0.0 && high < 1.0);
    }

    #[test]
    fn test_note_tables_cover_generator_range() {
        let tables = note_tables(RATE, 32);
        assert_eq!(tables.len(), 94);
        assert!((tables[57].target_frequency - 440.0).abs() < 1e-9);
    }
}

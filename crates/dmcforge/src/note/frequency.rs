//! MIDI note to frequency conversion.

/// Convert a MIDI note number to frequency in Hz.
///
/// Uses equal temperament with A4 (MIDI 69) at 440 Hz.
///
/// # Examples
/// ```
/// use dmcforge::note::midi_to_freq;
///
/// let a4 = midi_to_freq(69);
/// assert!((a4 - 440.0).abs() < 0.001);
/// ```
pub fn midi_to_freq(midi_note: u8) -> f64 {
    440.0 * 2.0_f64.powf((midi_note as f64 - 69.0) / 12.0)
}

//! Note names, note lists and pitch conversion.
//!
//! Notes are MIDI numbers throughout the crate (`C4` = 60, `A4` = 69).

mod conversion;
mod frequency;

#[cfg(test)]
mod tests;

pub use conversion::{note_name, note_name_to_midi, parse_note_list, NoteError};
pub use frequency::midi_to_freq;

/// Lowest note the waveform generator has a tuning table for (C0).
pub const GENERATOR_NOTE_MIN: u8 = 12;

/// Number of notes covered by the generator's tuning tables (C0 through A7).
pub const GENERATOR_NOTE_COUNT: usize = 94;

/// Highest note the waveform generator has a tuning table for (A7).
pub const GENERATOR_NOTE_MAX: u8 = GENERATOR_NOTE_MIN + GENERATOR_NOTE_COUNT as u8 - 1;

//! Note name parsing and note-list expressions.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Note names used when rendering, sharps spelled with `s` so they survive in file names.
const NOTE_NAMES: [&str; 12] = [
    "C", "Cs", "D", "Ds", "E", "F", "Fs", "G", "Gs", "A", "As", "B",
];

/// Error type for note parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    /// Note name did not match `<letter>[#|s|b]<octave>`.
    #[error("Invalid note name: {0:?}")]
    InvalidName(String),

    /// Note list entry was empty or had more than one `-`.
    #[error("Malformed note list entry: {0:?}")]
    MalformedList(String),

    /// Note is outside the range an operation supports.
    #[error("Note {name} ({note}) is outside the supported range {min}..={max}")]
    OutOfRange {
        name: String,
        /// MIDI number, which may fall outside 0..=127.
        note: i32,
        min: u8,
        max: u8,
    },
}

impl NoteError {
    /// Stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            NoteError::InvalidName(_) => "NOTE_001",
            NoteError::MalformedList(_) => "NOTE_002",
            NoteError::OutOfRange { .. } => "NOTE_003",
        }
    }
}

fn note_regex() -> &'static Regex {
    static NOTE_RE: OnceLock<Regex> = OnceLock::new();
    NOTE_RE.get_or_init(|| {
        Regex::new(r"^([A-Ga-g])([#SsBb]?)(\d+)$").expect("note name pattern is valid")
    })
}

/// Convert a note name (e.g. `C4`, `gs2`, `A#3`, `Bb5`) to a MIDI note number.
///
/// # Examples
/// ```
/// use dmcforge::note::note_name_to_midi;
///
/// assert_eq!(note_name_to_midi("C4").unwrap(), 60);
/// assert_eq!(note_name_to_midi("as3").unwrap(), 58);
/// assert_eq!(note_name_to_midi("Bb3").unwrap(), 58);
/// ```
pub fn note_name_to_midi(name: &str) -> Result<u8, NoteError> {
    let trimmed = name.trim();
    let caps = note_regex()
        .captures(trimmed)
        .ok_or_else(|| NoteError::InvalidName(name.to_string()))?;

    let semitone = match caps[1].to_ascii_uppercase().as_str() {
        "C" => 0,
        "D" => 2,
        "E" => 4,
        "F" => 5,
        "G" => 7,
        "A" => 9,
        "B" => 11,
        _ => return Err(NoteError::InvalidName(name.to_string())),
    };
    let modifier = match caps[2].to_ascii_lowercase().as_str() {
        "#" | "s" => 1,
        "b" => -1,
        _ => 0,
    };
    let octave: i32 = caps[3]
        .parse()
        .map_err(|_| NoteError::InvalidName(name.to_string()))?;

    let midi = octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|n| n.checked_add(semitone + modifier))
        .ok_or_else(|| NoteError::InvalidName(name.to_string()))?;
    if !(0..=127).contains(&midi) {
        return Err(NoteError::OutOfRange {
            name: trimmed.to_string(),
            note: midi,
            min: 0,
            max: 127,
        });
    }
    Ok(midi as u8)
}

/// Render a MIDI note number as a name such as `Cs4`.
pub fn note_name(midi_note: u8) -> String {
    let octave = midi_note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[midi_note as usize % 12], octave)
}

/// Parse a comma-separated list of notes and inclusive ranges, e.g. `gs2,f3-a3`.
pub fn parse_note_list(list: &str) -> Result<Vec<u8>, NoteError> {
    let mut notes = Vec::new();
    for entry in list.split(',') {
        let entry = entry.trim();
        let bounds: Vec<&str> = entry.split('-').collect();
        match bounds.as_slice() {
            [single] if !single.is_empty() => notes.push(note_name_to_midi(single)?),
            [low, high] => {
                let low = note_name_to_midi(low)?;
                let high = note_name_to_midi(high)?;
                if low > high {
                    return Err(NoteError::MalformedList(entry.to_string()));
                }
                notes.extend(low..=high);
            }
            _ => return Err(NoteError::MalformedList(entry.to_string())),
        }
    }
    Ok(notes)
}

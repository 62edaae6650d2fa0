//! Lower-range fill: reuse existing samples at slower DMC rates.

use tracing::debug;

use crate::fti::NoteMapping;
use crate::hardware::HardwareTables;
use crate::note::note_name;

/// Synthesized mappings must land strictly above this MIDI note.
pub const FILL_NOTE_FLOOR: i32 = 12;

/// Extend the instrument downwards without re-encoding.
///
/// Each explicit mapping is walked down one DMC rate at a time; every step
/// lowers the pitch by that step's semitone equivalency. A lowered note that
/// has no mapping yet gets one pointing at the same sample. Sources are taken
/// in ascending note order, so the closest higher sample claims a free slot.
/// Returns the number of mappings added.
pub fn fill_lower_range(mappings: &mut Vec<NoteMapping>, tables: &HardwareTables) -> usize {
    let mut sources: Vec<NoteMapping> = Vec::new();
    for mapping in mappings.iter() {
        if !sources.iter().any(|s| s.note == mapping.note) {
            sources.push(*mapping);
        }
    }
    sources.sort_by_key(|m| m.note);

    let mut added = 0;
    for source in sources {
        let mut target = source.note as i32;
        for pitch in (1..=source.pitch.min(0xF)).rev() {
            let lower_pitch = pitch - 1;
            target -= tables.equivalency(lower_pitch) as i32;
            if target <= FILL_NOTE_FLOOR {
                break;
            }
            if mappings.iter().any(|m| m.note as i32 == target) {
                continue;
            }

            debug!(
                source = %note_name(source.note),
                target = %note_name(target as u8),
                pitch = lower_pitch,
                cents_error = tables.cents_error(lower_pitch),
                "mapping lower note to existing sample"
            );
            mappings.push(NoteMapping {
                note: target as u8,
                pitch: lower_pitch,
                ..source
            });
            added += 1;
        }
    }
    added
}

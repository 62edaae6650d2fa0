//! Tests for note parsing and frequency conversion.

use super::*;

#[test]
fn test_note_name_to_midi() {
    assert_eq!(note_name_to_midi("C4").unwrap(), 60);
    assert_eq!(note_name_to_midi("c4").unwrap(), 60);
    assert_eq!(note_name_to_midi("A4").unwrap(), 69);
    assert_eq!(note_name_to_midi("Cs4").unwrap(), 61);
    assert_eq!(note_name_to_midi("C#4").unwrap(), 61);
    assert_eq!(note_name_to_midi("Db4").unwrap(), 61);
    assert_eq!(note_name_to_midi("C0").unwrap(), 12);
    assert_eq!(note_name_to_midi(" B3 ").unwrap(), 59);
}

#[test]
fn test_invalid_note_names() {
    assert!(matches!(note_name_to_midi("H4"), Err(NoteError::InvalidName(_))));
    assert!(matches!(note_name_to_midi("C"), Err(NoteError::InvalidName(_))));
    assert!(matches!(note_name_to_midi("C4x"), Err(NoteError::InvalidName(_))));
    assert!(matches!(
        note_name_to_midi("G10"),
        Err(NoteError::OutOfRange { note: 139, .. })
    ));
}

#[test]
fn test_note_name_roundtrip() {
    for midi in 12..=127u8 {
        let name = note_name(midi);
        assert_eq!(note_name_to_midi(&name).unwrap(), midi, "{}", name);
    }
    assert_eq!(note_name(61), "Cs4");
}

#[test]
fn test_parse_note_list() {
    assert_eq!(parse_note_list("gs2,f3-a3").unwrap(), vec![44, 53, 54, 55, 56, 57]);
    assert_eq!(parse_note_list("c4").unwrap(), vec![60]);
    assert_eq!(parse_note_list("as2-d3").unwrap(), vec![46, 47, 48, 49, 50]);
}

#[test]
fn test_malformed_note_lists() {
    assert!(matches!(parse_note_list(""), Err(NoteError::MalformedList(_))));
    assert!(matches!(parse_note_list("c4,,d4"), Err(NoteError::MalformedList(_))));
    assert!(matches!(parse_note_list("c4-d4-e4"), Err(NoteError::MalformedList(_))));
    assert!(matches!(parse_note_list("d4-c4"), Err(NoteError::MalformedList(_))));
    assert!(matches!(parse_note_list("c4-q4"), Err(NoteError::InvalidName(_))));
}

#[test]
fn test_midi_to_freq() {
    assert!((midi_to_freq(69) - 440.0).abs() < 0.001);
    assert!((midi_to_freq(60) - 261.626).abs() < 0.01);
    assert!((midi_to_freq(12) - 16.35).abs() < 0.01);
}

#[test]
fn test_huge_octave_is_an_error() {
    assert!(matches!(
        note_name_to_midi("C999999999"),
        Err(NoteError::InvalidName(_))
    ));
    assert!(note_name_to_midi("B2147483646").is_err());
    assert!(note_name_to_midi("C99999999999").is_err());
    assert!(parse_note_list("c4-C999999999").is_err());
}

#[test]
fn test_generator_range() {
    assert_eq!(GENERATOR_NOTE_MAX, 105);
    assert_eq!(note_name(GENERATOR_NOTE_MAX), "A7");
}

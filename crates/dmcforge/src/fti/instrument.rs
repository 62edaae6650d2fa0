//! FTI instrument structures.

use serde::Serialize;

/// Magic bytes at the start of every FTI file.
pub const FTI_MAGIC: &[u8; 3] = b"FTI";

/// Version string written after the magic.
pub const FTI_VERSION: &[u8; 3] = b"2.4";

/// Instrument type byte for 2A03 (APU) instruments.
pub const INST_2A03: i8 = 1;

/// Names must be strictly shorter than this.
pub const MAX_NAME_LEN: usize = 128;

/// FTI note indices are MIDI numbers minus this offset.
pub const NOTE_OFFSET: i32 = 12;

/// Lowest MIDI note a mapping can address (FTI note index 1).
pub const MIN_MAPPED_NOTE: u8 = 13;

/// Highest MIDI note a mapping can address (FTI note index 126).
pub const MAX_MAPPED_NOTE: u8 = 138;

/// Set on the pitch byte when the sample loops.
pub const PITCH_LOOP_FLAG: u8 = 0x80;

/// Delta counter value meaning "leave the counter alone".
pub const DELTA_UNSET: i8 = -1;

/// One named DMC sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleRecord {
    /// ASCII name shown in the tracker, under 128 bytes.
    pub name: String,
    /// Packed DMC bytes.
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl SampleRecord {
    /// Create a sample from a name and encoded bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Assignment of a sample and DMC pitch to one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteMapping {
    /// MIDI note number.
    pub note: u8,
    /// 1-based position of the sample in the instrument's sample list.
    pub sample_index: u8,
    /// DMC pitch index, 0x0-0xF.
    pub pitch: u8,
    /// Restart the sample when it ends.
    pub looping: bool,
    /// Initial delta counter, or [`DELTA_UNSET`].
    pub delta_counter: i8,
}

impl NoteMapping {
    /// A non-looping mapping that leaves the delta counter alone.
    pub fn new(note: u8, sample_index: u8, pitch: u8) -> Self {
        Self {
            note,
            sample_index,
            pitch,
            looping: false,
            delta_counter: DELTA_UNSET,
        }
    }

    /// Set whether the sample loops.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the initial delta counter, or [`DELTA_UNSET`] to leave it alone.
    pub fn with_delta(mut self, delta_counter: i8) -> Self {
        self.delta_counter = delta_counter;
        self
    }

    /// Pitch byte as stored: low nibble is the rate, bit 7 the loop flag.
    pub fn pitch_byte(&self) -> u8 {
        let mut byte = self.pitch & 0xF;
        if self.looping {
            byte |= PITCH_LOOP_FLAG;
        }
        byte
    }

    /// FTI note index for this mapping's MIDI note.
    pub fn note_index(&self) -> i32 {
        self.note as i32 - NOTE_OFFSET
    }
}

/// A DPCM instrument: name, mapping table and samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FtiInstrument {
    /// Instrument name shown in the tracker, under 128 bytes.
    pub name: String,
    /// Note mappings in file order.
    pub mappings: Vec<NoteMapping>,
    /// Sample catalog; mapping index `n` refers to `samples[n - 1]`.
    pub samples: Vec<SampleRecord>,
}

impl FtiInstrument {
    /// Create an empty instrument.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Append a sample and return its 1-based catalog index.
    pub fn add_sample(&mut self, sample: SampleRecord) -> u8 {
        self.samples.push(sample);
        self.samples.len() as u8
    }

    /// Append a note mapping.
    pub fn add_mapping(&mut self, mapping: NoteMapping) {
        self.mappings.push(mapping);
    }

    /// The mapping for a MIDI note, if any.
    pub fn mapping_for(&self, note: u8) -> Option<&NoteMapping> {
        self.mappings.iter().find(|m| m.note == note)
    }

    /// The sample a mapping refers to.
    pub fn sample_for(&self, mapping: &NoteMapping) -> Option<&SampleRecord> {
        (mapping.sample_index as usize)
            .checked_sub(1)
            .and_then(|i| self.samples.get(i))
    }

    /// Total DMC data size in bytes.
    pub fn sample_bytes(&self) -> usize {
        self.samples.iter().map(|s| s.data.len()).sum()
    }

    /// Panic if any mapping refers to a sample that does not exist.
    pub fn assert_catalog(&self) {
        for mapping in &self.mappings {
            assert!(
                self.sample_for(mapping).is_some(),
                "mapping for note {} refers to sample {} but the instrument has {} samples",
                mapping.note,
                mapping.sample_index,
                self.samples.len()
            );
        }
    }
}

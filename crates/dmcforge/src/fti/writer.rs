//! FTI writer.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use super::instrument::{FtiInstrument, NoteMapping, FTI_MAGIC, FTI_VERSION, INST_2A03, MAX_NAME_LEN};
use super::FtiError;
use crate::hardware::MAX_SAMPLE_BYTES;

fn check_name(name: &str) -> Result<(), FtiError> {
    if !name.is_ascii() {
        return Err(FtiError::NonAsciiName(name.to_string()));
    }
    if name.len() >= MAX_NAME_LEN {
        return Err(FtiError::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: MAX_NAME_LEN - 1,
        });
    }
    Ok(())
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), FtiError> {
    writer.write_i32::<LittleEndian>(value.len() as i32)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn write_mapping<W: Write>(writer: &mut W, mapping: &NoteMapping) -> Result<(), FtiError> {
    let index = mapping.note_index();
    if !(1..127).contains(&index) {
        return Err(FtiError::NoteOutOfRange {
            note: mapping.note,
            index,
        });
    }
    if mapping.delta_counter < -1 {
        return Err(FtiError::InvalidDelta(mapping.delta_counter));
    }

    writer.write_i8(index as i8)?;
    writer.write_i8(mapping.sample_index as i8)?;
    writer.write_u8(mapping.pitch_byte())?;
    writer.write_i8(mapping.delta_counter)?;
    Ok(())
}

impl FtiInstrument {
    /// Write the instrument in FTI 2.4 layout.
    ///
    /// Names of 128 bytes or more and notes outside the addressable range are
    /// rejected. A mapping that refers to a missing sample is a bug in the
    /// caller and panics.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FtiError> {
        self.assert_catalog();
        check_name(&self.name)?;
        if self.samples.len() > i8::MAX as usize {
            return Err(FtiError::Unsupported(format!(
                "{} samples (max {})",
                self.samples.len(),
                i8::MAX
            )));
        }

        // Header
        writer.write_all(FTI_MAGIC)?;
        writer.write_all(FTI_VERSION)?;
        writer.write_i8(INST_2A03)?;
        write_string(writer, &self.name)?;

        // No sequences for DPCM-only instruments
        writer.write_i8(0)?;

        // Note mappings
        writer.write_i32::<LittleEndian>(self.mappings.len() as i32)?;
        for mapping in &self.mappings {
            write_mapping(writer, mapping)?;
        }

        // Sample catalog, 0-based positions
        writer.write_i32::<LittleEndian>(self.samples.len() as i32)?;
        for (position, sample) in self.samples.iter().enumerate() {
            check_name(&sample.name)?;
            if sample.data.len() > MAX_SAMPLE_BYTES {
                return Err(FtiError::SampleTooLarge {
                    name: sample.name.clone(),
                    len: sample.data.len(),
                });
            }
            let len = sample.data.len() as i32;

            writer.write_i32::<LittleEndian>(position as i32)?;
            write_string(writer, &sample.name)?;
            writer.write_i32::<LittleEndian>(len)?;
            writer.write_all(&sample.data)?;
        }

        Ok(())
    }

    /// Write the instrument to a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FtiError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    /// Compute the BLAKE3 hash of the instrument bytes.
    pub fn compute_hash(&self) -> Result<String, FtiError> {
        let bytes = self.to_bytes()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fti::SampleRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minimal_layout() {
        let mut instrument = FtiInstrument::new("AB");
        let index = instrument.add_sample(SampleRecord::new("S", vec![0xAA, 0x55]));
        instrument.add_mapping(NoteMapping::new(60, index, 0xF).looping(true));

        let bytes = instrument.to_bytes().unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(b"FTI2.4");
        expected.push(0x01);
        expected.extend_from_slice(&2i32.to_le_bytes());
        expected.extend_from_slice(b"AB");
        expected.push(0x00);
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&[48, 1, 0x8F, 0xFF]);
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(b"S");
        expected.extend_from_slice(&2i32.to_le_bytes());
        expected.extend_from_slice(&[0xAA, 0x55]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_name_length_limit() {
        let ok = FtiInstrument::new(&"x".repeat(127));
        assert!(ok.to_bytes().is_ok());

        let too_long = FtiInstrument::new(&"x".repeat(128));
        let err = too_long.to_bytes().unwrap_err();
        assert!(matches!(err, FtiError::NameTooLong { len: 128, .. }));
    }

    #[test]
    fn test_sample_name_length_limit() {
        let mut instrument = FtiInstrument::new("ok");
        instrument.add_sample(SampleRecord::new("y".repeat(200), vec![0]));
        assert_eq!(instrument.to_bytes().unwrap_err().code(), "FTI_001");
    }

    #[test]
    fn test_note_range() {
        for (note, ok) in [(12u8, false), (13, true), (127, true)] {
            let mut instrument = FtiInstrument::new("n");
            let index = instrument.add_sample(SampleRecord::new("s", vec![0]));
            instrument.add_mapping(NoteMapping::new(note, index, 0));
            assert_eq!(instrument.to_bytes().is_ok(), ok, "note {}", note);
        }
    }

    #[test]
    fn test_sample_size_limit() {
        let mut instrument = FtiInstrument::new("long");
        instrument.add_sample(SampleRecord::new("max", vec![0; MAX_SAMPLE_BYTES]));
        assert!(instrument.to_bytes().is_ok());

        instrument.add_sample(SampleRecord::new("over", vec![0; MAX_SAMPLE_BYTES + 1]));
        assert!(matches!(
            instrument.to_bytes(),
            Err(FtiError::SampleTooLarge { len: 4082, .. })
        ));
    }

    #[test]
    fn test_invalid_delta() {
        let mut instrument = FtiInstrument::new("d");
        let index = instrument.add_sample(SampleRecord::new("s", vec![0]));
        instrument.add_mapping(NoteMapping::new(60, index, 0).with_delta(-5));
        assert!(matches!(
            instrument.to_bytes(),
            Err(FtiError::InvalidDelta(-5))
        ));
    }

    #[test]
    fn test_hash_determinism() {
        let build = || {
            let mut instrument = FtiInstrument::new("hash");
            let index = instrument.add_sample(SampleRecord::new("s", vec![1, 2, 3]));
            instrument.add_mapping(NoteMapping::new(50, index, 7));
            instrument
        };
        assert_eq!(build().compute_hash().unwrap(), build().compute_hash().unwrap());
    }
}

//! FTI reader for the DPCM-only subset written by this crate.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::instrument::{
    FtiInstrument, NoteMapping, SampleRecord, FTI_MAGIC, FTI_VERSION, INST_2A03, MAX_NAME_LEN,
    NOTE_OFFSET, PITCH_LOOP_FLAG,
};
use super::FtiError;
use crate::hardware::MAX_SAMPLE_BYTES;

fn map_eof(err: io::Error) -> FtiError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FtiError::Truncated
    } else {
        FtiError::Io(err)
    }
}

fn read_len<R: Read>(reader: &mut R, what: &str, limit: usize) -> Result<usize, FtiError> {
    let len = reader.read_i32::<LittleEndian>().map_err(map_eof)?;
    if len < 0 || len as usize > limit {
        return Err(FtiError::Corrupt(format!("{} length {}", what, len)));
    }
    Ok(len as usize)
}

fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, FtiError> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(map_eof)?;
    Ok(buf)
}

fn read_name<R: Read>(reader: &mut R, what: &str) -> Result<String, FtiError> {
    let len = read_len(reader, what, MAX_NAME_LEN - 1)?;
    let bytes = read_bytes(reader, len)?;
    String::from_utf8(bytes)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| FtiError::Corrupt(format!("{} is not ASCII", what)))
}

impl FtiInstrument {
    /// Read an instrument previously written by [`FtiInstrument::write`].
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, FtiError> {
        let mut magic = [0u8; 3];
        reader.read_exact(&mut magic).map_err(map_eof)?;
        if &magic != FTI_MAGIC {
            return Err(FtiError::InvalidMagic(magic));
        }

        let mut version = [0u8; 3];
        reader.read_exact(&mut version).map_err(map_eof)?;
        if &version != FTI_VERSION {
            return Err(FtiError::UnsupportedVersion(
                String::from_utf8_lossy(&version).into_owned(),
            ));
        }

        let inst_type = reader.read_i8().map_err(map_eof)?;
        if inst_type != INST_2A03 {
            return Err(FtiError::Unsupported(format!("instrument type {}", inst_type)));
        }

        let name = read_name(reader, "instrument name")?;

        let sequence_count = reader.read_i8().map_err(map_eof)?;
        if sequence_count != 0 {
            return Err(FtiError::Unsupported(format!(
                "{} sequences (only DPCM-only instruments are supported)",
                sequence_count
            )));
        }

        let mapping_count = read_len(reader, "mapping table", u8::MAX as usize)?;
        let mut mappings = Vec::with_capacity(mapping_count);
        for _ in 0..mapping_count {
            let index = reader.read_i8().map_err(map_eof)?;
            let sample_index = reader.read_i8().map_err(map_eof)?;
            let pitch_byte = reader.read_u8().map_err(map_eof)?;
            let delta_counter = reader.read_i8().map_err(map_eof)?;
            if index < 0 || sample_index < 0 {
                return Err(FtiError::Corrupt(format!(
                    "mapping note {} sample {}",
                    index, sample_index
                )));
            }
            mappings.push(NoteMapping {
                note: (index as i32 + NOTE_OFFSET) as u8,
                sample_index: sample_index as u8,
                pitch: pitch_byte & 0xF,
                looping: pitch_byte & PITCH_LOOP_FLAG != 0,
                delta_counter,
            });
        }

        let sample_count = read_len(reader, "sample table", u8::MAX as usize)?;
        let mut samples = Vec::with_capacity(sample_count);
        for position in 0..sample_count {
            let catalog_index = reader.read_i32::<LittleEndian>().map_err(map_eof)?;
            if catalog_index as usize != position {
                return Err(FtiError::Corrupt(format!(
                    "sample {} stored with index {}",
                    position, catalog_index
                )));
            }
            let name = read_name(reader, "sample name")?;
            let len = read_len(reader, "sample data", MAX_SAMPLE_BYTES)?;
            let data = read_bytes(reader, len)?;
            samples.push(SampleRecord { name, data });
        }

        let instrument = FtiInstrument {
            name,
            mappings,
            samples,
        };
        if let Some(mapping) = instrument
            .mappings
            .iter()
            .find(|m| instrument.sample_for(m).is_none())
        {
            return Err(FtiError::Corrupt(format!(
                "note {} refers to missing sample {}",
                mapping.note, mapping.sample_index
            )));
        }
        Ok(instrument)
    }

    /// Read an instrument from a byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FtiError> {
        Self::read(&mut Cursor::new(data))
    }
}

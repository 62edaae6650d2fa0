//! FamiTracker instrument (`.fti`) format, DPCM-only subset.
//!
//! Only 2A03 instruments with no sequences are written or read: a name, a
//! note→sample mapping table and the raw DMC sample data.
//!
//! ```text
//! "FTI" "2.4" type:i8=1 name_len:i32 name
//! seq_count:i8=0
//! map_count:i32 { note:i8 sample:i8 pitch:u8 delta:i8 }*
//! sample_count:i32 { index:i32 name_len:i32 name data_len:i32 data }*
//! ```

mod instrument;
mod reader;
mod writer;

pub use instrument::*;
pub use reader::*;
pub use writer::*;

use thiserror::Error;

/// Error type for FTI reading and writing.
#[derive(Debug, Error)]
pub enum FtiError {
    /// Instrument or sample name is 128 bytes or longer.
    #[error("Name too long ({len} bytes, max {max}): {name:?}")]
    NameTooLong { name: String, len: usize, max: usize },

    /// Names are stored as raw ASCII.
    #[error("Name is not ASCII: {0:?}")]
    NonAsciiName(String),

    /// Mapped note falls outside the instrument's addressable range.
    #[error("Note {note} maps to FTI note index {index}, outside 1..=126")]
    NoteOutOfRange { note: u8, index: i32 },

    /// Delta counter initial value must be -1 (unset) or 0-127.
    #[error("Delta counter {0} out of range (-1..=127)")]
    InvalidDelta(i8),

    /// Sample data is longer than the DMC can address.
    #[error("Sample '{name}' is too large ({len} bytes, max 4081)")]
    SampleTooLarge { name: String, len: usize },

    /// File does not start with `FTI`.
    #[error("Invalid FTI magic: {0:?}")]
    InvalidMagic([u8; 3]),

    /// Version string other than `2.4`.
    #[error("Unsupported FTI version: {0:?}")]
    UnsupportedVersion(String),

    /// Instrument type or layout this crate does not handle.
    #[error("Unsupported instrument: {0}")]
    Unsupported(String),

    /// A length field is negative or exceeds the remaining data.
    #[error("Corrupt FTI data: {0}")]
    Corrupt(String),

    /// Input ended early.
    #[error("FTI data truncated")]
    Truncated,

    /// IO error during reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FtiError {
    /// Stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            FtiError::NameTooLong { .. } => "FTI_001",
            FtiError::NonAsciiName(_) => "FTI_002",
            FtiError::NoteOutOfRange { .. } => "FTI_003",
            FtiError::InvalidDelta(_) => "FTI_004",
            FtiError::SampleTooLarge { .. } => "FTI_005",
            FtiError::InvalidMagic(_) => "FTI_006",
            FtiError::UnsupportedVersion(_) => "FTI_007",
            FtiError::Unsupported(_) => "FTI_008",
            FtiError::Corrupt(_) => "FTI_009",
            FtiError::Truncated => "FTI_010",
            FtiError::Io(_) => "FTI_011",
        }
    }
}

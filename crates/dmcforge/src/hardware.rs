//! DMC channel hardware constants.
//!
//! The DMC plays 1-bit delta samples at one of 16 fixed rates selected by a
//! 4-bit pitch index. Playing the same bitstream at a lower index transposes it
//! down by a fixed number of semitones, which the equivalency tables record.

use serde::{Deserialize, Serialize};

/// Number of selectable DMC playback rates.
pub const RATE_COUNT: usize = 16;

/// Highest DMC pitch index (fastest rate).
pub const MAX_PITCH: u8 = 0xF;

/// Largest sample length index the DMC length register can hold.
pub const MAX_LENGTH_INDEX: u32 = 255;

/// Largest DMC sample in bytes (`16 * 255 + 1`).
pub const MAX_SAMPLE_BYTES: usize = 4081;

/// NTSC DMC playback rates in Hz, index 0x0 (slowest) to 0xF (fastest).
pub const DMC_RATES_NTSC: [f64; RATE_COUNT] = [
    4181.71, 4709.93, 5264.04, 5593.04, 6257.95, 7046.35, 7919.35, 8363.42, 9419.86, 11186.1,
    12604.0, 13982.6, 16884.6, 21306.8, 24858.0, 33143.9,
];

/// Semitones between rate `k` and rate `k + 1` on NTSC hardware.
pub const SEMITONE_EQUIVALENCY_NTSC: [u8; RATE_COUNT] =
    [2, 2, 1, 2, 2, 2, 1, 2, 3, 2, 2, 3, 4, 3, 5, 0];

/// Semitones between rate `k` and rate `k + 1`, rounded against the PAL rate set.
pub const SEMITONE_EQUIVALENCY_PAL_SAFE: [u8; RATE_COUNT] =
    [2, 2, 1, 1, 3, 2, 1, 2, 3, 2, 2, 3, 4, 3, 5, 0];

/// Deviation in cents of each NTSC rate step from its integer equivalency.
pub const EQUIVALENCY_CENTS_ERROR: [i8; RATE_COUNT] =
    [6, -7, 5, -6, 5, 2, -6, 6, -2, 7, -20, 26, 3, -33, -2, 0];

/// Which semitone equivalency table the repitch fill pass trusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    Ntsc,
    PalSafe,
}

impl Region {
    /// Parse a region name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ntsc" => Some(Region::Ntsc),
            "pal_safe" | "pal" => Some(Region::PalSafe),
            _ => None,
        }
    }
}

/// Read-only view of the hardware lookup tables for one region.
#[derive(Debug, Clone, Copy)]
pub struct HardwareTables {
    /// Region the semitone table was chosen for.
    pub region: Region,
    /// Playback rate in Hz per pitch index, slowest first.
    pub rates: &'static [f64; RATE_COUNT],
    /// Semitones between each pitch index and the next faster one.
    pub equivalency: &'static [u8; RATE_COUNT],
    /// Cents by which each semitone step misses the true rate ratio.
    pub cents_error: &'static [i8; RATE_COUNT],
}

impl HardwareTables {
    /// Tables for `region`. Rates are the NTSC rates in both cases.
    pub const fn for_region(region: Region) -> Self {
        let equivalency = match region {
            Region::Ntsc => &SEMITONE_EQUIVALENCY_NTSC,
            Region::PalSafe => &SEMITONE_EQUIVALENCY_PAL_SAFE,
        };
        Self {
            region,
            rates: &DMC_RATES_NTSC,
            equivalency,
            cents_error: &EQUIVALENCY_CENTS_ERROR,
        }
    }

    /// Playback rate in Hz for a pitch index (masked to 4 bits).
    pub fn rate(&self, pitch: u8) -> f64 {
        self.rates[(pitch & MAX_PITCH) as usize]
    }

    /// Semitones gained stepping from `pitch` up to `pitch + 1`.
    pub fn equivalency(&self, pitch: u8) -> u8 {
        self.equivalency[(pitch & MAX_PITCH) as usize]
    }

    /// Tuning error in cents of the step from `pitch` up to `pitch + 1`.
    pub fn cents_error(&self, pitch: u8) -> i8 {
        self.cents_error[(pitch & MAX_PITCH) as usize]
    }
}

impl Default for HardwareTables {
    fn default() -> Self {
        Self::for_region(Region::Ntsc)
    }
}

//! Generation settings, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the keys it changes.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hardware::{Region, DMC_RATES_NTSC, MAX_LENGTH_INDEX, MAX_PITCH, MAX_SAMPLE_BYTES};
use crate::tuning::DEFAULT_SAFETY_MARGIN;

/// Playback rate the looped generator tunes against, the DMC's fastest rate.
pub const DEFAULT_PLAYBACK_RATE: f64 = 33144.0;

/// How far `playback_rate` may sit from the rate `pitch` actually plays at.
pub const PLAYBACK_RATE_TOLERANCE: f64 = 1.0;

/// Error type for loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape.
    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value is outside its allowed range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ConfigError {
    /// Stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "CONFIG_001",
            ConfigError::Parse { .. } => "CONFIG_002",
            ConfigError::InvalidParameter(_) => "CONFIG_003",
        }
    }
}

/// Load any config type from a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn check(ok: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter(message()))
    }
}

fn check_delta(delta_counter: i8) -> Result<(), ConfigError> {
    check(delta_counter >= -1, || {
        format!("delta_counter must be -1..=127, got {}", delta_counter)
    })
}

/// Settings for phase-locked looping instruments built from a waveform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Instrument name shown in the tracker.
    pub name: String,
    /// Prepended to every sample name.
    pub prefix: String,
    /// Rate the tuning analysis assumes, in Hz. Must be the rate of `pitch`.
    pub playback_rate: f64,
    /// DMC pitch index stored in each mapping.
    pub pitch: u8,
    /// Loop lengths `1..max_length` are considered.
    pub max_length: u32,
    /// Prefer the shortest loop whose tuning error is below this.
    pub error_threshold: f64,
    /// Linear volume multiplier.
    pub volume: f64,
    /// Scale down high notes the quantizer cannot swing at full amplitude.
    pub safe_amplitude: bool,
    /// Headroom factor for `safe_amplitude`.
    pub safety_margin: f64,
    /// DC offset in units of half scale.
    pub target_bias: f64,
    /// Delta counter written to each mapping, -1 to leave it alone.
    pub delta_counter: i8,
    /// Fill the lower range with the same samples at slower rates.
    pub repitch_fill: bool,
    /// Semitone table used by the fill pass.
    pub region: Region,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            name: "DPCM".to_string(),
            prefix: String::new(),
            playback_rate: DEFAULT_PLAYBACK_RATE,
            pitch: MAX_PITCH,
            max_length: MAX_LENGTH_INDEX,
            error_threshold: 0.0,
            volume: 1.0,
            safe_amplitude: true,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            target_bias: 0.0,
            delta_counter: -1,
            repitch_fill: true,
            region: Region::Ntsc,
        }
    }
}

impl GeneratorConfig {
    /// Check every field against the hardware limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.playback_rate > 0.0 && self.playback_rate.is_finite(), || {
            format!("playback_rate must be positive, got {}", self.playback_rate)
        })?;
        check(self.pitch <= MAX_PITCH, || {
            format!("pitch must be 0-15, got {}", self.pitch)
        })?;
        let pitch_rate = DMC_RATES_NTSC[self.pitch as usize];
        check(
            (self.playback_rate - pitch_rate).abs() <= PLAYBACK_RATE_TOLERANCE,
            || {
                format!(
                    "playback_rate {} does not match pitch {:X}, which plays at {} Hz",
                    self.playback_rate, self.pitch, pitch_rate
                )
            },
        )?;
        check((2..=MAX_LENGTH_INDEX + 1).contains(&self.max_length), || {
            format!("max_length must be 2-{}, got {}", MAX_LENGTH_INDEX + 1, self.max_length)
        })?;
        check(self.volume >= 0.0 && self.volume.is_finite(), || {
            format!("volume must be non-negative, got {}", self.volume)
        })?;
        check(self.safety_margin > 0.0 && self.safety_margin <= 1.0, || {
            format!("safety_margin must be in (0, 1], got {}", self.safety_margin)
        })?;
        check(self.target_bias.is_finite(), || "target_bias must be finite".to_string())?;
        check(self.error_threshold.is_finite(), || {
            "error_threshold must be finite".to_string()
        })?;
        check_delta(self.delta_counter)
    }
}

/// Settings for melodic instruments repitched from one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepitchConfig {
    /// Instrument name.
    pub name: String,
    /// Prepended to every sample name.
    pub prefix: String,
    /// Note the source recording plays.
    pub reference_note: String,
    /// DMC pitch index every sample is encoded for.
    pub quality: u8,
    /// Longer results are truncated to this many bytes.
    pub max_length_bytes: usize,
    /// Delta counter written to each mapping, -1 to leave it alone.
    pub delta_counter: i8,
    /// Fill the lower range with the same samples at slower rates.
    pub repitch_fill: bool,
    /// Semitone table used by the fill pass.
    pub region: Region,
}

impl Default for RepitchConfig {
    fn default() -> Self {
        Self {
            name: "DPCM".to_string(),
            prefix: String::new(),
            reference_note: "C4".to_string(),
            quality: MAX_PITCH,
            max_length_bytes: MAX_SAMPLE_BYTES,
            delta_counter: 32,
            repitch_fill: true,
            region: Region::Ntsc,
        }
    }
}

impl RepitchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.quality <= MAX_PITCH, || {
            format!("quality must be 0-15, got {}", self.quality)
        })?;
        check((1..=MAX_SAMPLE_BYTES).contains(&self.max_length_bytes), || {
            format!(
                "max_length_bytes must be 1-{}, got {}",
                MAX_SAMPLE_BYTES, self.max_length_bytes
            )
        })?;
        check_delta(self.delta_counter)
    }
}

/// Settings for cutting a long recording into fixed-length chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Instrument name.
    pub name: String,
    /// Chunk sample names are `{chunk_prefix}_{index:03}`.
    pub chunk_prefix: String,
    /// Distance between chunk starts.
    pub seconds: f64,
    /// Chunks past this count are left out of the instrument.
    pub max_chunks: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            name: "DPCM split".to_string(),
            chunk_prefix: "chunk".to_string(),
            seconds: 1.0,
            max_chunks: 64,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.seconds > 0.0 && self.seconds.is_finite(), || {
            format!("seconds must be positive, got {}", self.seconds)
        })?;
        check((1..=i8::MAX as usize).contains(&self.max_chunks), || {
            format!("max_chunks must be 1-127, got {}", self.max_chunks)
        })
    }
}

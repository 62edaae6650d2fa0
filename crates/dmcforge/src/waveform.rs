//! Periodic waveform generators for looped DPCM instruments.
//!
//! Every generator has a period of 1.0 and returns values in `[0, 1]`,
//! centred on 0.5 so the waveform starts and ends near the middle.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// DC offset added per unit of target bias.
pub const BIAS_OFFSET: f64 = 0.5;

/// A periodic generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
    /// One cycle of arbitrary data, normalized to `[0, 1]`.
    Table(Wavetable),
}

/// A non-empty single-cycle wavetable with values in `[0, 1]`.
///
/// Deserialization goes through [`Wavetable::new`], so an empty table is
/// rejected instead of reaching [`Waveform::at`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Wavetable(Vec<f64>);

impl Wavetable {
    /// Build a table from normalized values, clamping each into `[0, 1]`.
    ///
    /// Returns `None` for an empty cycle.
    pub fn new(values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self(values.into_iter().map(|v| v.clamp(0.0, 1.0)).collect()))
    }

    /// The table's values, one per step of the cycle.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    fn lookup(&self, dt: f64) -> f64 {
        let index = ((dt * self.0.len() as f64) as usize).min(self.0.len() - 1);
        self.0[index]
    }
}

impl TryFrom<Vec<f64>> for Wavetable {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Wavetable::new(values).ok_or_else(|| "wavetable must hold at least one value".to_string())
    }
}

impl From<Wavetable> for Vec<f64> {
    fn from(table: Wavetable) -> Self {
        table.0
    }
}

impl Waveform {
    /// Names accepted by [`Waveform::from_name`].
    pub const BUILTIN_NAMES: [&'static str; 4] = ["sine", "square", "triangle", "sawtooth"];

    /// Look up a built-in generator by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sine" => Some(Waveform::Sine),
            "square" => Some(Waveform::Square),
            "triangle" => Some(Waveform::Triangle),
            "sawtooth" | "saw" => Some(Waveform::Sawtooth),
            _ => None,
        }
    }

    /// Build a wavetable from one loop of PCM in the 0-255 working range.
    pub fn from_pcm_cycle(pcm: &[f64]) -> Option<Self> {
        Wavetable::new(pcm.iter().map(|&s| s / 255.0).collect()).map(Waveform::Table)
    }

    /// Short name for reports; tables report as `wave`.
    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Table(_) => "wave",
        }
    }

    /// Evaluate the generator at phase `dt` (in periods).
    pub fn at(&self, dt: f64) -> f64 {
        let dt = dt.rem_euclid(1.0);
        match self {
            Waveform::Square => {
                if !(0.25..=0.75).contains(&dt) {
                    0.5
                } else {
                    1.0
                }
            }
            Waveform::Triangle => {
                if dt < 0.25 {
                    0.5 + 2.0 * dt
                } else if dt > 0.75 {
                    (dt - 0.75) * 2.0
                } else {
                    1.0 - (dt - 0.25) * 2.0
                }
            }
            Waveform::Sawtooth => (dt + 0.5) % 1.0,
            Waveform::Sine => ((dt * 2.0 * PI).sin() + 1.0) / 2.0,
            Waveform::Table(table) => table.lookup(dt),
        }
    }
}

/// Phase of sample `index` for a tone of `frequency` played back at `playback_rate`.
pub fn phase(index: usize, frequency: f64, playback_rate: f64) -> f64 {
    index as f64 * frequency / playback_rate
}

/// Sample a generator at output slot `index`.
pub fn sample(waveform: &Waveform, index: usize, frequency: f64, playback_rate: f64) -> f64 {
    waveform.at(phase(index, frequency, playback_rate))
}

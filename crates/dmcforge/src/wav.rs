//! WAV file loading and preview writing.

use std::path::Path;

use thiserror::Error;

/// Error type for WAV input and output.
#[derive(Debug, Error)]
pub enum WavError {
    /// File could not be opened, read or written.
    #[error("WAV error in '{path}': {source}")]
    Hound {
        path: String,
        #[source]
        source: hound::Error,
    },

    /// Sample format outside 8-bit unsigned / 16-bit signed integer PCM.
    #[error("Unsupported WAV format in '{path}': {detail}")]
    Unsupported { path: String, detail: String },
}

impl WavError {
    /// Stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            WavError::Hound { .. } => "WAV_001",
            WavError::Unsupported { .. } => "WAV_002",
        }
    }
}

/// Mono PCM in the 0-255 working range, with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    pub samples: Vec<f64>,
    /// Frames per second.
    pub sample_rate: u32,
}

/// Load a mono or stereo, 8-bit or 16-bit integer WAV file.
///
/// Stereo is averaged to mono, 8-bit data is used as-is and 16-bit data is
/// rescaled into the 0-255 working range.
pub fn read_wav(path: &Path) -> Result<PcmClip, WavError> {
    let display = path.display().to_string();
    let hound_err = |source| WavError::Hound {
        path: display.clone(),
        source,
    };

    let mut reader = hound::WavReader::open(path).map_err(hound_err)?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int {
        return Err(WavError::Unsupported {
            path: display.clone(),
            detail: format!("only integer PCM is supported, got {:?}", spec.sample_format),
        });
    }
    if !(1..=2).contains(&spec.channels) {
        return Err(WavError::Unsupported {
            path: display.clone(),
            detail: format!("expected mono or stereo, got {} channels", spec.channels),
        });
    }

    let interleaved: Vec<f64> = match spec.bits_per_sample {
        // hound exposes unsigned 8-bit data re-centred as i8
        8 => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f64 + 128.0))
            .collect::<Result<_, _>>()
            .map_err(hound_err)?,
        16 => reader
            .samples::<i16>()
            .map(|s| s.map(|v| rescale_16bit(v as f64)))
            .collect::<Result<_, _>>()
            .map_err(hound_err)?,
        bits => {
            return Err(WavError::Unsupported {
                path: display.clone(),
                detail: format!("unsupported bit depth {} (supported: 8, 16)", bits),
            })
        }
    };

    let samples = if spec.channels == 2 {
        mix_stereo_to_mono(&interleaved)
    } else {
        interleaved
    };

    Ok(PcmClip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Map a signed 16-bit sample into the 0-255 working range.
fn rescale_16bit(sample: f64) -> f64 {
    let scale = (i16::MAX as f64 - i16::MIN as f64) / 256.0;
    (sample - i16::MIN as f64) / scale
}

/// Average interleaved left/right pairs.
pub fn mix_stereo_to_mono(interleaved: &[f64]) -> Vec<f64> {
    interleaved
        .chunks_exact(2)
        .map(|pair| (pair[0] + pair[1]) / 2.0)
        .collect()
}

/// Write 0-255 PCM as an 8-bit mono WAV file.
pub fn write_pcm_wav(path: &Path, pcm: &[f64], sample_rate: u32) -> Result<(), WavError> {
    let display = path.display().to_string();
    let hound_err = |source| WavError::Hound {
        path: display.clone(),
        source,
    };

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(hound_err)?;
    for &sample in pcm {
        let unsigned = sample.round().clamp(0.0, 255.0) as i16;
        writer
            .write_sample((unsigned - 128) as i8)
            .map_err(hound_err)?;
    }
    writer.finalize().map_err(hound_err)
}

//! Cutting long recordings into fixed-length DMC chunks.

use serde::Serialize;
use tracing::{info, warn};

use super::{GenerateError, InstrumentBuilder};
use crate::config::SplitConfig;
use crate::dpcm::encode;
use crate::fti::{FtiInstrument, SampleRecord, MIN_MAPPED_NOTE};
use crate::hardware::{HardwareTables, MAX_PITCH, MAX_SAMPLE_BYTES};
use crate::resample::resample_nearest;
use crate::wav::PcmClip;

/// MIDI note the first chunk is mapped to (FTI note index 1).
pub const FIRST_CHUNK_NOTE: u8 = MIN_MAPPED_NOTE;

/// Chunks are this many 16-byte blocks longer than the split stride, so
/// consecutive chunks overlap by roughly 16 ms.
const OVERLAP_BLOCKS: usize = 5;

/// Encoded chunks and the instrument that maps them.
#[derive(Debug, Clone, Serialize)]
pub struct SplitResult {
    /// Bytes between chunk starts.
    pub stride_bytes: usize,
    /// Length of every chunk, a valid DMC length.
    pub chunk_bytes: usize,
    /// Encoded chunks in time order, including unmapped ones.
    #[serde(skip)]
    pub chunks: Vec<Vec<u8>>,
    /// Instrument mapping the first `max_chunks` chunks.
    pub instrument: FtiInstrument,
}

/// Encode `source` at the fastest DMC rate and cut it into chunks.
///
/// Chunks start every `config.seconds`, run a little past the next start and
/// are zero-padded to full length. The instrument maps chunk `i` to MIDI note
/// `13 + i`, up to `config.max_chunks` chunks.
pub fn split_recording(
    source: &PcmClip,
    config: &SplitConfig,
    tables: &HardwareTables,
) -> Result<SplitResult, GenerateError> {
    config.validate()?;
    if source.sample_rate == 0 {
        return Err(GenerateError::InvalidParameter(
            "source sample rate is zero".to_string(),
        ));
    }

    let rate = tables.rate(MAX_PITCH);
    let pcm = resample_nearest(&source.samples, source.sample_rate as f64 / rate)?;
    let data = encode(&pcm, None)?;

    let stride_bytes = (config.seconds * rate / 8.0).floor() as usize;
    if stride_bytes == 0 {
        return Err(GenerateError::InvalidParameter(format!(
            "split length {}s is shorter than one DMC byte",
            config.seconds
        )));
    }
    let mut chunk_bytes = (stride_bytes / 16 + OVERLAP_BLOCKS) * 16 + 1;
    if chunk_bytes > MAX_SAMPLE_BYTES {
        warn!(
            chunk_bytes,
            max = MAX_SAMPLE_BYTES,
            "split length exceeds the maximum sample length, truncating chunks"
        );
        chunk_bytes = MAX_SAMPLE_BYTES;
    }

    let chunks: Vec<Vec<u8>> = (0..data.len())
        .step_by(stride_bytes)
        .map(|start| {
            let end = (start + chunk_bytes).min(data.len());
            let mut chunk = data[start..end].to_vec();
            chunk.resize(chunk_bytes, 0);
            chunk
        })
        .collect();

    info!(
        stride_bytes,
        chunk_bytes,
        chunks = chunks.len(),
        "split encoded recording"
    );
    if chunks.len() > config.max_chunks {
        warn!(
            chunks = chunks.len(),
            max = config.max_chunks,
            "only the first chunks fit in the instrument"
        );
    }

    let mut builder = InstrumentBuilder::new(&config.name);
    for (i, chunk) in chunks.iter().take(config.max_chunks).enumerate() {
        builder.add(
            FIRST_CHUNK_NOTE + i as u8,
            SampleRecord::new(format!("{}_{:03}", config.chunk_prefix, i), chunk.clone()),
            MAX_PITCH,
            false,
            0,
        );
    }

    Ok(SplitResult {
        stride_bytes,
        chunk_bytes,
        chunks,
        instrument: builder.finish(),
    })
}

//! Split command implementation
//!
//! Cuts a long recording into DMC-sized chunks for streaming playback.

use anyhow::{Context, Result};
use colored::Colorize;
use dmcforge::wav::read_wav;
use dmcforge::{split_recording, HardwareTables, SplitConfig, SplitResult};
use std::path::Path;
use std::process::ExitCode;

use super::reporting;

/// Run the split command
///
/// # Arguments
/// * `source` - WAV file to split
/// * `seconds` - Distance between chunk starts
/// * `directory` - Where to write `<chunk>.dmc` files
/// * `instrument` - FTI file mapping the chunks to consecutive notes
/// * `fullname` - Instrument name shown in the tracker
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    source: &str,
    seconds: f64,
    directory: Option<&str>,
    instrument: Option<&str>,
    fullname: Option<&str>,
) -> Result<ExitCode> {
    let mut config = SplitConfig {
        seconds,
        ..Default::default()
    };
    if let Some(name) = fullname {
        config.name = name.to_string();
    }
    if let Some(stem) = Path::new(source).file_stem() {
        config.chunk_prefix = stem.to_string_lossy().into_owned();
    }

    println!("{} {} every {}s", "Splitting:".cyan().bold(), source, seconds);

    let clip = read_wav(Path::new(source))?;
    let result = split_recording(&clip, &config, &HardwareTables::default())
        .with_context(|| format!("Failed to split: {}", source))?;

    if let Some(dir) = directory {
        reporting::write_dmc_files(dir, chunk_files(&result, &config))?;
    }
    if let Some(path) = instrument {
        reporting::write_instrument(&result.instrument, path)?;
    }

    println!(
        "{} {} chunks of {} bytes ({} mapped)",
        "SUCCESS".green().bold(),
        result.chunks.len(),
        result.chunk_bytes,
        result.instrument.samples.len()
    );
    if directory.is_none() && instrument.is_none() {
        println!("  {} nothing written, pass -s and/or -i", "Note:".yellow());
    }

    Ok(ExitCode::SUCCESS)
}

/// Every chunk, including those past the instrument's limit, as `<prefix>_<index>`.
fn chunk_files<'a>(
    result: &'a SplitResult,
    config: &SplitConfig,
) -> Vec<(String, &'a [u8])> {
    result
        .chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| (format!("{}_{:03}", config.chunk_prefix, i), chunk.as_slice()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmcforge::FtiInstrument;

    #[test]
    fn test_run_writes_chunks_and_instrument() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("speech.wav");
        let pcm: Vec<f64> = (0..44100)
            .map(|i| 128.0 + 60.0 * (i as f64 * 0.01).sin())
            .collect();
        dmcforge::wav::write_pcm_wav(&source, &pcm, 44100).unwrap();

        let chunks = dir.path().join("chunks");
        let fti = dir.path().join("speech.fti");
        run(
            source.to_str().unwrap(),
            0.25,
            chunks.to_str(),
            fti.to_str(),
            Some("Speech"),
        )
        .unwrap();

        assert!(chunks.join("speech_000.dmc").exists());
        let len = std::fs::metadata(chunks.join("speech_000.dmc")).unwrap().len();
        assert_eq!((len - 1) % 16, 0);

        let instrument = FtiInstrument::from_bytes(&std::fs::read(&fti).unwrap()).unwrap();
        assert_eq!(instrument.name, "Speech");
        assert_eq!(instrument.mappings[0].note, 13);
    }
}

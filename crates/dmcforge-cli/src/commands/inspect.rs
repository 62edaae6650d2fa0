//! Inspect command implementation
//!
//! Reads an FTI instrument back and prints its mappings and samples.

use anyhow::{Context, Result};
use colored::Colorize;
use dmcforge::dpcm::decode_bias;
use dmcforge::note::note_name;
use dmcforge::FtiInstrument;
use serde::Serialize;
use std::fs;
use std::process::ExitCode;

#[derive(Debug, Serialize)]
struct SampleSummary<'a> {
    index: usize,
    name: &'a str,
    size: usize,
    bias: i32,
}

#[derive(Debug, Serialize)]
struct InspectOutput<'a> {
    path: &'a str,
    hash: String,
    instrument: &'a FtiInstrument,
    samples: Vec<SampleSummary<'a>>,
}

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(path: &str, json: bool) -> Result<ExitCode> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read instrument: {}", path))?;
    let instrument = FtiInstrument::from_bytes(&bytes)
        .with_context(|| format!("Failed to parse instrument: {}", path))?;
    let hash = instrument
        .compute_hash()
        .context("Failed to hash instrument")?;

    if json {
        let output = InspectOutput {
            path,
            hash,
            instrument: &instrument,
            samples: sample_summaries(&instrument),
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Instrument:".cyan().bold(), path);
    println!("  {} {}", "Name:".dimmed(), instrument.name);
    println!("  {} {}", "Hash:".dimmed(), hash);

    let mut mappings = instrument.mappings.clone();
    mappings.sort_by_key(|m| m.note);
    println!("\n{} ({})", "Mappings".bold(), mappings.len());
    for mapping in &mappings {
        let sample = instrument
            .sample_for(mapping)
            .map_or("?", |s| s.name.as_str());
        let delta = if mapping.delta_counter < 0 {
            "-".to_string()
        } else {
            mapping.delta_counter.to_string()
        };
        println!(
            "  {:<5} -> {:>3} {:<16} pitch {:X}{} delta {}",
            note_name(mapping.note),
            mapping.sample_index,
            sample,
            mapping.pitch,
            if mapping.looping { " loop" } else { "     " },
            delta
        );
    }

    let samples = sample_summaries(&instrument);
    println!("\n{} ({})", "Samples".bold(), samples.len());
    for sample in &samples {
        println!(
            "  {:>3} {:<16} {:>5} bytes  bias {:+}",
            sample.index, sample.name, sample.size, sample.bias
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn sample_summaries(instrument: &FtiInstrument) -> Vec<SampleSummary<'_>> {
    instrument
        .samples
        .iter()
        .enumerate()
        .map(|(position, sample)| SampleSummary {
            index: position + 1,
            name: &sample.name,
            size: sample.data.len(),
            bias: decode_bias(&sample.data),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmcforge::{NoteMapping, SampleRecord};

    fn write_fixture(dir: &std::path::Path) -> String {
        let mut instrument = FtiInstrument::new("inspect me");
        let index = instrument.add_sample(SampleRecord::new("up", vec![0xFF; 17]));
        instrument.add_mapping(NoteMapping::new(60, index, 0xF).looping(true));
        let path = dir.join("fixture.fti");
        fs::write(&path, instrument.to_bytes().unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_sample_summaries() {
        let mut instrument = FtiInstrument::new("s");
        instrument.add_sample(SampleRecord::new("up", vec![0xFF; 2]));
        let summaries = sample_summaries(&instrument);
        assert_eq!(summaries[0].index, 1);
        assert_eq!(summaries[0].bias, 32);
    }

    #[test]
    fn test_run_reads_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());
        assert!(run(&path, false).is_ok());
        assert!(run(&path, true).is_ok());
    }

    #[test]
    fn test_run_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.fti");
        fs::write(&path, b"not an instrument").unwrap();
        assert!(run(path.to_str().unwrap(), false).is_err());
    }
}

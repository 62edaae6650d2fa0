//! Output shared by the instrument-producing commands: files on disk,
//! the colored per-note table and the JSON report.

use anyhow::{Context, Result};
use colored::Colorize;
use dmcforge::dpcm::{decode_levels, STEP};
use dmcforge::wav::write_pcm_wav;
use dmcforge::{FtiInstrument, GenerateResult, HardwareTables, NoteReport, Region, VERSION};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Looping previews are repeated until they are at least this long.
const PREVIEW_SECONDS: f64 = 1.0;

/// Machine-readable summary printed with `--json`.
#[derive(Debug, Serialize)]
pub(crate) struct InstrumentReport<'a> {
    pub tool_version: &'static str,
    pub success: bool,
    pub output: Option<&'a str>,
    pub name: &'a str,
    /// BLAKE3 of the instrument bytes.
    pub hash: String,
    pub samples: usize,
    pub mappings: usize,
    pub sample_bytes: usize,
    pub filled: usize,
    pub notes: &'a [NoteReport],
}

impl<'a> InstrumentReport<'a> {
    /// Summarize `result`, hashing the serialized instrument.
    pub fn new(result: &'a GenerateResult, output: Option<&'a str>) -> Result<Self> {
        let instrument = &result.instrument;
        Ok(Self {
            tool_version: VERSION,
            success: true,
            output,
            name: &instrument.name,
            hash: instrument
                .compute_hash()
                .context("Failed to serialize instrument")?,
            samples: instrument.samples.len(),
            mappings: instrument.mappings.len(),
            sample_bytes: instrument.sample_bytes(),
            filled: result.filled,
            notes: &result.reports,
        })
    }

    /// Print as pretty JSON on stdout.
    pub fn print(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        println!("{}", json);
        Ok(())
    }
}

pub(crate) fn parse_region(name: &str) -> Result<Region> {
    Region::from_name(name)
        .with_context(|| format!("Unknown region: {} (expected ntsc or pal-safe)", name))
}

/// Instrument name derived from an output path, `"DPCM <stem>"`.
pub(crate) fn default_name(output: Option<&str>) -> Option<String> {
    let stem = Path::new(output?).file_stem()?.to_string_lossy().into_owned();
    Some(format!("DPCM {}", stem))
}

pub(crate) fn write_instrument(instrument: &FtiInstrument, path: &str) -> Result<()> {
    let bytes = instrument
        .to_bytes()
        .with_context(|| format!("Failed to serialize instrument: {}", instrument.name))?;
    fs::write(path, &bytes).with_context(|| format!("Failed to write instrument: {}", path))?;
    debug!(path, bytes = bytes.len(), "wrote instrument");
    Ok(())
}

/// Write each sample as `<dir>/<name>.dmc`.
pub(crate) fn write_dmc_files<'a, N: AsRef<str>>(
    dir: &str,
    samples: impl IntoIterator<Item = (N, &'a [u8])>,
) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir))?;
    let mut written = 0;
    for (name, data) in samples {
        let path = Path::new(dir).join(format!("{}.dmc", name.as_ref()));
        fs::write(&path, data).with_context(|| format!("Failed to write: {}", path.display()))?;
        debug!(path = %path.display(), bytes = data.len(), "wrote raw sample");
        written += 1;
    }
    Ok(written)
}

/// Decode every mapped sample back to PCM and write it as `<dir>/<name>.wav`.
///
/// Each sample is rendered at the rate of the first mapping that uses it.
pub(crate) fn write_previews(
    dir: &str,
    instrument: &FtiInstrument,
    tables: &HardwareTables,
) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir))?;
    let mut written = 0;
    for (position, sample) in instrument.samples.iter().enumerate() {
        let index = position + 1;
        let Some(mapping) = instrument
            .mappings
            .iter()
            .find(|m| m.sample_index as usize == index)
        else {
            continue;
        };

        let rate = tables.rate(mapping.pitch);
        let mut data = sample.data.clone();
        if mapping.looping && !data.is_empty() {
            let target_bytes = (rate * PREVIEW_SECONDS / 8.0).ceil() as usize;
            while data.len() < target_bytes {
                data.extend_from_slice(&sample.data);
            }
        }

        let start = i32::from(mapping.delta_counter.max(0));
        let pcm: Vec<f64> = decode_levels(&data, start)
            .into_iter()
            .map(|level| (level * STEP) as f64)
            .collect();
        let path = Path::new(dir).join(format!("{}.wav", sample.name));
        write_pcm_wav(&path, &pcm, rate.round() as u32)
            .with_context(|| format!("Failed to write preview: {}", path.display()))?;
        written += 1;
    }
    Ok(written)
}

fn format_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

/// Print one line per generated note.
pub(crate) fn print_note_table(reports: &[NoteReport]) {
    println!(
        "  {:<5} {:>3} {:>6} {:>6} {:>5} {:>9} {:>6} {:>5}",
        "note", "idx", "size", "err", "reps", "freq", "ampl", "bias"
    );
    for report in reports {
        let line = format!(
            "  {:<5} {:>3} {:>6} {:>6} {:>5} {:>9} {:>6} {:>5}",
            report.name,
            report.sample_index,
            report.size,
            format_opt(report.tuning_error, 3),
            report
                .repetitions
                .map_or_else(|| "-".to_string(), |r| r.to_string()),
            format_opt(report.effective_frequency, 2),
            format_opt(report.amplitude, 2),
            report.bias,
        );
        if report.fallback || report.truncated {
            let flag = if report.fallback { "fallback" } else { "truncated" };
            println!("{} {}", line.yellow(), flag.yellow());
        } else {
            println!("{}", line);
        }
    }
}

pub(crate) fn print_summary(result: &GenerateResult, output: Option<&str>) {
    let instrument = &result.instrument;
    println!(
        "{} {} samples, {} mappings ({} filled), {} bytes",
        "SUCCESS".green().bold(),
        instrument.samples.len(),
        instrument.mappings.len(),
        result.filled,
        instrument.sample_bytes()
    );
    match output {
        Some(path) => println!("  {} {}", "Instrument:".dimmed(), path),
        None => println!("  {} no output file given", "Note:".yellow()),
    }
}

//! Repitch command implementation
//!
//! Resamples one recording to every requested note.

use anyhow::{Context, Result};
use colored::Colorize;
use dmcforge::config::load_json;
use dmcforge::note::parse_note_list;
use dmcforge::wav::read_wav;
use dmcforge::{repitch_instrument, HardwareTables, RepitchConfig};
use std::path::Path;
use std::process::ExitCode;

use super::reporting::{self, InstrumentReport};

/// Options for the repitch command. `None` leaves the config value alone.
#[derive(Debug, Clone, Default)]
pub struct RepitchOptions {
    pub source: String,
    pub notes: String,
    pub output: Option<String>,
    pub reference: Option<String>,
    pub quality: Option<u8>,
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub delta: Option<i8>,
    pub no_repitch: bool,
    pub region: Option<String>,
    pub dmc_dir: Option<String>,
    pub config: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

/// Run the repitch command
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(options: &RepitchOptions) -> Result<ExitCode> {
    let config = build_config(options)?;
    let notes = parse_note_list(&options.notes)
        .with_context(|| format!("Invalid note list: {}", options.notes))?;
    let clip = read_wav(Path::new(&options.source))?;
    let tables = HardwareTables::for_region(config.region);

    if !options.json {
        println!(
            "{} {} from {} ({} notes, reference {})",
            "Repitching:".cyan().bold(),
            config.name,
            options.source,
            notes.len(),
            config.reference_note
        );
    }

    let result = repitch_instrument(&clip, &notes, &config, &tables)
        .with_context(|| format!("Failed to repitch: {}", options.source))?;

    let output = options.output.as_deref();
    if let Some(path) = output {
        reporting::write_instrument(&result.instrument, path)?;
    }
    if let Some(dir) = options.dmc_dir.as_deref() {
        reporting::write_dmc_files(
            dir,
            result
                .instrument
                .samples
                .iter()
                .map(|s| (s.name.as_str(), s.data.as_slice())),
        )?;
    }

    if options.json {
        InstrumentReport::new(&result, output)?.print()?;
    } else {
        if !options.quiet {
            reporting::print_note_table(&result.reports);
        }
        reporting::print_summary(&result, output);
    }

    Ok(ExitCode::SUCCESS)
}

fn build_config(options: &RepitchOptions) -> Result<RepitchConfig> {
    let mut config: RepitchConfig = match options.config.as_deref() {
        Some(path) => load_json(Path::new(path))?,
        None => RepitchConfig::default(),
    };

    if let Some(name) = &options.name {
        config.name = name.clone();
    } else if options.config.is_none() {
        if let Some(name) = reporting::default_name(options.output.as_deref()) {
            config.name = name;
        }
    }
    if let Some(prefix) = &options.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(reference) = &options.reference {
        config.reference_note = reference.clone();
    }
    if let Some(quality) = options.quality {
        config.quality = quality;
    }
    if let Some(delta) = options.delta {
        config.delta_counter = delta;
    }
    if options.no_repitch {
        config.repitch_fill = false;
    }
    if let Some(region) = options.region.as_deref() {
        config.region = reporting::parse_region(region)?;
    }

    config.validate()?;
    Ok(config)
}

//! Generate command implementation
//!
//! Builds a looping instrument of phase-locked samples from a waveform.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dmcforge::config::load_json;
use dmcforge::note::parse_note_list;
use dmcforge::wav::read_wav;
use dmcforge::{generate_instrument, GeneratorConfig, HardwareTables, Waveform};
use std::path::Path;
use std::process::ExitCode;

use super::reporting::{self, InstrumentReport};

/// Options for the generate command. `None` leaves the config value alone.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub notes: String,
    pub output: Option<String>,
    pub generator: String,
    pub wavefile: Option<String>,
    pub volume: Option<f64>,
    pub error_threshold: Option<f64>,
    pub bias: Option<f64>,
    pub max_length: Option<u32>,
    pub no_safe_volume: bool,
    pub delta: Option<i8>,
    pub no_repitch: bool,
    pub region: Option<String>,
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub dmc_dir: Option<String>,
    pub preview_dir: Option<String>,
    pub config: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

/// Run the generate command
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(options: &GenerateOptions) -> Result<ExitCode> {
    let config = build_config(options)?;
    let waveform = select_waveform(&options.generator, options.wavefile.as_deref())?;
    let notes = parse_note_list(&options.notes)
        .with_context(|| format!("Invalid note list: {}", options.notes))?;
    let tables = HardwareTables::for_region(config.region);

    if !options.json {
        println!(
            "{} {} ({} notes, {})",
            "Generating:".cyan().bold(),
            config.name,
            notes.len(),
            waveform.name()
        );
    }

    let result = generate_instrument(&waveform, &notes, &config, &tables)
        .with_context(|| format!("Failed to generate instrument: {}", config.name))?;

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
    if let Some(dir) = options.preview_dir.as_deref() {
        reporting::write_previews(dir, &result.instrument, &tables)?;
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

/// Start from the config file (or defaults) and apply explicit flags on top.
fn build_config(options: &GenerateOptions) -> Result<GeneratorConfig> {
    let mut config: GeneratorConfig = match options.config.as_deref() {
        Some(path) => load_json(Path::new(path))?,
        None => GeneratorConfig::default(),
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
    if let Some(volume) = options.volume {
        config.volume = volume;
    }
    if let Some(threshold) = options.error_threshold {
        config.error_threshold = threshold;
    }
    if let Some(bias) = options.bias {
        config.target_bias = bias;
    }
    if let Some(max_length) = options.max_length {
        config.max_length = max_length;
    }
    if options.no_safe_volume {
        config.safe_amplitude = false;
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

fn select_waveform(generator: &str, wavefile: Option<&str>) -> Result<Waveform> {
    if generator.eq_ignore_ascii_case("wave") {
        let Some(path) = wavefile else {
            bail!("The wave generator requires -w/--wavefile");
        };
        let clip = read_wav(Path::new(path))?;
        return Waveform::from_pcm_cycle(&clip.samples)
            .with_context(|| format!("Wave file holds no samples: {}", path));
    }

    if wavefile.is_some() {
        bail!("-w/--wavefile is only used by the wave generator (got -g {})", generator);
    }
    Waveform::from_name(generator).with_context(|| {
        format!(
            "Unknown generator: {} (expected one of: {}, wave)",
            generator,
            Waveform::BUILTIN_NAMES.join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmcforge::{FtiInstrument, Region, Wavetable};

    fn options(dir: &Path) -> GenerateOptions {
        GenerateOptions {
            notes: "c4-e4".to_string(),
            output: Some(dir.join("saw.fti").to_string_lossy().into_owned()),
            generator: "sawtooth".to_string(),
            error_threshold: Some(0.02),
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("gen.json");
        std::fs::write(&config_path, r#"{"volume": 0.25, "max_length": 64, "name": "From file"}"#)
            .unwrap();

        let opts = GenerateOptions {
            config: Some(config_path.to_string_lossy().into_owned()),
            volume: Some(0.5),
            region: Some("pal-safe".to_string()),
            ..options(dir.path())
        };
        let config = build_config(&opts).unwrap();
        assert_eq!(config.volume, 0.5);
        assert_eq!(config.max_length, 64);
        assert_eq!(config.name, "From file");
        assert_eq!(config.region, Region::PalSafe);
    }

    #[test]
    fn test_name_defaults_to_output_stem() {
        let dir = tempfile::tempdir().unwrap();
        let config = build_config(&options(dir.path())).unwrap();
        assert_eq!(config.name, "DPCM saw");
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let opts = GenerateOptions {
            max_length: Some(1),
            ..options(dir.path())
        };
        assert!(build_config(&opts).is_err());
    }

    #[test]
    fn test_select_waveform() {
        assert_eq!(select_waveform("triangle", None).unwrap(), Waveform::Triangle);
        assert!(select_waveform("noise", None).is_err());
        assert!(select_waveform("wave", None).is_err());
        assert!(select_waveform("sine", Some("loop.wav")).is_err());
    }

    #[test]
    fn test_wave_generator_reads_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycle.wav");
        dmcforge::wav::write_pcm_wav(&path, &[0.0, 255.0, 255.0, 0.0], 8000).unwrap();

        let waveform = select_waveform("wave", Some(path.to_str().unwrap())).unwrap();
        let expected = Wavetable::new(vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        assert_eq!(waveform, Waveform::Table(expected));
    }

    #[test]
    fn test_run_writes_instrument_and_dmc_files() {
        let dir = tempfile::tempdir().unwrap();
        let opts = GenerateOptions {
            dmc_dir: Some(dir.path().join("dmc").to_string_lossy().into_owned()),
            preview_dir: Some(dir.path().join("preview").to_string_lossy().into_owned()),
            ..options(dir.path())
        };
        run(&opts).unwrap();

        let bytes = std::fs::read(dir.path().join("saw.fti")).unwrap();
        let instrument = FtiInstrument::from_bytes(&bytes).unwrap();
        assert_eq!(instrument.name, "DPCM saw");
        assert_eq!(instrument.samples.len(), 5);
        assert!(dir.path().join("dmc").join("Ds4.dmc").exists());
        assert!(dir.path().join("preview").join("C4.wav").exists());
    }
}

//! dmcforge CLI - DPCM instrument generation for the NES DMC channel
//!
//! Builds FamiTracker instruments from waveforms or recordings, splits long
//! recordings into DMC chunks, and inspects existing instruments.

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use dmcforge_cli::commands;
use dmcforge_cli::commands::generate::GenerateOptions;
use dmcforge_cli::commands::repitch::RepitchOptions;

/// dmcforge - DPCM sample and instrument generator
#[derive(Parser)]
#[command(name = "dmcforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more detail to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate phase-locked looping samples from a waveform
    Generate {
        /// Notes to generate, e.g. "gs2,f3-a3"
        notes: String,

        /// FTI instrument file to write
        #[arg(short, long)]
        output: Option<String>,

        /// Waveform generator: sine, square, triangle, sawtooth or wave
        #[arg(short, long, default_value = "sine")]
        generator: String,

        /// WAV file holding one loop, for the wave generator
        #[arg(short, long)]
        wavefile: Option<String>,

        /// Linear volume multiplier
        #[arg(short = 'v', long)]
        volume: Option<f64>,

        /// Prefer the shortest loop whose tuning error is below this fraction of a period
        #[arg(short, long)]
        error_threshold: Option<f64>,

        /// Bias generated samples in this direction
        #[arg(short, long, allow_negative_numbers = true)]
        bias: Option<f64>,

        /// Longest loop length index to consider
        #[arg(short = 'l', long)]
        max_length: Option<u32>,

        /// Keep full volume on high notes
        #[arg(long)]
        no_safe_volume: bool,

        /// Delta counter value when playback begins (-1 leaves it alone)
        #[arg(short, long, allow_negative_numbers = true)]
        delta: Option<i8>,

        /// Do not fill the lower range with slower playback of existing samples
        #[arg(long)]
        no_repitch: bool,

        /// Semitone table: ntsc or pal-safe
        #[arg(long, value_parser = ["ntsc", "pal-safe"])]
        region: Option<String>,

        /// Instrument name shown in the tracker
        #[arg(long)]
        name: Option<String>,

        /// Prefix for sample names
        #[arg(long)]
        prefix: Option<String>,

        /// Also write each sample as a raw .dmc file into this directory
        #[arg(long)]
        dmc_dir: Option<String>,

        /// Write a decoded WAV preview of each sample into this directory
        #[arg(long)]
        preview: Option<String>,

        /// JSON file with generator settings; flags override it
        #[arg(long)]
        config: Option<String>,

        /// Output a machine-readable JSON report
        #[arg(long)]
        json: bool,

        /// Skip the per-note table
        #[arg(short, long)]
        quiet: bool,
    },

    /// Repitch one recording across a range of notes
    Repitch {
        /// Source WAV file (8-bit or 16-bit, mono or stereo)
        source: String,

        /// Notes to generate, e.g. "gs2,f3-a3"
        notes: String,

        /// FTI instrument file to write
        #[arg(short, long)]
        output: Option<String>,

        /// Note the source recording plays
        #[arg(short, long)]
        reference: Option<String>,

        /// DMC rate index every sample is encoded for (0-15)
        #[arg(short, long)]
        quality: Option<u8>,

        /// Instrument name shown in the tracker
        #[arg(long)]
        name: Option<String>,

        /// Prefix for sample names
        #[arg(long)]
        prefix: Option<String>,

        /// Delta counter value when playback begins (-1 leaves it alone)
        #[arg(short, long, allow_negative_numbers = true)]
        delta: Option<i8>,

        /// Do not fill the lower range with slower playback of existing samples
        #[arg(long)]
        no_repitch: bool,

        /// Semitone table: ntsc or pal-safe
        #[arg(long, value_parser = ["ntsc", "pal-safe"])]
        region: Option<String>,

        /// Also write each sample as a raw .dmc file into this directory
        #[arg(long)]
        dmc_dir: Option<String>,

        /// JSON file with repitch settings; flags override it
        #[arg(long)]
        config: Option<String>,

        /// Output a machine-readable JSON report
        #[arg(long)]
        json: bool,

        /// Skip the per-note table
        #[arg(long)]
        quiet: bool,
    },

    /// Split a long recording into fixed-length DMC chunks
    Split {
        /// Source WAV file (8-bit or 16-bit, mono or stereo)
        source: String,

        /// Split length in seconds
        seconds: f64,

        /// Directory to store the chunks as .dmc files
        #[arg(short = 's', long)]
        directory: Option<String>,

        /// FTI instrument file to write
        #[arg(short, long)]
        instrument: Option<String>,

        /// Instrument name shown in the tracker
        #[arg(long)]
        fullname: Option<String>,
    },

    /// Print the contents of an FTI instrument
    Inspect {
        /// FTI file to read
        file: String,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            notes,
            output,
            generator,
            wavefile,
            volume,
            error_threshold,
            bias,
            max_length,
            no_safe_volume,
            delta,
            no_repitch,
            region,
            name,
            prefix,
            dmc_dir,
            preview,
            config,
            json,
            quiet,
        } => commands::generate::run(&GenerateOptions {
            notes,
            output,
            generator,
            wavefile,
            volume,
            error_threshold,
            bias,
            max_length,
            no_safe_volume,
            delta,
            no_repitch,
            region,
            name,
            prefix,
            dmc_dir,
            preview_dir: preview,
            config,
            json,
            quiet,
        }),
        Commands::Repitch {
            source,
            notes,
            output,
            reference,
            quality,
            name,
            prefix,
            delta,
            no_repitch,
            region,
            dmc_dir,
            config,
            json,
            quiet,
        } => commands::repitch::run(&RepitchOptions {
            source,
            notes,
            output,
            reference,
            quality,
            name,
            prefix,
            delta,
            no_repitch,
            region,
            dmc_dir,
            config,
            json,
            quiet,
        }),
        Commands::Split {
            source,
            seconds,
            directory,
            instrument,
            fullname,
        } => commands::split::run(
            &source,
            seconds,
            directory.as_deref(),
            instrument.as_deref(),
            fullname.as_deref(),
        ),
        Commands::Inspect { file, json } => commands::inspect::run(&file, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

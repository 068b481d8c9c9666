//! CaptionFlow CLI
//!
//! Headless front end for the caption engine: convert between caption
//! formats, retime, clean up text, report reading speed and extract waveform
//! peaks from WAV audio.

mod audio;
mod files;
mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use captionflow_lib::core::captions::{CaptionFormat, ReadingSpeedFlag};
use captionflow_lib::core::settings::{EngineSettings, SETTINGS_FILE};
use captionflow_lib::core::waveform::WaveformProcessor;
use captionflow_lib::core::CaptionEditor;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "captionflow", version, about = "Caption editing from the command line")]
struct Cli {
    /// Settings file (defaults to ./captionflow.json when present)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Caption input and output shared by the editing subcommands
#[derive(Args, Debug)]
struct CaptionIo {
    /// Input caption file (json, srt or vtt)
    input: PathBuf,

    /// Input format, when the extension does not say
    #[arg(long)]
    from: Option<String>,

    /// Output format (defaults to the input format)
    #[arg(long)]
    to: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a caption file to another format
    Convert {
        #[command(flatten)]
        io: CaptionIo,
    },
    /// Shift every caption by a signed number of milliseconds
    Shift {
        #[command(flatten)]
        io: CaptionIo,
        #[arg(long, allow_hyphen_values = true)]
        delta_ms: i64,
    },
    /// Scale every timestamp by a factor
    Stretch {
        #[command(flatten)]
        io: CaptionIo,
        #[arg(long)]
        factor: f64,
    },
    /// Report words per minute for each caption
    Analyze {
        /// Input caption file
        input: PathBuf,
        #[arg(long)]
        from: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mask or remove profanity
    Censor {
        #[command(flatten)]
        io: CaptionIo,
        /// Remove matched words instead of masking them
        #[arg(long)]
        remove: bool,
    },
    /// Literal find and replace across all captions
    Replace {
        #[command(flatten)]
        io: CaptionIo,
        #[arg(long)]
        find: String,
        #[arg(long, default_value = "")]
        replace: String,
        #[arg(long)]
        case_sensitive: bool,
    },
    /// Add terminal punctuation and sentence capitalization
    Punctuate {
        #[command(flatten)]
        io: CaptionIo,
    },
    /// Extract waveform peaks from a WAV file as JSON
    Waveform {
        /// Input WAV file
        input: PathBuf,
        /// Also list bucket indices louder than this amplitude
        #[arg(long)]
        threshold: Option<f32>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WaveformReport {
    sample_rate: u32,
    bucket_size: usize,
    bucket_duration_ms: f64,
    duration_ms: u64,
    peaks: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loud_buckets: Option<Vec<usize>>,
}

fn load_settings(path: Option<&Path>) -> Result<EngineSettings> {
    match path {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(EngineSettings::load_or_default(Path::new(SETTINGS_FILE))),
    }
}

/// Loads the input, applies `edit`, and renders the result in the output format.
fn edit_captions(
    io: &CaptionIo,
    settings: &EngineSettings,
    edit: impl FnOnce(&mut CaptionEditor) -> Result<()>,
) -> Result<String> {
    let input_format = files::resolve_format(io.from.as_deref(), &io.input)?;
    let output_format = match io.to.as_deref() {
        Some(name) => name.parse::<CaptionFormat>()?,
        None => input_format,
    };

    let mut editor = files::load_editor(&io.input, input_format, settings)?;
    edit(&mut editor)?;
    Ok(editor.export_captions(output_format.as_str())?)
}

fn render_analysis(editor: &CaptionEditor, json: bool) -> Result<String> {
    let report = editor.analyze_reading_speed();
    if json {
        return Ok(serde_json::to_string_pretty(&report)? + "\n");
    }

    let mut out = String::new();
    for (caption, entry) in editor.captions().iter().zip(&report) {
        let flag = match entry.flag {
            ReadingSpeedFlag::Ok => "ok",
            ReadingSpeedFlag::TooFast => "TOO FAST",
            ReadingSpeedFlag::TooSlow => "too slow",
        };
        out.push_str(&format!(
            "{:>8} ms  {:>6.1} wpm  {:<8}  {}\n",
            caption.start_ms,
            entry.wpm,
            flag,
            caption.text.replace('\n', " ")
        ));
    }
    let flagged = report
        .iter()
        .filter(|e| e.flag != ReadingSpeedFlag::Ok)
        .count();
    out.push_str(&format!("{} captions, {} flagged\n", report.len(), flagged));
    Ok(out)
}

fn render_waveform(input: &Path, threshold: Option<f32>, settings: &EngineSettings) -> Result<String> {
    let audio = audio::read_wav_mono(input)?;
    let mut processor =
        WaveformProcessor::with_resolution(audio.sample_rate, settings.waveform.buckets_per_second);
    processor.process_audio_buffer(&audio.samples);

    let report = WaveformReport {
        sample_rate: processor.sample_rate(),
        bucket_size: processor.bucket_size(),
        bucket_duration_ms: processor.bucket_duration_ms(),
        duration_ms: processor.duration_ms(),
        peaks: processor.get_waveform_data().to_vec(),
        loud_buckets: threshold.map(|t| processor.get_peaks(t)),
    };
    Ok(serde_json::to_string(&report)? + "\n")
}

/// Runs a subcommand, returning the text to write and where to write it.
fn execute(command: &Commands, settings: &EngineSettings) -> Result<(String, Option<PathBuf>)> {
    let (content, output) = match command {
        Commands::Convert { io } => (edit_captions(io, settings, |_| Ok(()))?, io.output.clone()),
        Commands::Shift { io, delta_ms } => (
            edit_captions(io, settings, |editor| {
                Ok(editor.shift_all_captions(*delta_ms)?)
            })?,
            io.output.clone(),
        ),
        Commands::Stretch { io, factor } => (
            edit_captions(io, settings, |editor| Ok(editor.stretch_captions(*factor)?))?,
            io.output.clone(),
        ),
        Commands::Analyze { input, from, json } => {
            let format = files::resolve_format(from.as_deref(), input)?;
            let editor = files::load_editor(input, format, settings)?;
            (render_analysis(&editor, *json)?, None)
        }
        Commands::Censor { io, remove } => (
            edit_captions(io, settings, |editor| {
                let matches = editor.apply_profanity_filter(!*remove)?;
                info!(matches, "Profanity filter applied");
                Ok(())
            })?,
            io.output.clone(),
        ),
        Commands::Replace {
            io,
            find,
            replace,
            case_sensitive,
        } => (
            edit_captions(io, settings, |editor| {
                let count = editor.find_replace(find, replace, *case_sensitive)?;
                info!(count, "Replaced matches");
                Ok(())
            })?,
            io.output.clone(),
        ),
        Commands::Punctuate { io } => (
            edit_captions(io, settings, |editor| {
                let changed = editor.auto_punctuate()?;
                info!(changed, "Punctuated captions");
                Ok(())
            })?,
            io.output.clone(),
        ),
        Commands::Waveform {
            input,
            threshold,
            output,
        } => (render_waveform(input, *threshold, settings)?, output.clone()),
    };
    Ok((content, output))
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.settings.as_deref())?;
    debug!(?settings, "Loaded settings");

    let (content, output) = execute(&cli.command, &settings)?;
    files::write_output(&content, output.as_deref())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_dir.as_deref());
    run(cli)
}

//! Lacuna command-line entry point.
//!
//! Headless front-end over `lacuna-core`: load a recording, print the
//! detected phrase table, write the rebuilt WAV with stretched pauses.
//! Option values given on the command line are persisted to the settings
//! file, so they carry over to the next invocation.

mod settings;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lacuna_core::{analysis, AssemblyConfig, AudioDecoder, LacunaEngine, SymphoniaDecoder};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "lacuna", version)]
#[command(about = "Split a recording into phrases and rebuild it with stretched pauses")]
struct Cli {
    /// Settings file (defaults to the per-user data directory).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a recording and report amplitude range and silence-gap statistics
    Analyze {
        /// Input audio file (WAV, MP3, AAC, FLAC, OGG)
        input: PathBuf,
    },

    /// Detect phrases and print them
    Phrases {
        /// Input audio file
        input: PathBuf,

        /// Print the phrase list as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Minimum phrase length in seconds (1–30)
        #[arg(long)]
        min_phrase: Option<f64>,

        /// Minimum qualifying pause length in seconds
        #[arg(long)]
        min_silence: Option<f64>,

        /// Silence amplitude threshold
        #[arg(long)]
        threshold: Option<f32>,

        /// Derive detection settings from a stats pass first
        #[arg(long)]
        auto_tune: bool,
    },

    /// Rebuild the recording: phrases separated by pauses scaled to a
    /// percentage of each phrase's length
    Build {
        /// Input audio file
        input: PathBuf,

        /// Output WAV path
        #[arg(short, long, default_value = "lacuna-out.wav")]
        output: PathBuf,

        /// Pause length per phrase, percent of the phrase's duration (0–200)
        #[arg(long)]
        pause_percent: Option<f64>,

        /// Split phrases longer than this many seconds
        #[arg(long)]
        max_phrase: Option<f64>,

        /// Minimum phrase length in seconds (1–30)
        #[arg(long)]
        min_phrase: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(settings::default_settings_path);
    let mut app_settings = settings::load_settings(&settings_path);

    match cli.command {
        Commands::Analyze { input } => analyze(&input),
        Commands::Phrases {
            input,
            json,
            min_phrase,
            min_silence,
            threshold,
            auto_tune,
        } => {
            let mut changed = false;
            apply(&mut app_settings.min_phrase_duration, min_phrase, &mut changed);
            apply(&mut app_settings.min_silence_duration, min_silence, &mut changed);
            apply(&mut app_settings.silence_threshold, threshold, &mut changed);
            if auto_tune && !app_settings.auto_tune {
                app_settings.auto_tune = true;
                changed = true;
            }
            app_settings.normalize();
            persist(&settings_path, &app_settings, changed);

            phrases(&input, &app_settings, json)
        }
        Commands::Build {
            input,
            output,
            pause_percent,
            max_phrase,
            min_phrase,
        } => {
            let mut changed = false;
            apply(&mut app_settings.pause_percent, pause_percent, &mut changed);
            apply(&mut app_settings.min_phrase_duration, min_phrase, &mut changed);
            if max_phrase.is_some() && app_settings.max_phrase_duration != max_phrase {
                app_settings.max_phrase_duration = max_phrase;
                changed = true;
            }
            app_settings.normalize();
            persist(&settings_path, &app_settings, changed);

            build(&input, &output, &app_settings)
        }
    }
}

/// Override a setting from a command-line flag, tracking whether anything
/// actually changed.
fn apply<T: PartialEq + Copy>(slot: &mut T, value: Option<T>, changed: &mut bool) {
    if let Some(value) = value {
        if *slot != value {
            *slot = value;
            *changed = true;
        }
    }
}

fn persist(path: &std::path::Path, settings: &settings::AppSettings, changed: bool) {
    if !changed {
        return;
    }
    match settings::save_settings(path, settings) {
        Ok(()) => info!(path = %path.display(), "settings updated"),
        Err(e) => warn!("failed to persist settings: {e}"),
    }
}

fn load_engine(input: &std::path::Path, app_settings: &settings::AppSettings) -> Result<LacunaEngine> {
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let engine = LacunaEngine::new(app_settings.engine_config());
    engine
        .load(&bytes, &SymphoniaDecoder::new())
        .with_context(|| format!("decoding {}", input.display()))?;
    Ok(engine)
}

fn analyze(input: &std::path::Path) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let pcm = SymphoniaDecoder::new()
        .decode(&bytes)
        .with_context(|| format!("decoding {}", input.display()))?;

    let stats = analysis::analyze(
        &pcm,
        analysis::ANALYSIS_SILENCE_THRESHOLD,
        analysis::MAX_ANALYSIS_SECS,
    );

    println!("Duration:       {:.2} s", pcm.duration_secs());
    println!("Sample rate:    {} Hz", pcm.sample_rate());
    println!("Channels:       {}", pcm.channel_count());
    println!("Max amplitude:  {:.4}", stats.max_amplitude);
    println!("Min amplitude:  {:.4}", stats.min_amplitude);
    match (stats.min_silence_duration, stats.max_silence_duration) {
        (Some(min), Some(max)) => {
            println!("Shortest pause: {min:.2} s");
            println!("Longest pause:  {max:.2} s");
        }
        _ => println!("Pauses:         none detected"),
    }
    Ok(())
}

fn phrases(input: &std::path::Path, app_settings: &settings::AppSettings, json: bool) -> Result<()> {
    let engine = load_engine(input, app_settings)?;
    let phrases = engine.phrases();

    if phrases.is_empty() {
        println!(
            "No phrases found — try lowering the silence threshold or the minimum phrase length."
        );
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&phrases)?);
    } else {
        for (idx, phrase) in phrases.iter().enumerate() {
            println!(
                "{:>3}  {:7.2} s – {:7.2} s  ({:.2} s)",
                idx + 1,
                phrase.start,
                phrase.end,
                phrase.duration
            );
        }
    }
    Ok(())
}

fn build(
    input: &std::path::Path,
    output: &std::path::Path,
    app_settings: &settings::AppSettings,
) -> Result<()> {
    let engine = load_engine(input, app_settings)?;
    let phrases = engine.phrases();

    if phrases.is_empty() {
        println!(
            "No phrases found — try lowering the silence threshold or the minimum phrase length."
        );
        return Ok(());
    }

    let wav = engine.render(&AssemblyConfig {
        pause_percent: app_settings.pause_percent,
    })?;
    fs::write(output, &wav).with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Wrote {} ({} phrases, {:.0}% pauses)",
        output.display(),
        phrases.len(),
        app_settings.pause_percent
    );
    Ok(())
}

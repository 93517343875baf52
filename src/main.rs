// src/main.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colorful::Colorful;

use cardioscan::cli::{format_json, format_result};
use cardioscan::core::HeartSoundAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "cardioscan")]
#[command(about = "Screen heart sound recordings for abnormal cardiac cycles")]
struct Args {
    /// Input audio recording (wav, flac, mp3, ogg, ...)
    input: PathBuf,

    /// Feature scaler artifact (JSON)
    #[arg(short, long, env = "CARDIOSCAN_SCALER", default_value = "artifacts/scaler.json")]
    scaler: PathBuf,

    /// Classifier artifact (JSON)
    #[arg(short, long, env = "CARDIOSCAN_MODEL", default_value = "artifacts/model.json")]
    model: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show per-cycle scores
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let analyzer = HeartSoundAnalyzer::builder()
        .scaler_path(&args.scaler)
        .model_path(&args.model)
        .build()
        .context("failed to initialize analyzer")?;

    if args.format == OutputFormat::Text {
        println!("Analyzing: {}\n", args.input.display().to_string().cyan());
    }

    let result = analyzer
        .analyze_file(&args.input)
        .with_context(|| format!("failed to analyze {}", args.input.display()))?;

    match args.format {
        OutputFormat::Text => {
            let file = args.input.display().to_string();
            print!("{}", format_result(&result, &file, args.verbose));
        }
        OutputFormat::Json => println!("{}", format_json(&result)?),
    }

    Ok(())
}

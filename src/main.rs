use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use road_safety_rs::{Config, FrameInput, SafetyPipeline};

/// Score a dashcam detection stream.
///
/// Reads one JSON `FrameInput` per line and prints the run report as JSON.
#[derive(Debug, Parser)]
#[command(name = "road-safety", version)]
struct Args {
    /// JSON-lines detection stream, `-` for stdin
    input: PathBuf,

    /// YAML configuration; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also print one JSON summary per frame before the report
    #[arg(long)]
    frames: bool,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("road_safety_rs=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let reader: Box<dyn BufRead> = if args.input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut pipeline = SafetyPipeline::new(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameInput =
            serde_json::from_str(&line).with_context(|| format!("parsing frame on line {}", line_no + 1))?;
        let summary = pipeline.process_frame(frame)?;
        if args.frames {
            serde_json::to_writer(&mut out, &summary)?;
            writeln!(out)?;
        }
    }

    let report = pipeline.finish();
    info!(
        segments = report.segments.len(),
        frames = report.frames_processed,
        average_score = report.average_score,
        "run complete"
    );

    if args.pretty {
        serde_json::to_writer_pretty(&mut out, &report)?;
    } else {
        serde_json::to_writer(&mut out, &report)?;
    }
    writeln!(out)?;
    Ok(())
}

//! Generate a level and dump its map, summary and RNG log.
//!
//! With `--compare` or `--against`, the level is checked against a reference
//! trace or summary and a parity report is printed; the exit status is 1 when
//! the report fails.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use dgn_compare::snapshot::trace_from_log;
use dgn_compare::{
    LevelSummary, ParityReport, TraceParseError, compare_rng_traces, diff_summaries, parse_json_trace,
    parse_text_trace,
};
use dgn_core::{ConfigError, GenOptions, generate_level_with};
use dgn_rng::{format_text_log, write_jsonl_log};

/// Level generator dump tool
#[derive(Parser, Debug)]
#[command(name = "dgn-dump")]
#[command(author, version, about = "Generate a level and dump it", long_about = None)]
struct Args {
    /// Seed for the level's RNG stream
    #[arg(short = 's', long = "seed", default_value_t = 42)]
    seed: u64,

    /// Dungeon depth, 1 is the top level
    #[arg(short = 'd', long = "depth", default_value_t = 1, allow_negative_numbers = true)]
    depth: i32,

    /// Make every room an ordinary random room
    #[arg(long = "no-themes")]
    no_themes: bool,

    /// Generation options as JSON
    #[arg(long = "options")]
    options: Option<PathBuf>,

    /// Write the RNG call log as JSON lines
    #[arg(long = "rng-log")]
    rng_log: Option<PathBuf>,

    /// Print the RNG call log in text form after the map
    #[arg(long = "text-log")]
    text_log: bool,

    /// Print the level summary as JSON after the map
    #[arg(long = "summary")]
    summary: bool,

    /// Reference RNG trace (text, or JSON when the file starts with `{` or `[`)
    #[arg(long = "compare")]
    compare: Option<PathBuf>,

    /// Reference level summary as JSON
    #[arg(long = "against")]
    against: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum DumpError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{path}: {source}")]
    Trace {
        path: String,
        #[source]
        source: TraceParseError,
    },

    #[error("{path}: {source}")]
    Summary {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> DumpError + '_ {
    move |source| DumpError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn load_trace(path: &Path) -> Result<Vec<dgn_compare::TraceEntry>, DumpError> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    let parsed = if text.trim_start().starts_with(['{', '[']) {
        parse_json_trace(&text)
    } else {
        parse_text_trace(&text)
    };
    parsed.map_err(|source| DumpError::Trace {
        path: path.display().to_string(),
        source,
    })
}

fn run(args: &Args) -> Result<bool, DumpError> {
    let depth = GenOptions::check_depth(args.depth)?;
    let mut options = match &args.options {
        Some(path) => GenOptions::load(path)?,
        None => GenOptions::default(),
    };
    if args.no_themes {
        options.themes = None;
    }
    if args.rng_log.is_some() || args.text_log || args.compare.is_some() {
        options.log_rng = true;
    }

    let level = generate_level_with(args.seed, depth, &options);
    print!("{}", level.to_ascii());

    if let Some(path) = &args.rng_log {
        let file = File::create(path).map_err(io_error(path))?;
        write_jsonl_log(&level.rng_log, BufWriter::new(file)).map_err(io_error(path))?;
        tracing::info!(path = %path.display(), calls = level.rng_log.len(), "wrote RNG log");
    }
    if args.text_log {
        print!("{}", format_text_log(&level.rng_log));
    }

    let summary = LevelSummary::from_level(&level);
    if args.summary {
        println!("{}", summary.to_json()?);
    }

    if args.compare.is_none() && args.against.is_none() {
        return Ok(true);
    }

    let divergence = match &args.compare {
        Some(path) => compare_rng_traces(&trace_from_log(&level.rng_log), &load_trace(path)?),
        None => None,
    };
    let diffs = match &args.against {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(io_error(path))?;
            let reference = LevelSummary::from_json(&text).map_err(|source| DumpError::Summary {
                path: path.display().to_string(),
                source,
            })?;
            diff_summaries(&summary, &reference)
        }
        None => Vec::new(),
    };

    let mut report = ParityReport::new(format!("seed {} depth {}", args.seed, depth));
    report.add_level(args.seed, depth, diffs, divergence);
    eprint!("{}", report.render());
    if let Some(div) = report.first_divergence().and_then(|e| e.divergence.as_ref()) {
        eprint!("{}", div);
    }
    Ok(report.passed())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("dgn-dump: {}", e);
            ExitCode::from(2)
        }
    }
}

//! hoproute: CLI tool for reconstructing the physical path of a traceroute.
//!
//! Loads a ground exchange catalog and a submarine cable catalog, snaps
//! each hop of a geolocated trace onto that infrastructure, and plans a
//! plausible path between consecutive hops. Prints per-phase diagnostics
//! and can write the route as an SVG map or as a JSON segment list.
//! Useful for:
//!
//! - Checking how a catalog shapes reconstructed paths
//! - Tuning the ground-segment break threshold
//! - Rendering a trace for a quick visual sanity check
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin hoproute -- --ground <FILE> --cables <FILE> [OPTIONS] <TRACE>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser};
use hoproute_planner::{
    Clock, InfrastructureIndex, PlannerConfig, TracePoint, reconstruct_with_diagnostics,
};
use tracing_subscriber::EnvFilter;

/// Reconstruct plausible physical paths for traceroute hops.
///
/// Snaps each hop onto ground exchange points and submarine cable
/// landings, then links consecutive hops with ground lines and cable
/// rides. Prints per-phase timing and count diagnostics.
#[derive(Parser)]
#[command(name = "hoproute", version)]
struct Cli {
    /// Path to the trace file: a JSON array of `{"location": [lat, lon], "label": "..."}`.
    trace_path: PathBuf,

    /// Ground exchange catalog: a JSON object mapping names to `[lat, lon]`.
    #[arg(long)]
    ground: PathBuf,

    /// Submarine cable catalog: a JSON array of `{name, endpoints, geometry}`.
    #[arg(long)]
    cables: PathBuf,

    /// Longest ground line (in degrees) drawn without trying an intermediate point.
    #[arg(long, default_value_t = PlannerConfig::DEFAULT_BREAK_THRESHOLD)]
    break_threshold: f64,

    /// Planner recursion bound.
    #[arg(long, default_value_t = PlannerConfig::DEFAULT_MAX_DEPTH, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_depth: usize,

    /// Full planner config as a JSON string.
    ///
    /// When provided, the individual planner flags are ignored.
    /// The JSON must be a valid `PlannerConfig` serialization; missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Write an SVG map of the route to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the route segments as JSON to file.
    #[arg(long)]
    segments_json: Option<PathBuf>,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Build a [`PlannerConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual planner flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<PlannerConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PlannerConfig {
        break_threshold: cli.break_threshold,
        max_depth: cli.max_depth,
    })
}

/// Default log filter for a `-v` count.
const fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &Path) -> Result<String, String> {
    tracing::debug!(path = %path.display(), "reading input");
    std::fs::read_to_string(path).map_err(|e| format!("Error reading {}: {e}", path.display()))
}

fn load_trace(path: &Path) -> Result<Vec<TracePoint>, String> {
    let json = read_file(path)?;
    serde_json::from_str(&json).map_err(|e| format!("Error parsing trace {}: {e}", path.display()))
}

fn write_output(path: &Path, contents: &str, what: &str) -> Result<(), String> {
    std::fs::write(path, contents)
        .map_err(|e| format!("Error writing {what} to {}: {e}", path.display()))?;
    eprintln!(
        "{what} written to {} ({} bytes)",
        path.display(),
        contents.len(),
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let inputs = read_file(&cli.ground).and_then(|ground| {
        let cables = read_file(&cli.cables)?;
        let trace = load_trace(&cli.trace_path)?;
        Ok((ground, cables, trace))
    });
    let (ground_json, cables_json, trace) = match inputs {
        Ok(inputs) => inputs,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let index = match InfrastructureIndex::from_json(&ground_json, &cables_json) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("unable to build path: {e}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Trace: {} ({} hops)", cli.trace_path.display(), trace.len());
    eprintln!(
        "Index: {} locations, {} cables",
        index.len(),
        index.cables().len(),
    );
    eprintln!("Config: {config:?}");
    eprintln!();

    let (route, diagnostics) = match reconstruct_with_diagnostics(&index, &trace, &config, &StdClock)
    {
        Ok(result) => result,
        Err(e) => {
            eprintln!("unable to build path: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", diagnostics.report());
    }

    if let Some(ref svg_path) = cli.svg {
        let title = cli
            .trace_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("trace");
        let desc = format!(
            "{} hops, {} segments",
            route.markers.len(),
            route.segments.len(),
        );
        let config_json = serde_json::to_string(&config).ok();
        let metadata = hoproute_export::SvgMetadata {
            title: Some(title),
            description: Some(&desc),
            config_json: config_json.as_deref(),
        };
        let svg = hoproute_export::to_svg(&route, &metadata);
        if let Err(msg) = write_output(svg_path, &svg, "SVG") {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    }

    if let Some(ref segments_path) = cli.segments_json {
        let written = serde_json::to_string_pretty(&route.segments)
            .map_err(|e| format!("Error serializing segments: {e}"))
            .and_then(|json| write_output(segments_path, &json, "Segments"));
        if let Err(msg) = written {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

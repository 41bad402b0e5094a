//! # Graindeer
//!
//! Runs the grain/deer simulation and prints one tab-separated row per month.
//!
//! ## Usage
//!
//! ```bash
//! graindeer --config config/graindeer.toml --seed 7 --barrier parking
//! RUST_LOG=lockstep_sim=debug graindeer > months.tsv
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use lockstep_sim::{BarrierKind, MonthRecord, SimConfig, SimResult};
use tracing_subscriber::EnvFilter;

/// Command line overrides on top of the config file.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    barrier: Option<BarrierKind>,
    help: bool,
}

fn print_usage() {
    println!("Usage: graindeer [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>        TOML simulation config (default: built-in)");
    println!("  -s, --seed <SEED>          RNG seed, overrides the config");
    println!("  -b, --barrier <KIND>       spin | parking, overrides the config");
    println!("  -h, --help                 Show this help");
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();

    let mut i = 0;
    while i < args.len() {
        let value = || {
            args.get(i + 1)
                .ok_or_else(|| format!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "--config" | "-c" => {
                parsed.config = Some(PathBuf::from(value()?));
                i += 1;
            }
            "--seed" | "-s" => {
                let raw = value()?;
                parsed.seed = Some(raw.parse().map_err(|_| format!("invalid seed '{raw}'"))?);
                i += 1;
            }
            "--barrier" | "-b" => {
                parsed.barrier = Some(value()?.parse().map_err(|e| format!("{e}"))?);
                i += 1;
            }
            "--help" | "-h" => parsed.help = true,
            other => return Err(format!("unknown argument '{other}'")),
        }
        i += 1;
    }
    Ok(parsed)
}

fn run(args: &Args) -> SimResult<()> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            SimConfig::from_toml_file(path)?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(barrier) = args.barrier {
        config.barrier = barrier;
    }

    let outcome = lockstep_sim::run(&config)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{}", MonthRecord::TSV_HEADER)?;
    for row in &outcome.records {
        writeln!(out, "{row}")?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            print_usage();
            return ExitCode::from(2);
        }
    };
    if args.help {
        print_usage();
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

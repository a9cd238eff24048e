//! `plandigest`: decode compact plans captured from slow-query and general
//! logs back into readable trees.

mod decode;

use clap::{Parser, Subcommand};
use decode::{CliError, PlanKind, Summary, decode_lines};
use plandigest::Config;
use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "plandigest", version, about = "Decode compact query plans from logs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print each decoded tree as one JSON document per line.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file overriding codec limits.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

///
/// Command
///

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode encoded plans (`PD1`), one per line. Reads stdin without FILE.
    Decode { file: Option<PathBuf> },

    /// Decode normalized plan text (`PN1`), one per line.
    DecodeNormalized { file: Option<PathBuf> },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            debug!(failed = summary.failed, decoded = summary.decoded, "finished with bad lines");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(%err, "plandigest failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<Summary, CliError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    let (kind, file) = match &cli.command {
        Command::Decode { file } => (PlanKind::Concrete, file),
        Command::DecodeNormalized { file } => (PlanKind::Normalized, file),
    };

    let input: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|source| {
            CliError::Open {
                path: path.display().to_string(),
                source,
            }
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    decode_lines(
        input,
        &mut stdout.lock(),
        &mut stderr.lock(),
        kind,
        &config,
        cli.json,
    )
}

fn load_config(path: &Path) -> Result<Config, CliError> {
    let source = fs::read_to_string(path).map_err(|source| CliError::Open {
        path: path.display().to_string(),
        source,
    })?;

    Config::from_toml_str(&source).map_err(|source| CliError::Config {
        path: path.display().to_string(),
        source,
    })
}

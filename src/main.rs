use std::io::{self, BufWriter};
use std::path::PathBuf;

use allocscan::{ScanOptions, Scanner};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const LOG_ENV: &str = "ALLOCSCAN_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "allocscan",
    about = "Flag inconsistent pointer histories in an allocation event log"
)]
struct Cli {
    /// Log file to scan.
    log: PathBuf,

    /// Which log features to honour.
    #[arg(long, value_enum, default_value_t = Mode::Full)]
    mode: Mode,

    /// Skip the move-consistency check.
    #[arg(long)]
    no_move_check: bool,

    /// Log progress to stderr (overridden by ALLOCSCAN_LOG).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Test scopes and osunmap purges.
    Full,
    /// One report over the whole log.
    Plain,
    /// One report, balance check only.
    StatOnly,
}

impl Mode {
    fn options(self) -> ScanOptions {
        match self {
            Mode::Full => ScanOptions::full(),
            Mode::Plain => ScanOptions::plain(),
            Mode::StatOnly => ScanOptions::stat_only(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut options = cli.mode.options();
    if cli.no_move_check {
        options = options.with_move_check(false);
    }

    let scanner = Scanner::new(options);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    scanner
        .scan_path(&cli.log, &mut out)
        .with_context(|| format!("failed to scan {}", cli.log.display()))?;

    Ok(())
}

//! POWR Change CLI Application
//!
//! Reads a DataFlash log with the flight-log-decoder library and shows how the
//! power status flags changed over time:
//! - Pulls POWR records in log order
//! - Diffs each Flags mask against the previous record's
//! - Prints the set/cleared bits by MAV_POWER_STATUS name with a local timestamp

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use flight_log_decoder::{LogReader, ReaderConfig};
use std::io;
use std::path::{Path, PathBuf};

mod bit_names;
mod power;
mod report;
mod state;

use bit_names::BitNameTable;
use power::PowerStatusSource;

/// POWR Change - show how the power flags changed over time
#[derive(Parser, Debug)]
#[command(name = "powr-change")]
#[command(about = "Parse a log file and show how the power flags changed over time", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the DataFlash log (.bin or .log)
    #[arg(value_name = "LOG")]
    log: Option<PathBuf>,

    /// Verbosity level for diagnostics on stderr (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    let Some(log_path) = args.log else {
        Args::command().print_help()?;
        std::process::exit(1);
    };

    log::info!("POWR Change CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", flight_log_decoder::VERSION);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&log_path, &mut out)?;

    Ok(())
}

/// Open the log and report every flags change to `out`
fn run<W: io::Write>(log_path: &Path, out: &mut W) -> Result<usize> {
    report::progress(out, "Creating connection")?;

    let reader = LogReader::open(log_path, ReaderConfig::new())
        .with_context(|| format!("Failed to open log file: {:?}", log_path))?;
    log::debug!("Reading {:?} log {:?}", reader.kind(), log_path);

    report::report_changes(
        PowerStatusSource::new(reader),
        &BitNameTable::power_status(),
        out,
    )
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

//! CLI entry point.
//!
//! # Responsibility
//! - Without a subcommand, print a deterministic probe of core linkage.
//! - `shift` previews (and optionally commits) one renumbering shift against
//!   a ledger database file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docshift_core::db::open_db;
use docshift_core::{
    init_logging, LogSettings, RenumberSession, ShiftRequest, SqliteDocumentRepository,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

/// Bulk renumbering of ledger document numbers.
#[derive(Debug, Parser)]
#[command(name = "docshift_cli")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the core linkage probe (default)
    Ping,
    /// Preview a shift of `[start, end]` by `shift`, optionally committing it
    Shift(ShiftArgs),
}

#[derive(Debug, Args)]
struct ShiftArgs {
    /// Ledger database file
    db_path: PathBuf,

    /// Period whose documents are renumbered
    period: Uuid,

    /// First number of the source range
    start: i64,

    /// Last number of the source range
    end: i64,

    /// Signed offset added to every number in range
    #[arg(allow_negative_numbers = true)]
    shift: i64,

    /// Commit the shift when the preview allows it
    #[arg(long)]
    commit: bool,

    /// Directory for rolling log files; logging stays off when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error), defaults by build mode
    #[arg(long, requires = "log_dir")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    let result = match cli.command.unwrap_or(Command::Ping) {
        Command::Ping => ping(&mut stdout),
        Command::Shift(args) => run_shift(&args, &mut stdout),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn ping(out: &mut impl Write) -> Result<()> {
    writeln!(out, "docshift_core ping={}", docshift_core::ping())?;
    writeln!(out, "docshift_core version={}", docshift_core::core_version())?;
    Ok(())
}

fn run_shift(args: &ShiftArgs, out: &mut impl Write) -> Result<()> {
    if let Some(log_dir) = &args.log_dir {
        start_logging(log_dir, args.log_level.as_deref())?;
    }

    let conn = open_db(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;
    let repo = SqliteDocumentRepository::try_new(&conn)?;
    let mut session = RenumberSession::new(repo, args.period);

    let preview = session.update(ShiftRequest::new(args.start, args.end, args.shift))?;
    writeln!(out, "{}", serde_json::to_string_pretty(preview)?)?;

    if args.commit {
        let outcome = session.commit()?;
        writeln!(out, "committed: moved={}", outcome.moved)?;
    }
    Ok(())
}

fn start_logging(log_dir: &Path, level: Option<&str>) -> Result<()> {
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(log_dir)
    };
    let settings = match level {
        Some(level) => LogSettings::new(level, log_dir),
        None => LogSettings::with_default_level(log_dir),
    };
    init_logging(&settings)?;
    Ok(())
}

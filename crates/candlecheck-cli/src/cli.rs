//! CLI argument definitions.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Full gate run against the configured store |
//! | `resolve` | Print the day, token and key a run would check |
//! | `validate` | Validate a local CSV file |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--env-file` | `.env` if present | Dotenv file loaded before reading configuration |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! candlecheck run
//! candlecheck run --date 08.03.2024 --no-report
//! candlecheck resolve --pretty
//! candlecheck validate ./1709856000000.csv --expected 375
//! ```

use std::path::PathBuf;

use candlecheck_core::DEFAULT_EXPECTED_COUNT;
use clap::{Args, Parser, Subcommand};

/// Daily quality gate for candle exports.
#[derive(Debug, Parser)]
#[command(
    name = "candlecheck",
    author,
    version,
    about = "Daily quality gate for candle exports in object storage"
)]
pub struct Cli {
    /// Dotenv file to load instead of `./.env`.
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the previous business day's export and notify on failure.
    ///
    /// Exits 0 on pass, 3-9 according to the verdict.
    Run(RunArgs),

    /// Resolve the check date without touching the store.
    Resolve(ResolveArgs),

    /// Validate a local CSV export. Never notifies.
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Explicit checking date (DD.MM.YYYY); overrides CANDLECHECK_CHECKING_DATE.
    #[arg(long, value_name = "DD.MM.YYYY")]
    pub date: Option<String>,

    /// Do not write or upload the report log.
    #[arg(long, default_value_t = false)]
    pub no_report: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    #[arg(long, value_name = "DD.MM.YYYY")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to the CSV file.
    pub path: PathBuf,

    /// Expected record count.
    #[arg(long, default_value_t = DEFAULT_EXPECTED_COUNT)]
    pub expected: usize,
}

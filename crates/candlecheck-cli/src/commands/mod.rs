mod resolve;
mod run;
mod validate;

use std::process::ExitCode;

use candlecheck_core::{RecordDefect, RunVerdict};
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    match &cli.command {
        Command::Run(args) => run::run(args, cli.pretty).await,
        Command::Resolve(args) => resolve::run(args, cli.pretty),
        Command::Validate(args) => validate::run(args, cli.pretty).await,
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

pub const fn verdict_exit_code(verdict: &RunVerdict) -> u8 {
    match verdict {
        RunVerdict::Passed { .. } => 0,
        RunVerdict::ArtifactMissing => 3,
        RunVerdict::Rejected { defect } => match defect {
            RecordDefect::SizeMismatch { .. } => 4,
            RecordDefect::BlankRecord { .. } => 5,
            RecordDefect::OutOfOrder { .. } => 6,
            RecordDefect::UnparsableValue { .. } => 7,
        },
        RunVerdict::Unreadable { .. } => 8,
        RunVerdict::TransferFailed { .. } => 9,
    }
}

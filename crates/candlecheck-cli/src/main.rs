mod cli;
mod commands;
mod error;
mod logging;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(%error, "run aborted");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    load_env(cli.env_file.as_deref())?;
    commands::run(&cli).await
}

fn load_env(path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => dotenvy::from_path(path).map_err(|error| CliError::EnvFile {
            path: path.display().to_string(),
            message: error.to_string(),
        }),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    }
}

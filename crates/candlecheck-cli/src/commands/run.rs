use std::process::ExitCode;

use candlecheck_core::{Gate, GateConfig};
use chrono::Utc;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::logging;

use super::{print_json, verdict_exit_code};

pub async fn run(args: &RunArgs, pretty: bool) -> Result<ExitCode, CliError> {
    let config = GateConfig::from_env()?.with_checking_date(args.date.clone());

    let report_log = if args.no_report {
        None
    } else {
        let started = Utc::now().with_timezone(&config.time_zone);
        Some(config.report_log.path_at(&started))
    };
    logging::init(report_log.as_deref())?;

    let gate = match report_log {
        Some(path) => Gate::from_config(config).with_report_log(path),
        None => Gate::from_config(config),
    };

    let report = gate.run().await?;
    print_json(&report, pretty)?;
    Ok(ExitCode::from(verdict_exit_code(&report.verdict)))
}

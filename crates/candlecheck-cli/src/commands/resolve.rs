use std::process::ExitCode;

use candlecheck_core::{resolve_check_date, GateConfig};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::cli::ResolveArgs;
use crate::error::CliError;
use crate::logging;

use super::print_json;

#[derive(Debug, Serialize)]
struct Resolution {
    date: NaiveDate,
    epoch_millis: i64,
    overridden: bool,
    token: String,
    key: String,
}

pub fn run(args: &ResolveArgs, pretty: bool) -> Result<ExitCode, CliError> {
    logging::init(None)?;
    let config = GateConfig::from_env()?.with_checking_date(args.date.clone());

    let day = resolve_check_date(&config.business_day_request(Utc::now()))?;
    let token = config.file_token(&day);
    let resolution = Resolution {
        date: day.date,
        epoch_millis: day.epoch_millis,
        overridden: day.overridden,
        key: config.artifact_key(&token),
        token,
    };

    print_json(&resolution, pretty)?;
    Ok(ExitCode::SUCCESS)
}

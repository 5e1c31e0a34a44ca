use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use candlecheck_core::{read_rows, RecordValidator, RunVerdict};
use serde::Serialize;

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::logging;

use super::{print_json, verdict_exit_code};

#[derive(Debug, Serialize)]
struct FileCheck {
    path: PathBuf,
    expected: usize,
    verdict: RunVerdict,
}

pub async fn run(args: &ValidateArgs, pretty: bool) -> Result<ExitCode, CliError> {
    logging::init(None)?;

    let verdict = check_file(&args.path, RecordValidator::new(args.expected)).await?;
    let code = verdict_exit_code(&verdict);
    print_json(
        &FileCheck {
            path: args.path.clone(),
            expected: args.expected,
            verdict,
        },
        pretty,
    )?;
    Ok(ExitCode::from(code))
}

async fn check_file(path: &Path, validator: RecordValidator) -> Result<RunVerdict, CliError> {
    let body = match tokio::fs::read(path).await {
        Ok(body) => body,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(RunVerdict::ArtifactMissing),
        Err(error) => return Err(error.into()),
    };

    let rows = match read_rows(body.as_slice()) {
        Ok(rows) => rows,
        Err(error) => {
            return Ok(RunVerdict::Unreadable {
                reason: error.to_string(),
            })
        }
    };

    let verdict = match validator.validate(&rows).defect() {
        None => RunVerdict::Passed { rows: rows.len() },
        Some(defect) => RunVerdict::Rejected {
            defect: defect.clone(),
        },
    };
    tracing::info!(path = %path.display(), ?verdict, "local file checked");
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use candlecheck_core::RecordDefect;

    use super::*;

    #[tokio::test]
    async fn missing_file_is_reported_as_missing_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let verdict = check_file(&dir.path().join("absent.csv"), RecordValidator::new(3))
            .await
            .expect("check");
        assert_eq!(verdict, RunVerdict::ArtifactMissing);
    }

    #[tokio::test]
    async fn ascending_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "1,a\n2,b\n3,c\n").expect("write");

        let verdict = check_file(&path, RecordValidator::new(3)).await.expect("check");

        assert_eq!(
            verdict,
            RunVerdict::Rejected {
                defect: RecordDefect::OutOfOrder { index: 0 }
            }
        );
    }
}

use candlecheck_core::{CalendarError, ConfigError, GateError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
///
/// Verdict codes (3-9) are not errors; see [`crate::commands::verdict_exit_code`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot load env file '{path}': {message}")]
    EnvFile { path: String, message: String },

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<GateError> for CliError {
    fn from(error: GateError) -> Self {
        match error {
            GateError::Calendar(error) => Self::Calendar(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::EnvFile { .. } => 2,
            Self::Calendar(CalendarError::InvalidDateFormat { .. }) => 10,
            Self::Calendar(CalendarError::NoBusinessDay { .. }) => 11,
            Self::Logging(_) | Self::Serialization(_) | Self::Io(_) => 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn calendar_errors_have_distinct_codes() {
        let invalid = CliError::from(GateError::Calendar(CalendarError::InvalidDateFormat {
            value: String::from("2024-03-11"),
        }));
        let exhausted = CliError::from(CalendarError::NoBusinessDay {
            from: NaiveDate::from_ymd_opt(2024, 3, 10).expect("date"),
            lookback: 6,
        });

        assert_eq!(invalid.exit_code(), 10);
        assert_eq!(exhausted.exit_code(), 11);
    }

    #[test]
    fn config_errors_exit_with_two() {
        let error = CliError::from(ConfigError::Missing {
            key: candlecheck_core::config::BUCKET,
        });
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "CANDLECHECK_BUCKET is required");
    }
}

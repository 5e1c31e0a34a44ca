use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

/// Date-resolution failures. Both abort a run before any artifact lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("checking date must match DD.MM.YYYY: '{value}'")]
    InvalidDateFormat { value: String },

    #[error("cannot resolve business day: every day within {lookback} days before {from} is a weekend day")]
    NoBusinessDay { from: NaiveDate, lookback: u32 },
}

/// Configuration errors raised while building a [`crate::GateConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required")]
    Missing { key: &'static str },

    #[error("{key} has invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        key: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Artifact store failures (lookup, download, upload).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("store request for '{key}' failed: {message}")]
    Request { key: String, message: String },

    #[error("local file '{path}' is not accessible: {message}")]
    LocalFile { path: String, message: String },

    #[error("key '{key}' is not a valid artifact key")]
    InvalidKey { key: String },
}

impl TransferError {
    pub fn request(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Request {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn local_file(path: &Path, error: std::io::Error) -> Self {
        Self::LocalFile {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

/// Notification delivery failures. Logged by the gate, never escalated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("webhook returned status {status} after {attempts} attempt(s)")]
    Status { status: u16, attempts: u32 },

    #[error("webhook transport error after {attempts} attempt(s): {message}")]
    Transport { message: String, attempts: u32 },
}

/// Fatal gate errors. Data-quality findings are reported through
/// [`crate::RunVerdict`] instead.
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

//! Structural and ordering checks for a downloaded candle export.
//!
//! Validation is fail-fast: the first defect found is the only one reported,
//! matching the one-notification-per-run contract of the gate.

use serde::Serialize;
use thiserror::Error;

use crate::{CsvRow, RowKeyError};

/// Record count a daily export must contain unless configured otherwise.
pub const DEFAULT_EXPECTED_COUNT: usize = 375;

/// First defect found in an export.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordDefect {
    #[error("expected {expected} records, found {actual}")]
    SizeMismatch { actual: usize, expected: usize },

    #[error("record {index} has a blank timestamp")]
    BlankRecord { index: usize },

    #[error("record {index} is not strictly greater than the record after it")]
    OutOfOrder { index: usize },

    #[error("record {index} has a non-integer timestamp '{raw_value}'")]
    UnparsableValue { index: usize, raw_value: String },
}

/// Result of a full validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Pass,
    Fail(RecordDefect),
}

impl ValidationOutcome {
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub const fn defect(&self) -> Option<&RecordDefect> {
        match self {
            Self::Pass => None,
            Self::Fail(defect) => Some(defect),
        }
    }
}

impl From<Result<(), RecordDefect>> for ValidationOutcome {
    fn from(value: Result<(), RecordDefect>) -> Self {
        match value {
            Ok(()) => Self::Pass,
            Err(defect) => Self::Fail(defect),
        }
    }
}

/// Checks an export's row count and strict descending key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordValidator {
    expected_count: usize,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new(DEFAULT_EXPECTED_COUNT)
    }
}

impl RecordValidator {
    pub const fn new(expected_count: usize) -> Self {
        Self { expected_count }
    }

    /// Exact equality; both short and long exports fail.
    pub fn check_size(&self, rows: &[CsvRow]) -> Result<(), RecordDefect> {
        tracing::debug!(actual = rows.len(), expected = self.expected_count, "checking record count");
        if rows.len() != self.expected_count {
            return Err(RecordDefect::SizeMismatch {
                actual: rows.len(),
                expected: self.expected_count,
            });
        }
        Ok(())
    }

    /// Every adjacent pair must satisfy `current > next`.
    ///
    /// A blank key takes precedence over parsing and ordering for its pair.
    /// Fewer than two rows pass vacuously; gate on [`Self::check_size`] too.
    pub fn check_descending(&self, rows: &[CsvRow]) -> Result<(), RecordDefect> {
        for (index, pair) in rows.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);

            if current.is_blank() {
                tracing::debug!(index, "record is blank");
                return Err(RecordDefect::BlankRecord { index });
            }
            if next.is_blank() {
                tracing::debug!(index = index + 1, "record is blank");
                return Err(RecordDefect::BlankRecord { index: index + 1 });
            }

            let current_key = key_at(current, index)?;
            let next_key = key_at(next, index + 1)?;
            if current_key <= next_key {
                return Err(RecordDefect::OutOfOrder { index });
            }
        }
        Ok(())
    }

    /// Size first, then ordering.
    pub fn validate(&self, rows: &[CsvRow]) -> ValidationOutcome {
        self.check_size(rows)
            .and_then(|()| self.check_descending(rows))
            .into()
    }
}

fn key_at(row: &CsvRow, index: usize) -> Result<i64, RecordDefect> {
    row.key().map_err(|error| match error {
        RowKeyError::Blank => RecordDefect::BlankRecord { index },
        RowKeyError::Unparsable { raw } => RecordDefect::UnparsableValue {
            index,
            raw_value: raw,
        },
    })
}

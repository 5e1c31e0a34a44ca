//! # Domain Types
//!
//! Value types shared by the date resolver and the record validator.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CsvRow`] | One export record; field 0 is the timestamp key |
//! | [`RowKeyError`] | Blank vs. unparsable timestamp key |
//! | [`WeekendDays`] | Weekdays excluded from business-day resolution |

mod row;
mod weekend;

pub use row::{read_rows, CsvRow, RowKeyError};
pub use weekend::WeekendDays;

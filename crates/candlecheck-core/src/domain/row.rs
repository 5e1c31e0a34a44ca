use std::io::Read;

use thiserror::Error;

/// Why a row's first field could not be used as a timestamp key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowKeyError {
    #[error("timestamp field is blank")]
    Blank,
    #[error("timestamp field '{raw}' is not a 64-bit integer")]
    Unparsable { raw: String },
}

/// One CSV record. Only the first field carries meaning: an integer
/// timestamp that must strictly decrease from row to row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: Vec<String>,
}

impl CsvRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn from_record(record: &csv::StringRecord) -> Self {
        record.iter().map(str::to_owned).collect()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn first_field(&self) -> Option<&str> {
        self.fields.first().map(String::as_str)
    }

    /// Missing or whitespace-only first field.
    pub fn is_blank(&self) -> bool {
        self.first_field()
            .map_or(true, |value| value.trim().is_empty())
    }

    /// First field as a timestamp key. The raw text is parsed without
    /// trimming, so padded values are reported as unparsable.
    pub fn key(&self) -> Result<i64, RowKeyError> {
        if self.is_blank() {
            return Err(RowKeyError::Blank);
        }

        let raw = self.first_field().unwrap_or_default();
        raw.parse::<i64>().map_err(|_| RowKeyError::Unparsable {
            raw: raw.to_owned(),
        })
    }
}

impl From<Vec<String>> for CsvRow {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

impl<S: Into<String>> FromIterator<S> for CsvRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Read every record of a header-less, comma-separated export.
///
/// Records may have different field counts. Lines with no content at all
/// are not records and are skipped by the reader.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CsvRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(CsvRow::from_record(&record?));
    }
    Ok(rows)
}

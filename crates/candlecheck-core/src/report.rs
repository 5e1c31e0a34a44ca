//! Naming of the per-run report log that is uploaded after a passing run.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use chrono_tz::Tz;

const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLogSettings {
    pub dir: PathBuf,
    /// File name; `{timestamp}` is replaced by the run start time.
    pub file_pattern: String,
    /// chrono strftime pattern for `{timestamp}`.
    pub timestamp_format: String,
}

impl Default for ReportLogSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_pattern: String::from("candlecheck-{timestamp}.log"),
            timestamp_format: String::from("%Y-%m-%d_%H-%M-%S"),
        }
    }
}

impl ReportLogSettings {
    /// Log path for a run started at `now` (already in the configured zone).
    pub fn path_at(&self, now: &DateTime<Tz>) -> PathBuf {
        let mut stamp = String::new();
        if write!(stamp, "{}", now.format(&self.timestamp_format)).is_err() {
            stamp = now.format("%Y-%m-%d_%H-%M-%S").to_string();
        }
        self.dir
            .join(self.file_pattern.replace(TIMESTAMP_PLACEHOLDER, &stamp))
    }
}

/// Upload destination for the report log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTarget {
    pub bucket: String,
    pub folder: String,
}

impl ReportTarget {
    /// Key of `path` under this target's folder, by file name.
    pub fn key_for(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        Some(crate::store::join_key(&self.folder, name))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamp_placeholder_uses_zone_local_time() {
        let now = chrono_tz::Asia::Kolkata
            .with_ymd_and_hms(2024, 3, 11, 6, 30, 5)
            .single()
            .expect("valid local time");
        let path = ReportLogSettings::default().path_at(&now);
        assert_eq!(path, PathBuf::from("logs/candlecheck-2024-03-11_06-30-05.log"));
    }

    #[test]
    fn report_key_is_file_name_under_folder() {
        let target = ReportTarget {
            bucket: String::from("reports"),
            folder: String::from("candle-validation"),
        };
        assert_eq!(
            target.key_for(Path::new("logs/candlecheck-1.log")).as_deref(),
            Some("candle-validation/candlecheck-1.log")
        );
    }
}

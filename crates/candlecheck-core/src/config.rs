//! Typed gate configuration.
//!
//! Built once per process from a key lookup (normally the environment,
//! after `.env` loading) and passed by reference to every component.
//! Blank values count as absent.
//!
//! | Env Var | Default |
//! |---------|---------|
//! | `CANDLECHECK_TIME_ZONE` | `UTC` |
//! | `CANDLECHECK_WEEKEND` | `Sat,Sun` |
//! | `CANDLECHECK_CHECKING_DATE` | unset |
//! | `CANDLECHECK_MAX_LOOKBACK_DAYS` | `6` |
//! | `CANDLECHECK_EXPECTED_COUNT` | `375` |
//! | `CANDLECHECK_FILE_EXTENSION` | `.csv` |
//! | `CANDLECHECK_FILE_TOKEN` | `epoch-millis` |
//! | `CANDLECHECK_BUCKET` | required for S3 |
//! | `CANDLECHECK_FOLDER` | empty |
//! | `CANDLECHECK_LOCAL_STORE_DIR` | unset (S3) |
//! | `CANDLECHECK_S3_ENDPOINT` | unset |
//! | `CANDLECHECK_S3_REGION` | `us-east-1` |
//! | `CANDLECHECK_S3_ACCESS_KEY` | required for S3 |
//! | `CANDLECHECK_S3_SECRET_KEY` | required for S3 |
//! | `CANDLECHECK_REPORT_BUCKET` | unset (no upload) |
//! | `CANDLECHECK_REPORT_FOLDER` | empty |
//! | `CANDLECHECK_SLACK_WEBHOOK` | unset (log only) |
//! | `CANDLECHECK_WEBHOOK_TIMEOUT_MS` | `5000` |
//! | `CANDLECHECK_WEBHOOK_MAX_RETRIES` | `2` |
//! | `CANDLECHECK_MSG_*` | built-in templates |
//! | `CANDLECHECK_LOG_DIR` | `logs` |
//! | `CANDLECHECK_LOG_FILE_PATTERN` | `candlecheck-{timestamp}.log` |
//! | `CANDLECHECK_LOG_TIMESTAMP_FORMAT` | `%Y-%m-%d_%H-%M-%S` |

use std::fmt::Write;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::calendar::{BusinessDayRequest, FileTokenFormat, ResolvedDay, DEFAULT_MAX_LOOKBACK_DAYS};
use crate::message::{MessageContext, MessageTemplates};
use crate::report::{ReportLogSettings, ReportTarget};
use crate::s3::{S3Settings, DEFAULT_REGION};
use crate::store::artifact_key;
use crate::validator::{RecordValidator, DEFAULT_EXPECTED_COUNT};
use crate::{ConfigError, WeekendDays};

pub const TIME_ZONE: &str = "CANDLECHECK_TIME_ZONE";
pub const WEEKEND: &str = "CANDLECHECK_WEEKEND";
pub const CHECKING_DATE: &str = "CANDLECHECK_CHECKING_DATE";
pub const MAX_LOOKBACK_DAYS: &str = "CANDLECHECK_MAX_LOOKBACK_DAYS";
pub const EXPECTED_COUNT: &str = "CANDLECHECK_EXPECTED_COUNT";
pub const FILE_EXTENSION: &str = "CANDLECHECK_FILE_EXTENSION";
pub const FILE_TOKEN: &str = "CANDLECHECK_FILE_TOKEN";
pub const BUCKET: &str = "CANDLECHECK_BUCKET";
pub const FOLDER: &str = "CANDLECHECK_FOLDER";
pub const LOCAL_STORE_DIR: &str = "CANDLECHECK_LOCAL_STORE_DIR";
pub const S3_ENDPOINT: &str = "CANDLECHECK_S3_ENDPOINT";
pub const S3_REGION: &str = "CANDLECHECK_S3_REGION";
pub const S3_ACCESS_KEY: &str = "CANDLECHECK_S3_ACCESS_KEY";
pub const S3_SECRET_KEY: &str = "CANDLECHECK_S3_SECRET_KEY";
pub const REPORT_BUCKET: &str = "CANDLECHECK_REPORT_BUCKET";
pub const REPORT_FOLDER: &str = "CANDLECHECK_REPORT_FOLDER";
pub const SLACK_WEBHOOK: &str = "CANDLECHECK_SLACK_WEBHOOK";
pub const WEBHOOK_TIMEOUT_MS: &str = "CANDLECHECK_WEBHOOK_TIMEOUT_MS";
pub const WEBHOOK_MAX_RETRIES: &str = "CANDLECHECK_WEBHOOK_MAX_RETRIES";
pub const MSG_MISSING: &str = "CANDLECHECK_MSG_MISSING";
pub const MSG_SIZE: &str = "CANDLECHECK_MSG_SIZE";
pub const MSG_BLANK: &str = "CANDLECHECK_MSG_BLANK";
pub const MSG_ORDER: &str = "CANDLECHECK_MSG_ORDER";
pub const MSG_UNPARSABLE: &str = "CANDLECHECK_MSG_UNPARSABLE";
pub const MSG_UNREADABLE: &str = "CANDLECHECK_MSG_UNREADABLE";
pub const MSG_PASSED: &str = "CANDLECHECK_MSG_PASSED";
pub const LOG_DIR: &str = "CANDLECHECK_LOG_DIR";
pub const LOG_FILE_PATTERN: &str = "CANDLECHECK_LOG_FILE_PATTERN";
pub const LOG_TIMESTAMP_FORMAT: &str = "CANDLECHECK_LOG_TIMESTAMP_FORMAT";

/// Where exports are read from and reports written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    S3(S3Settings),
    Local(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    pub url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub time_zone: Tz,
    pub weekend: WeekendDays,
    pub checking_date: Option<String>,
    pub max_lookback_days: u32,
    pub expected_count: usize,
    pub file_extension: String,
    pub file_token: FileTokenFormat,
    pub bucket: String,
    pub folder: String,
    pub store: StoreBackend,
    pub report: Option<ReportTarget>,
    pub webhook: Option<WebhookSettings>,
    pub templates: MessageTemplates,
    pub report_log: ReportLogSettings,
}

impl GateConfig {
    /// Defaults everywhere, reading exports from a local directory.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            time_zone: chrono_tz::UTC,
            weekend: WeekendDays::default(),
            checking_date: None,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
            expected_count: DEFAULT_EXPECTED_COUNT,
            file_extension: String::from(".csv"),
            file_token: FileTokenFormat::EpochMillis,
            bucket: String::new(),
            folder: String::new(),
            store: StoreBackend::Local(root.into()),
            report: None,
            webhook: None,
            templates: MessageTemplates::default(),
            report_log: ReportLogSettings::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let time_zone = match get(TIME_ZONE) {
            Some(value) => Tz::from_str(&value)
                .map_err(|_| ConfigError::invalid(TIME_ZONE, &value, "unknown IANA time zone"))?,
            None => chrono_tz::UTC,
        };

        let file_token = match get(FILE_TOKEN) {
            Some(value) => FileTokenFormat::parse(&value).ok_or_else(|| {
                ConfigError::invalid(FILE_TOKEN, &value, "expected epoch-millis or date:<pattern>")
            })?,
            None => FileTokenFormat::EpochMillis,
        };

        let bucket = get(BUCKET).unwrap_or_default();
        let store = match get(LOCAL_STORE_DIR) {
            Some(dir) => StoreBackend::Local(PathBuf::from(dir)),
            None => {
                if bucket.is_empty() {
                    return Err(ConfigError::Missing { key: BUCKET });
                }
                StoreBackend::S3(S3Settings {
                    endpoint: get(S3_ENDPOINT),
                    region: get(S3_REGION).unwrap_or_else(|| String::from(DEFAULT_REGION)),
                    access_key: get(S3_ACCESS_KEY).ok_or(ConfigError::Missing { key: S3_ACCESS_KEY })?,
                    secret_key: get(S3_SECRET_KEY).ok_or(ConfigError::Missing { key: S3_SECRET_KEY })?,
                })
            }
        };

        let report = get(REPORT_BUCKET).map(|bucket| ReportTarget {
            bucket,
            folder: get(REPORT_FOLDER).unwrap_or_default(),
        });

        let webhook = match get(SLACK_WEBHOOK) {
            Some(url) => Some(WebhookSettings {
                url,
                timeout_ms: parse_number(WEBHOOK_TIMEOUT_MS, get(WEBHOOK_TIMEOUT_MS), 5_000)?,
                max_retries: parse_number(WEBHOOK_MAX_RETRIES, get(WEBHOOK_MAX_RETRIES), 2)?,
            }),
            None => None,
        };

        let defaults = MessageTemplates::default();
        let templates = MessageTemplates {
            missing: get(MSG_MISSING).unwrap_or(defaults.missing),
            size_mismatch: get(MSG_SIZE).unwrap_or(defaults.size_mismatch),
            blank_record: get(MSG_BLANK).unwrap_or(defaults.blank_record),
            out_of_order: get(MSG_ORDER).unwrap_or(defaults.out_of_order),
            unparsable: get(MSG_UNPARSABLE).unwrap_or(defaults.unparsable),
            unreadable: get(MSG_UNREADABLE).unwrap_or(defaults.unreadable),
            passed: get(MSG_PASSED),
        };

        let log_defaults = ReportLogSettings::default();
        let timestamp_format = get(LOG_TIMESTAMP_FORMAT).unwrap_or(log_defaults.timestamp_format);
        if !renders_datetime(&timestamp_format) {
            return Err(ConfigError::invalid(
                LOG_TIMESTAMP_FORMAT,
                timestamp_format,
                "not a valid strftime pattern",
            ));
        }
        let report_log = ReportLogSettings {
            dir: get(LOG_DIR).map(PathBuf::from).unwrap_or(log_defaults.dir),
            file_pattern: get(LOG_FILE_PATTERN).unwrap_or(log_defaults.file_pattern),
            timestamp_format,
        };

        Ok(Self {
            time_zone,
            weekend: get(WEEKEND)
                .map(|value| WeekendDays::parse(&value))
                .unwrap_or_default(),
            checking_date: get(CHECKING_DATE),
            max_lookback_days: parse_number(
                MAX_LOOKBACK_DAYS,
                get(MAX_LOOKBACK_DAYS),
                DEFAULT_MAX_LOOKBACK_DAYS,
            )?,
            expected_count: parse_number(EXPECTED_COUNT, get(EXPECTED_COUNT), DEFAULT_EXPECTED_COUNT)?,
            file_extension: get(FILE_EXTENSION).unwrap_or_else(|| String::from(".csv")),
            file_token,
            bucket,
            folder: get(FOLDER).unwrap_or_default(),
            store,
            report,
            webhook,
            templates,
            report_log,
        })
    }

    /// Replace the configured checking date, e.g. from a CLI flag.
    pub fn with_checking_date(mut self, checking_date: Option<String>) -> Self {
        if checking_date.is_some() {
            self.checking_date = checking_date;
        }
        self
    }

    pub fn business_day_request(&self, now: DateTime<Utc>) -> BusinessDayRequest {
        let request = BusinessDayRequest::new(now, self.time_zone)
            .with_weekend(self.weekend)
            .with_max_lookback(self.max_lookback_days);
        match &self.checking_date {
            Some(date) => request.with_override(date.clone()),
            None => request,
        }
    }

    pub fn validator(&self) -> RecordValidator {
        RecordValidator::new(self.expected_count)
    }

    pub fn file_token(&self, day: &ResolvedDay) -> String {
        self.file_token.render(day)
    }

    pub fn artifact_key(&self, token: &str) -> String {
        artifact_key(&self.folder, token, &self.file_extension)
    }

    pub fn message_context(&self, day: &ResolvedDay, token: &str) -> MessageContext {
        MessageContext {
            file: format!("{token}{}", self.file_extension),
            key: self.artifact_key(token),
            date: day.date.format("%d.%m.%Y").to_string(),
            bucket: self.bucket.clone(),
            folder: self.folder.clone(),
        }
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::invalid(key, raw, "expected a non-negative integer")),
        None => Ok(default),
    }
}

fn renders_datetime(pattern: &str) -> bool {
    let mut rendered = String::new();
    write!(rendered, "{}", Utc::now().format(pattern)).is_ok()
}

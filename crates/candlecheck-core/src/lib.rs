//! # Candlecheck Core
//!
//! Daily quality gate for candle (OHLC) exports kept in object storage.
//!
//! ## Overview
//!
//! A run resolves the most recent business day before "today" in a
//! configured time zone, derives the export's store key from that day,
//! and checks the export:
//!
//! - **Presence** of the object under the configured folder
//! - **Record count** against the expected number of candles
//! - **Strictly descending** integer timestamps in the first column
//!
//! The first failure produces exactly one notification. A passing run
//! uploads its report log to the report bucket.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`calendar`] | Business-day resolution and file tokens |
//! | [`config`] | Environment-driven [`GateConfig`] |
//! | [`domain`] | CSV rows and weekend sets |
//! | [`error`] | Error types |
//! | [`gate`] | Run orchestration |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`message`] | Notification templates |
//! | [`notifier`] | Log and Slack webhook notifiers |
//! | [`report`] | Report log naming and upload target |
//! | [`retry`] | Retry policy for webhook delivery |
//! | [`s3`] | S3-compatible artifact store |
//! | [`store`] | Artifact store contract, local and in-memory stores |
//! | [`validator`] | Record count and ordering checks |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use candlecheck_core::{Gate, GateConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gate = Gate::from_config(GateConfig::from_env()?);
//!     let report = gate.run().await?;
//!     println!("{}", serde_json::to_string(&report)?);
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod domain;
pub mod error;
pub mod gate;
pub mod http_client;
pub mod message;
pub mod notifier;
pub mod report;
pub mod retry;
pub mod s3;
pub mod store;
pub mod validator;

pub use calendar::{
    local_midnight, parse_check_date, resolve_check_date, BusinessDayRequest, FileTokenFormat,
    ResolvedDay, DEFAULT_MAX_LOOKBACK_DAYS,
};
pub use config::{GateConfig, StoreBackend, WebhookSettings};
pub use domain::{read_rows, CsvRow, RowKeyError, WeekendDays};
pub use error::{CalendarError, ConfigError, GateError, NotifyError, TransferError};
pub use gate::{Gate, RunReport, RunVerdict};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, RecordingHttpClient, ReqwestHttpClient,
};
pub use message::{MessageContext, MessageTemplates, NotificationMessage};
pub use notifier::{LogNotifier, Notifier, SlackWebhookNotifier};
pub use report::{ReportLogSettings, ReportTarget};
pub use retry::{Backoff, RetryConfig};
pub use s3::{S3ArtifactStore, S3Settings};
pub use store::{ArtifactStore, LocalArtifactStore, MemoryArtifactStore};
pub use validator::{RecordDefect, RecordValidator, ValidationOutcome, DEFAULT_EXPECTED_COUNT};

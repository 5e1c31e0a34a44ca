//! One validation run: resolve the day, locate and fetch the export,
//! validate it, notify on failure and upload the report on success.
//!
//! ```text
//! resolve ──▶ exists? ──no──▶ notify(missing)
//!                │yes
//!                ▼
//!            download ──▶ parse ──err──▶ notify(unreadable)
//!                           │
//!                           ▼
//!                      check_size ──fail──▶ notify(defect)
//!                           │pass
//!                           ▼
//!                   check_descending ──fail──▶ notify(defect)
//!                           │pass
//!                           ▼
//!                     upload report
//! ```
//!
//! Calendar errors abort before any lookup. Store failures end the run with
//! [`RunVerdict::TransferFailed`]. Notification failures are logged only.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::calendar::resolve_check_date;
use crate::config::{GateConfig, StoreBackend};
use crate::message::{MessageContext, NotificationMessage};
use crate::notifier::{LogNotifier, Notifier, SlackWebhookNotifier};
use crate::report::ReportTarget;
use crate::retry::RetryConfig;
use crate::s3::S3ArtifactStore;
use crate::store::{ArtifactStore, LocalArtifactStore};
use crate::{read_rows, GateError, RecordDefect};

/// Final state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunVerdict {
    Passed { rows: usize },
    ArtifactMissing,
    Unreadable { reason: String },
    Rejected { defect: RecordDefect },
    TransferFailed { message: String },
}

impl RunVerdict {
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub date: NaiveDate,
    pub epoch_millis: i64,
    pub token: String,
    pub key: String,
    pub verdict: RunVerdict,
    /// A notification was handed to the notifier and accepted.
    pub notified: bool,
    pub report_uploaded: bool,
}

pub struct Gate {
    config: GateConfig,
    store: Arc<dyn ArtifactStore>,
    report_store: Option<Arc<dyn ArtifactStore>>,
    notifier: Arc<dyn Notifier>,
    report_log: Option<PathBuf>,
}

impl Gate {
    pub fn new(config: GateConfig, store: Arc<dyn ArtifactStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            store,
            report_store: None,
            notifier,
            report_log: None,
        }
    }

    /// Wire the production collaborators described by `config`.
    ///
    /// S3 reports go to the report bucket on the same endpoint. A local
    /// backend writes reports under `<root>/<report bucket>/`.
    pub fn from_config(config: GateConfig) -> Self {
        let (store, report_store): (Arc<dyn ArtifactStore>, Option<Arc<dyn ArtifactStore>>) =
            match &config.store {
                StoreBackend::S3(settings) => {
                    let source = S3ArtifactStore::new(settings, config.bucket.clone());
                    let report = config
                        .report
                        .as_ref()
                        .map(|target| Arc::new(source.for_bucket(target.bucket.clone())) as Arc<dyn ArtifactStore>);
                    (Arc::new(source) as Arc<dyn ArtifactStore>, report)
                }
                StoreBackend::Local(root) => {
                    let report = config.report.as_ref().map(|target| {
                        Arc::new(LocalArtifactStore::new(root.join(&target.bucket))) as Arc<dyn ArtifactStore>
                    });
                    (Arc::new(LocalArtifactStore::new(root)) as Arc<dyn ArtifactStore>, report)
                }
            };

        let notifier: Arc<dyn Notifier> = match &config.webhook {
            Some(webhook) => Arc::new(
                SlackWebhookNotifier::new(webhook.url.clone())
                    .with_timeout_ms(webhook.timeout_ms)
                    .with_retry(RetryConfig::exponential(webhook.max_retries)),
            ),
            None => Arc::new(LogNotifier),
        };

        let gate = Self::new(config, store, notifier);
        match report_store {
            Some(report_store) => gate.with_report_store(report_store),
            None => gate,
        }
    }

    pub fn with_report_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.report_store = Some(store);
        self
    }

    /// Local log file uploaded as the run report after a pass.
    pub fn with_report_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_log = Some(path.into());
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<RunReport, GateError> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport, GateError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("gate_run", %run_id);
        self.execute(run_id, now).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid, now: DateTime<Utc>) -> Result<RunReport, GateError> {
        let day = resolve_check_date(&self.config.business_day_request(now))?;
        let token = self.config.file_token(&day);
        let key = self.config.artifact_key(&token);
        let context = self.config.message_context(&day, &token);
        tracing::info!(date = %day.date, %key, "checking export");

        let verdict = self.check(&key).await;
        let notified = match self.message_for(&verdict, &context) {
            Some(message) => self.send(&message).await,
            None => false,
        };

        let report_uploaded = if verdict.is_pass() {
            self.upload_report().await
        } else {
            false
        };

        tracing::info!(?verdict, notified, report_uploaded, "run finished");
        Ok(RunReport {
            run_id,
            date: day.date,
            epoch_millis: day.epoch_millis,
            token,
            key,
            verdict,
            notified,
            report_uploaded,
        })
    }

    async fn check(&self, key: &str) -> RunVerdict {
        match self.store.exists(key).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(key, "export not found");
                return RunVerdict::ArtifactMissing;
            }
            Err(error) => {
                tracing::error!(%error, "export lookup failed");
                return RunVerdict::TransferFailed {
                    message: error.to_string(),
                };
            }
        }

        let body = match self.store.download(key).await {
            Ok(body) => body,
            Err(error) => {
                tracing::error!(%error, "export download failed");
                return RunVerdict::TransferFailed {
                    message: error.to_string(),
                };
            }
        };
        tracing::info!(bytes = body.len(), "export downloaded");

        let rows = match read_rows(body.as_slice()) {
            Ok(rows) => rows,
            Err(error) => {
                tracing::warn!(%error, "export is not readable CSV");
                return RunVerdict::Unreadable {
                    reason: error.to_string(),
                };
            }
        };
        tracing::info!(rows = rows.len(), "export parsed");

        let validator = self.config.validator();
        let result = validator
            .check_size(&rows)
            .and_then(|()| validator.check_descending(&rows));
        match result {
            Ok(()) => {
                tracing::info!(rows = rows.len(), "export passed validation");
                RunVerdict::Passed { rows: rows.len() }
            }
            Err(defect) => {
                tracing::warn!(%defect, "export failed validation");
                RunVerdict::Rejected { defect }
            }
        }
    }

    fn message_for(&self, verdict: &RunVerdict, context: &MessageContext) -> Option<NotificationMessage> {
        let templates = &self.config.templates;
        match verdict {
            RunVerdict::Passed { rows } => templates.passed(context, *rows),
            RunVerdict::ArtifactMissing => Some(templates.missing(context)),
            RunVerdict::Unreadable { reason } => Some(templates.unreadable(context, reason)),
            RunVerdict::Rejected { defect } => Some(templates.defect(context, defect)),
            RunVerdict::TransferFailed { .. } => None,
        }
    }

    async fn send(&self, message: &NotificationMessage) -> bool {
        match self.notifier.notify(message).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "notification was not delivered");
                false
            }
        }
    }

    async fn upload_report(&self) -> bool {
        let (Some(store), Some(target), Some(path)) =
            (&self.report_store, &self.config.report, &self.report_log)
        else {
            tracing::debug!("report upload not configured");
            return false;
        };

        let Some(key) = ReportTarget::key_for(target, path) else {
            tracing::warn!(path = %path.display(), "report log has no usable file name");
            return false;
        };

        match store.upload(path, &key).await {
            Ok(()) => {
                tracing::info!(%key, "report uploaded");
                true
            }
            Err(error) => {
                tracing::warn!(%error, "report upload failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("config", &self.config)
            .field("report_log", &self.report_log)
            .finish_non_exhaustive()
    }
}

//! Outbound notification delivery.
//!
//! Delivery is best-effort: the gate logs a [`NotifyError`] and carries on.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::{NotificationMessage, NotifyError};

pub trait Notifier: Send + Sync {
    fn notify<'a>(
        &'a self,
        message: &'a NotificationMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;
}

/// Writes notifications to the log. Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify<'a>(
        &'a self,
        message: &'a NotificationMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::warn!(message = %message, "notification (no webhook configured)");
            Ok(())
        })
    }
}

/// Posts `{"text": ...}` to a Slack incoming webhook.
#[derive(Clone)]
pub struct SlackWebhookNotifier {
    webhook_url: String,
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    timeout_ms: u64,
}

impl SlackWebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_http_client(webhook_url, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(webhook_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            http_client,
            retry: RetryConfig::default(),
            timeout_ms: 5_000,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn deliver(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        let payload = serde_json::json!({ "text": message.as_str() });
        let mut retries = 0;

        loop {
            let attempts = retries + 1;
            let request = HttpRequest::post_json(&self.webhook_url, &payload)
                .with_timeout_ms(self.timeout_ms);

            let (failure, transient) = match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => {
                    tracing::info!(attempts, response = %response.body, "notification sent to webhook");
                    return Ok(());
                }
                Ok(response) => {
                    tracing::warn!(attempts, status = response.status, "webhook rejected notification");
                    let transient = self.retry.should_retry_status(response.status);
                    let failure = NotifyError::Status {
                        status: response.status,
                        attempts,
                    };
                    (failure, transient)
                }
                Err(error) => {
                    tracing::warn!(attempts, error = %error, "webhook transport error");
                    let transient = self.retry.should_retry_error(&error);
                    let failure = NotifyError::Transport {
                        message: error.message().to_owned(),
                        attempts,
                    };
                    (failure, transient)
                }
            };

            match self.retry.next_delay(retries, transient) {
                Some(pause) => tokio::time::sleep(pause).await,
                None => return Err(failure),
            }
            retries += 1;
        }
    }
}

impl std::fmt::Debug for SlackWebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The webhook URL embeds its secret; keep it out of logs.
        f.debug_struct("SlackWebhookNotifier")
            .field("retry", &self.retry)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl Notifier for SlackWebhookNotifier {
    fn notify<'a>(
        &'a self,
        message: &'a NotificationMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(self.deliver(message))
    }
}

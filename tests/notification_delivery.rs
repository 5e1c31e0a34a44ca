//! Behavior tests for Slack webhook delivery.
//!
//! The webhook transport is scripted so retries and payloads can be
//! observed without network access.

use std::sync::Arc;
use std::time::Duration;

use candlecheck_core::{
    HttpError, HttpResponse, NotificationMessage, Notifier, NotifyError, RecordingHttpClient,
    RetryConfig, SlackWebhookNotifier,
};

const WEBHOOK: &str = "https://hooks.slack.example/services/T000/B000/XXXX";

fn notifier(client: Arc<RecordingHttpClient>, max_retries: u32) -> SlackWebhookNotifier {
    SlackWebhookNotifier::with_http_client(WEBHOOK, client)
        .with_retry(RetryConfig::fixed(Duration::ZERO, max_retries))
        .with_timeout_ms(1_500)
}

#[tokio::test]
async fn when_a_message_is_sent_slack_receives_a_text_payload() {
    // Given: A webhook that accepts everything
    let client = Arc::new(RecordingHttpClient::new());
    let notifier = notifier(client.clone(), 2);

    // When: A message is sent
    notifier
        .notify(&NotificationMessage::new("Candle file 1.csv was not found"))
        .await
        .expect("delivered");

    // Then: One JSON POST with a `text` field hits the webhook
    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, WEBHOOK);
    assert_eq!(requests[0].timeout_ms, 1_500);
    let payload: serde_json::Value = serde_json::from_str(&requests[0].body).expect("json body");
    assert_eq!(payload, serde_json::json!({ "text": "Candle file 1.csv was not found" }));
}

#[tokio::test]
async fn when_slack_is_briefly_unavailable_delivery_is_retried() {
    // Given: Two transient failures before success
    let client = Arc::new(RecordingHttpClient::with_responses(vec![
        Ok(HttpResponse::new(503, "unavailable")),
        Err(HttpError::new("connection reset")),
        Ok(HttpResponse::new(200, "ok")),
    ]));
    let notifier = notifier(client.clone(), 2);

    // When: A message is sent
    let result = notifier.notify(&NotificationMessage::new("retry me")).await;

    // Then: The third attempt succeeds
    assert!(result.is_ok());
    assert_eq!(client.requests().len(), 3);
}

#[tokio::test]
async fn when_retries_are_exhausted_the_last_status_is_reported() {
    // Given: A webhook that keeps failing with 500
    let client = Arc::new(RecordingHttpClient::with_responses(vec![
        Ok(HttpResponse::new(500, "boom")),
        Ok(HttpResponse::new(500, "boom")),
    ]));
    let notifier = notifier(client.clone(), 1);

    // When: A message is sent
    let err = notifier
        .notify(&NotificationMessage::new("doomed"))
        .await
        .expect_err("must fail");

    // Then: Both attempts are counted
    assert_eq!(
        err,
        NotifyError::Status {
            status: 500,
            attempts: 2
        }
    );
}

#[tokio::test]
async fn when_slack_rejects_the_request_it_is_not_retried() {
    // Given: A revoked webhook
    let client = Arc::new(RecordingHttpClient::with_responses(vec![Ok(HttpResponse::new(
        404,
        "no_service",
    ))]));
    let notifier = notifier(client.clone(), 3);

    // When: A message is sent
    let err = notifier
        .notify(&NotificationMessage::new("lost"))
        .await
        .expect_err("must fail");

    // Then: A single attempt is made
    assert_eq!(
        err,
        NotifyError::Status {
            status: 404,
            attempts: 1
        }
    );
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn when_the_request_cannot_be_built_it_fails_immediately() {
    // Given: A transport error marked non-retryable
    let client = Arc::new(RecordingHttpClient::with_responses(vec![Err(
        HttpError::non_retryable("invalid request: bad url"),
    )]));
    let notifier = notifier(client.clone(), 3);

    // When: A message is sent
    let err = notifier
        .notify(&NotificationMessage::new("x"))
        .await
        .expect_err("must fail");

    // Then: The transport error is surfaced after one attempt
    assert!(matches!(err, NotifyError::Transport { attempts: 1, .. }));
}

#[test]
fn webhook_url_is_not_printed_in_debug_output() {
    let notifier = SlackWebhookNotifier::with_http_client(WEBHOOK, Arc::new(RecordingHttpClient::new()));
    assert!(!format!("{notifier:?}").contains("B000"));
}

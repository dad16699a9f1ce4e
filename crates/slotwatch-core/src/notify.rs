//! Notification channels for matched sessions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::cowin::MatchedSession;
use crate::error::NotifyError;

/// Delivers one matched session. Returning `Ok` means the session may be
/// marked as seen.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Unique identifier (e.g. "log", "webhook").
    fn name(&self) -> &str;

    async fn notify(&self, session: &MatchedSession) -> Result<(), NotifyError>;
}

/// Writes each match as a structured log line.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, session: &MatchedSession) -> Result<(), NotifyError> {
        tracing::info!(
            session_id = session.session_id(),
            center = %session.display_name,
            vaccine = %session.session.vaccine,
            capacity = session.session.available_capacity,
            "slot available: {}",
            session.full_address
        );
        Ok(())
    }
}

/// Posts a message to a Discord-compatible webhook.
pub struct WebhookNotifier {
    webhook_url: String,
    client: Client,
}

impl WebhookNotifier {
    /// Build a notifier whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(webhook_url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::DeliveryFailed {
                channel: "webhook".to_string(),
                message: format!("client setup failed: {e}"),
            })?;
        Ok(Self {
            webhook_url: webhook_url.to_string(),
            client,
        })
    }

    fn failed(&self, message: String) -> NotifyError {
        NotifyError::DeliveryFailed {
            channel: self.name().to_string(),
            message,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, session: &MatchedSession) -> Result<(), NotifyError> {
        if self.webhook_url.is_empty() {
            return Err(NotifyError::NotConfigured {
                channel: self.name().to_string(),
            });
        }

        let body = json!({ "content": session.summary() });
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            Err(self.failed(format!("HTTP {status}: {text}")))
        }
    }
}

/// Fans out to several channels; succeeds only if every channel did.
///
/// Channels run in order and the first failure stops the fan-out, so
/// channels ahead of a failing one (the log line) repeat when the session
/// is retried on the next cycle.
pub struct MultiNotifier {
    channels: Vec<Box<dyn Notifier>>,
}

impl MultiNotifier {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    fn name(&self) -> &str {
        "multi"
    }

    async fn notify(&self, session: &MatchedSession) -> Result<(), NotifyError> {
        for channel in &self.channels {
            channel.notify(session).await?;
        }
        Ok(())
    }
}

/// Log channel plus a webhook when one is configured.
///
/// `timeout` bounds each webhook request.
pub fn from_config(
    config: &crate::storage::config::NotifyConfig,
    timeout: Duration,
) -> Result<MultiNotifier, NotifyError> {
    let mut channels: Vec<Box<dyn Notifier>> = vec![Box::new(LogNotifier)];
    if let Some(url) = config.webhook_url.as_deref().filter(|u| !u.is_empty()) {
        channels.push(Box::new(WebhookNotifier::new(url, timeout)?));
    }
    Ok(MultiNotifier::new(channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cowin::{Center, Session};
    use serde_json::Map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn webhook(url: &str) -> WebhookNotifier {
        WebhookNotifier::new(url, TIMEOUT).unwrap()
    }

    struct CountingNotifier {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        fn name(&self) -> &str {
            "counting"
        }

        async fn notify(&self, _session: &MatchedSession) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotifyError::DeliveryFailed {
                    channel: "counting".into(),
                    message: "down".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn matched() -> MatchedSession {
        let center = Center {
            name: "X".into(),
            address: "123 St".into(),
            district: "D".into(),
            state: "S".into(),
            sessions: vec![Session {
                session_id: "s1".into(),
                min_age_limit: 18,
                vaccine: "COVAXIN".into(),
                available_capacity: 4,
                extra: Map::new(),
            }],
        };
        MatchedSession::from_center(&center, &center.sessions[0])
    }

    #[tokio::test]
    async fn webhook_posts_summary() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(mockito::Matcher::PartialJson(json!({
                "content": "4 slots of COVAXIN (age 18+) on ? at X -- 123 St, D, S"
            })))
            .with_status(204)
            .create_async()
            .await;

        let notifier = webhook(&format!("{}/hook", server.url()));
        notifier.notify(&matched()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn webhook_error_status_is_delivery_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let notifier = webhook(&format!("{}/hook", server.url()));
        let err = notifier.notify(&matched()).await.unwrap_err();
        assert!(matches!(err, NotifyError::DeliveryFailed { ref message, .. } if message.contains("boom")));
    }

    #[tokio::test]
    async fn empty_webhook_is_not_configured() {
        let err = webhook("").notify(&matched()).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn webhook_gives_up_on_silent_endpoint() {
        let url = crate::test_support::silent_server_url().await;
        let notifier = WebhookNotifier::new(&url, Duration::from_secs(1)).unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(5), notifier.notify(&matched()))
            .await
            .expect("webhook request should time out on its own");
        assert!(matches!(
            outcome,
            Err(NotifyError::DeliveryFailed { ref channel, .. }) if channel == "webhook"
        ));
    }

    #[tokio::test]
    async fn multi_stops_at_first_failure() {
        let calls: Vec<Arc<AtomicUsize>> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let multi = MultiNotifier::new(
            [false, true, false]
                .iter()
                .zip(&calls)
                .map(|(&fail, calls)| {
                    Box::new(CountingNotifier {
                        calls: Arc::clone(calls),
                        fail,
                    }) as Box<dyn Notifier>
                })
                .collect(),
        );

        assert!(multi.notify(&matched()).await.is_err());
        assert!(multi.notify(&matched()).await.is_err());
        let counts: Vec<usize> = calls.iter().map(|c| c.load(Ordering::SeqCst)).collect();
        assert_eq!(counts, vec![2, 2, 0]);
    }

    #[test]
    fn from_config_adds_webhook_only_when_set() {
        let mut config = crate::storage::config::NotifyConfig::default();
        assert_eq!(from_config(&config, TIMEOUT).unwrap().channels.len(), 1);
        config.webhook_url = Some("https://discord.com/api/webhooks/1/x".into());
        assert_eq!(from_config(&config, TIMEOUT).unwrap().channels.len(), 2);
    }
}

//! Outbound notification channel
//!
//! Single pre-configured destination. The Telegram implementation posts to
//! the Bot API `sendMessage` endpoint; a non-success status is an error so
//! the scan loop can decide whether the alert actually reached the channel.

use crate::config::TelegramConfig;
use crate::error::{Result, ScannerError};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Capability consumed by the scan loop to deliver alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: "https://api.telegram.org".to_string(),
            token: config.token,
            chat_id: config.chat_id,
        })
    }

    /// Point the notifier at a different host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScannerError::Notification {
                message: format!("Telegram API returned status {}", response.status()),
            });
        }

        debug!("Delivered {} byte notification", text.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_notifier(base_url: &str) -> TelegramNotifier {
        TelegramNotifier::new(
            TelegramConfig {
                token: "test-token".to_string(),
                chat_id: "42".to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn send_posts_chat_id_and_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bottest-token/sendMessage")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "chat_id": "42",
                "text": "scanner online",
            })))
            .with_status(200)
            .with_body("{\"ok\": true}")
            .create_async()
            .await;

        test_notifier(&server.url())
            .send("scanner online")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bottest-token/sendMessage")
            .with_status(401)
            .create_async()
            .await;

        let result = test_notifier(&server.url()).send("hello").await;
        assert!(matches!(result, Err(ScannerError::Notification { .. })));
    }
}

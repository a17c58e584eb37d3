//! Chat notification transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PollerError, Result};

/// Sends text messages to the tracked chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text`. Success means the chat API accepted the message.
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API notifier bound to one chat.
pub struct TelegramNotifier {
    send_url: String,
    chat_id: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // send_url embeds the bot token
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// Creates a notifier posting through `api_url` with `token` into `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns `PollerError::Transport` if the HTTP client cannot be built.
    pub fn new(
        api_url: &str,
        token: &str,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            send_url: format!("{}/bot{token}/sendMessage", api_url.trim_end_matches('/')),
            chat_id: chat_id.into(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(&self.send_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PollerError::notify(e.without_url().to_string()))?;

        let status = response.status();
        let body: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| PollerError::notify(format!("status {status}: {}", e.without_url())))?;

        if !status.is_success() || !body.ok {
            let reason = body
                .description
                .unwrap_or_else(|| "no description".to_string());
            return Err(PollerError::notify(format!("status {status}: {reason}")));
        }

        tracing::debug!("Message sent");
        Ok(())
    }
}

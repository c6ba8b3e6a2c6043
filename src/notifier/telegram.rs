//! Telegram Bot API transport.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::TelegramSettings;
use crate::notifier::traits::Messenger;

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const PARSE_MODE: &str = "Markdown";

/// Sends messages to one chat through a bot
pub struct TelegramMessenger {
    client: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct SendPhoto<'a> {
    chat_id: &'a str,
    photo: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramMessenger {
    pub fn new(settings: &TelegramSettings) -> Result<Self> {
        Self::with_api_url(settings, DEFAULT_API_URL)
    }

    pub fn with_api_url(settings: &TelegramSettings, api_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: settings.bot_token.clone(),
            chat_id: settings.chat_id.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    async fn call<T: Serialize + Sync>(&self, method: &str, body: &T) -> Result<()> {
        debug!("Calling Telegram {}", method);

        // Request errors carry the URL, which contains the bot token.
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Failed to reach Telegram for {method}"))?;

        let status = response.status();
        let reply: ApiReply = response
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Unreadable Telegram reply to {method} ({status})"))?;

        check_reply(method, reply)
    }
}

fn check_reply(method: &str, reply: ApiReply) -> Result<()> {
    if !reply.ok {
        let reason = reply.description.unwrap_or_else(|| "no description".to_string());
        warn!("Telegram rejected {}: {}", method, reason);
        bail!("Telegram rejected {method}: {reason}");
    }
    Ok(())
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: PARSE_MODE,
            disable_web_page_preview: true,
        };
        self.call("sendMessage", &body).await
    }

    async fn send_photo(&self, photo_url: &str, caption: Option<&str>) -> Result<()> {
        let body = SendPhoto {
            chat_id: &self.chat_id,
            photo: photo_url,
            caption,
            parse_mode: caption.map(|_| PARSE_MODE),
        };
        self.call("sendPhoto", &body).await
    }
}

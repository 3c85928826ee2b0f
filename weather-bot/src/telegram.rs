//! Minimal Telegram Bot API client: long polling and `sendMessage`.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use weather_core::{InboundMessage, MessageSink, OutboundReply, ParseMode};

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
}

// The token is a credential; keep it out of logs.
impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct TgResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    chat: TgChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
}

impl Update {
    /// `None` for updates that are not chat messages (edits, callbacks, ...).
    pub fn into_inbound(self) -> Option<InboundMessage> {
        self.message.map(|m| InboundMessage {
            chat_id: m.chat.id,
            text: m.text,
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

impl TelegramClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/bot{}/{method}", self.token)
    }

    /// Long-poll for updates with `update_id >= offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let request = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ]);

        self.call(request, "getUpdates").await
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder, method: &str) -> Result<T> {
        // reqwest errors carry the URL, and the URL carries the token.
        let res = request
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to send Telegram {method} request"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to read Telegram {method} response body"))?;

        let parsed: TgResponse<T> = serde_json::from_str(&body).with_context(|| {
            format!("Failed to parse Telegram {method} response (status {status})")
        })?;

        if !status.is_success() || !parsed.ok {
            return Err(anyhow!(
                "Telegram {method} failed with status {status}: {}",
                parsed.description.as_deref().unwrap_or("no description"),
            ));
        }

        parsed
            .result
            .ok_or_else(|| anyhow!("Telegram {method} response contained no result"))
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    async fn send(&self, reply: &OutboundReply, cancel: &CancellationToken) -> Result<()> {
        let parse_mode = match reply.mode {
            ParseMode::MarkdownV2 => Some("MarkdownV2"),
            ParseMode::Plain => None,
        };
        let payload = SendMessageRequest {
            chat_id: reply.chat_id,
            text: &reply.text,
            parse_mode,
        };

        debug!(chat_id = reply.chat_id, ?parse_mode, "Sending message");
        let request = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&payload);

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(anyhow!("sendMessage cancelled")),
            sent = self.call::<serde_json::Value>(request, "sendMessage") => sent.map(|_| ()),
        }
    }
}

//! Classifies inbound chat text and produces the reply.
//!
//! Text starting with `/` is a command and gets a canned answer. Anything else
//! non-blank is treated as a city name and runs through [`WeatherService`].
//! Lookup failures become a single escaped warning line; they never escape
//! the router.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    channel::MessageSink,
    error::LookupError,
    format::format_error,
    model::{InboundMessage, OutboundReply, ParseMode},
    service::WeatherService,
};

/// Plain-text line sent when something outside the lookup taxonomy fails.
pub const UNEXPECTED_ERROR_TEXT: &str = "Ошибка: не удалось обработать сообщение";

const WELCOME_TEXT: &str = "Добро пожаловать\\! Отправьте мне название города 🌤";
const HELP_TEXT: &str =
    "Помощь:\nПросто отправьте название города на любом языке\nПример: _Москва_ или _London_";
const UNKNOWN_COMMAND_TEXT: &str = "Неизвестная команда 🤔";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Unknown,
}

impl Command {
    /// `None` if `text` is not a command at all.
    pub fn parse(text: &str) -> Option<Self> {
        if !text.starts_with('/') {
            return None;
        }

        let word = text.split_whitespace().next().unwrap_or_default();
        // "/help@SomeBot" is how Telegram addresses a command in group chats.
        let word = word.split('@').next().unwrap_or_default().to_lowercase();

        Some(match word.as_str() {
            "/start" => Command::Start,
            "/help" => Command::Help,
            _ => Command::Unknown,
        })
    }

    /// Canned MarkdownV2-safe reply.
    pub fn reply_text(self) -> &'static str {
        match self {
            Command::Start => WELCOME_TEXT,
            Command::Help => HELP_TEXT,
            Command::Unknown => UNKNOWN_COMMAND_TEXT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    service: WeatherService,
}

impl Router {
    pub fn new(service: WeatherService) -> Self {
        Self { service }
    }

    /// Reply for `message`, or `None` if nothing should be sent.
    pub async fn route(
        &self,
        message: &InboundMessage,
        cancel: &CancellationToken,
    ) -> Option<OutboundReply> {
        let chat_id = message.chat_id;
        let text = message.text.as_deref()?;
        if text.trim().is_empty() {
            return None;
        }

        if let Some(command) = Command::parse(text) {
            info!(chat_id, ?command, "Command received");
            return Some(OutboundReply::markdown(chat_id, command.reply_text()));
        }

        info!(chat_id, text, "City received");

        match self.service.report(text, cancel).await {
            Ok(report) => Some(OutboundReply::markdown(chat_id, report)),
            Err(LookupError::Cancelled) => {
                debug!(chat_id, "Lookup cancelled, not replying");
                None
            }
            Err(err) => {
                warn!(chat_id, error = %err, "Weather lookup failed");
                Some(OutboundReply::markdown(chat_id, format_error(&err)))
            }
        }
    }

    /// Route `message` and send the reply through `sink`.
    ///
    /// A rejected MarkdownV2 reply is followed by a plain-text error line.
    /// Send failures are logged, never returned.
    pub async fn dispatch(
        &self,
        sink: &dyn MessageSink,
        message: &InboundMessage,
        cancel: &CancellationToken,
    ) {
        let Some(reply) = self.route(message, cancel).await else {
            return;
        };

        let Err(err) = sink.send(&reply, cancel).await else {
            return;
        };
        if cancel.is_cancelled() {
            return;
        }

        error!(chat_id = reply.chat_id, error = %format!("{err:#}"), "Failed to send reply");
        if reply.mode == ParseMode::Plain {
            return;
        }

        let fallback = OutboundReply::plain(reply.chat_id, UNEXPECTED_ERROR_TEXT);
        if let Err(err) = sink.send(&fallback, cancel).await {
            error!(
                chat_id = reply.chat_id,
                error = %format!("{err:#}"),
                "Failed to send fallback error message"
            );
        }
    }
}

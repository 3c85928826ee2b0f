use serde::{Deserialize, Serialize};

/// A place returned by the geocoding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// Current conditions at a location. Wind speed is in meters per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub relative_humidity: u8,
    pub wind_speed: f64,
    pub apparent_temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    /// `None` for messages without a text body (stickers, photos, ...).
    pub text: Option<String>,
}

impl InboundMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: Some(text.into()),
        }
    }
}

/// How the receiving channel should render a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Telegram MarkdownV2; all dynamic text must go through `format::escape`.
    MarkdownV2,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub chat_id: i64,
    pub text: String,
    pub mode: ParseMode,
}

impl OutboundReply {
    pub fn markdown(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            mode: ParseMode::MarkdownV2,
        }
    }

    pub fn plain(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            mode: ParseMode::Plain,
        }
    }
}

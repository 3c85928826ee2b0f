//! Core library for the Telegram weather bot.
//!
//! This crate defines:
//! - Configuration handling
//! - City name normalization and the Open-Meteo lookup (geocoding, then forecast)
//! - MarkdownV2 reply formatting
//! - Command routing and the outbound channel abstraction
//!
//! It is used by `weather-bot`, but the router and providers can be driven by any channel.

pub mod channel;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod router;
pub mod service;

pub use channel::MessageSink;
pub use config::{Config, OpenMeteoConfig, TelegramConfig};
pub use error::LookupError;
pub use model::{CurrentWeather, GeoLocation, InboundMessage, OutboundReply, ParseMode};
pub use provider::{GeoResolver, OpenMeteoProvider, WeatherFetcher};
pub use router::{Command, Router, UNEXPECTED_ERROR_TEXT};
pub use service::WeatherService;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use weather_core::{Config, InboundMessage, OpenMeteoProvider, Router, WeatherService};

use crate::{poller::Poller, telegram::TelegramClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-bot", version, about = "Telegram weather bot")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the bot and serve messages until Ctrl+C.
    Run,

    /// Store the Telegram bot token in the config file.
    Configure,

    /// Print the reply the bot would send for a message, without Telegram.
    Lookup {
        /// City name (or a command such as /help).
        #[arg(required = true)]
        text: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let config = Config::load_from(&path)?;

        match self.command {
            Command::Run => serve(config).await,
            Command::Configure => configure(config, &path),
            Command::Lookup { text } => lookup(config, &text.join(" ")).await,
        }
    }
}

/// Router backed by Open-Meteo, sharing `http` as its connection pool.
fn build_router(http: reqwest::Client, config: &Config) -> Router {
    let provider = Arc::new(OpenMeteoProvider::new(http, config.open_meteo.clone()));
    Router::new(WeatherService::new(provider.clone(), provider))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let token = config.bot_token()?;
    let http = reqwest::Client::new();

    let router = Arc::new(build_router(http.clone(), &config));
    let api_base_url = &config.telegram.api_base_url;
    let telegram = Arc::new(TelegramClient::new(http, api_base_url, token));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "Unable to listen for Ctrl+C");
                return;
            }
            info!("Shutdown requested");
            cancel.cancel();
        }
    });

    info!(version = env!("CARGO_PKG_VERSION"), "Weather bot started, press Ctrl+C to exit");
    let poller = Poller::new(telegram, router, config.telegram.poll_timeout_secs);
    poller.run(cancel).await;
    info!("Weather bot stopped");

    Ok(())
}

fn configure(mut config: Config, path: &Path) -> anyhow::Result<()> {
    let token = Password::new("Telegram bot token:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read bot token")?;

    config.set_bot_token(token.trim().to_string());
    config.save_to(path)?;

    println!("Saved bot token to {}", path.display());
    Ok(())
}

async fn lookup(config: Config, text: &str) -> anyhow::Result<()> {
    let router = build_router(reqwest::Client::new(), &config);

    let message = InboundMessage::new(0, text);
    match router.route(&message, &CancellationToken::new()).await {
        Some(reply) => println!("{}", reply.text),
        None => println!("(no reply)"),
    }

    Ok(())
}

//! Receive loop: long-polls Telegram and hands each message to the router.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use weather_core::{InboundMessage, MessageSink, OutboundReply, Router, UNEXPECTED_ERROR_TEXT};

use crate::telegram::TelegramClient;

/// Pause after a failed poll before trying again.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Poller {
    telegram: Arc<TelegramClient>,
    router: Arc<Router>,
    poll_timeout_secs: u64,
}

impl Poller {
    pub fn new(telegram: Arc<TelegramClient>, router: Arc<Router>, poll_timeout_secs: u64) -> Self {
        Self {
            telegram,
            router,
            poll_timeout_secs,
        }
    }

    /// Run until `cancel` fires, then wait for in-flight handlers to finish.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut offset = 0;
        let mut handlers = JoinSet::new();

        info!("Polling Telegram for updates");

        loop {
            let polled = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                polled = self.telegram.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let Some(message) = update.into_inbound() else {
                            continue;
                        };
                        handlers.spawn(handle_message(
                            self.telegram.clone(),
                            self.router.clone(),
                            message,
                            cancel.clone(),
                        ));
                    }
                }
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "Polling Telegram failed");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                    }
                }
            }

            while let Some(joined) = handlers.try_join_next() {
                if let Err(err) = joined {
                    error!(error = %err, "Message handler task failed");
                }
            }
        }

        info!(in_flight = handlers.len(), "Stopping receive loop");
        while handlers.join_next().await.is_some() {}
    }
}

/// Handle one message in its own task so a panic cannot take down the loop.
async fn handle_message(
    telegram: Arc<TelegramClient>,
    router: Arc<Router>,
    message: InboundMessage,
    cancel: CancellationToken,
) {
    let chat_id = message.chat_id;

    let task = {
        let telegram = telegram.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            router.dispatch(telegram.as_ref(), &message, &cancel).await
        })
    };

    let Err(err) = task.await else {
        return;
    };
    if !err.is_panic() {
        return;
    }

    error!(chat_id, error = %err, "Message handler panicked");
    let reply = OutboundReply::plain(chat_id, UNEXPECTED_ERROR_TEXT);
    if let Err(err) = telegram.send(&reply, &cancel).await {
        error!(chat_id, error = %format!("{err:#}"), "Failed to send fallback error message");
    }
}

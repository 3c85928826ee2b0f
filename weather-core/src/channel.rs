use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::model::OutboundReply;

/// Outbound half of a chat channel.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, reply: &OutboundReply, cancel: &CancellationToken) -> anyhow::Result<()>;
}

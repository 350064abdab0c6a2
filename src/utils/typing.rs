//! Repeating "typing" indicator kept alive while a completion is pending.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serenity::all::{ChannelId, Http};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::Error;

/// Something that can show a typing indicator once.
pub trait TypingSignal: Send + Sync + 'static {
    fn send_typing(&self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Typing indicator for a Discord channel.
pub struct ChannelTyping {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelTyping {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

impl TypingSignal for ChannelTyping {
    async fn send_typing(&self) -> Result<(), Error> {
        self.channel_id
            .broadcast_typing(&self.http)
            .await
            .map_err(Into::into)
    }
}

/// Sends a typing signal right away and then once per period until dropped.
///
/// Hold the guard for exactly as long as the indicator should stay up; every
/// exit path that drops it stops the signal.
pub struct TypingGuard {
    task: JoinHandle<()>,
}

impl TypingGuard {
    pub fn start<S: TypingSignal>(signal: S, period: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = signal.send_typing().await {
                    debug!("Typing signal failed: {}", e);
                }
            }
        });

        Self { task }
    }
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

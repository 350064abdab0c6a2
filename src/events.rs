//! Gateway event intake.
//!
//! The serenity handler does no work itself: every event of interest is turned
//! into a [`BridgeEvent`] and pushed onto the dispatcher's channel.

use serenity::all::{
    ConnectionStage, CurrentUser, Message, RatelimitInfo, Ready, ResumedEvent, ShardId,
    ShardMessenger, ShardStageUpdateEvent,
};
use serenity::async_trait;
use serenity::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use tracing::error;

/// Events consumed by the dispatch loop.
pub enum BridgeEvent {
    /// The shard finished connecting.
    Ready {
        user: CurrentUser,
        shard: ShardMessenger,
    },
    /// A message was posted in a channel the bot can see.
    Message(Box<Message>),
    /// The gateway session was resumed after a reconnect.
    Resumed,
    /// A shard changed connection stage.
    ShardStage {
        shard_id: ShardId,
        old: ConnectionStage,
        new: ConnectionStage,
    },
    /// An HTTP request was held back by a rate limit.
    Ratelimited {
        path: String,
        timeout_ms: u128,
        global: bool,
    },
}

/// Forwards gateway events into the dispatcher's channel.
pub struct Handler {
    events: UnboundedSender<BridgeEvent>,
}

impl Handler {
    pub fn new(events: UnboundedSender<BridgeEvent>) -> Self {
        Self { events }
    }

    fn forward(&self, event: BridgeEvent) {
        if self.events.send(event).is_err() {
            error!("Dispatcher is gone, dropping gateway event");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: Message) {
        self.forward(BridgeEvent::Message(Box::new(msg)));
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        self.forward(BridgeEvent::Ready {
            user: ready.user,
            shard: ctx.shard,
        });
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        self.forward(BridgeEvent::Resumed);
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        self.forward(BridgeEvent::ShardStage {
            shard_id: event.shard_id,
            old: event.old,
            new: event.new,
        });
    }

    async fn ratelimit(&self, data: RatelimitInfo) {
        self.forward(BridgeEvent::Ratelimited {
            path: data.path,
            timeout_ms: data.timeout.as_millis(),
            global: data.global,
        });
    }
}

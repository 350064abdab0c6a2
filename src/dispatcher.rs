//! The dispatch loop: consumes [`BridgeEvent`]s and answers trigger messages.

use std::sync::Arc;

use serenity::all::{ActivityData, ConnectionStage, CreateEmbed, CreateMessage, Http, Message};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::Error;
use crate::config::BridgeConfig;
use crate::events::BridgeEvent;
use crate::utils::anthropic_client::{CompletionClient, CompletionResult};
use crate::utils::chunker::ChunkError;
use crate::utils::embeds::{self, Requester, UPSTREAM_ERROR_MESSAGE};
use crate::utils::trigger;
use crate::utils::typing::{ChannelTyping, TypingGuard, TypingSignal};

/// Presence shown once the bot is connected.
pub const PRESENCE: &str = "for Claude requests...";

/// Label used in response embed titles for trigger replies.
const RESPONSE_LABEL: &str = "Claude";

/// Shared handles the dispatcher needs to answer prompts.
#[derive(Clone)]
pub struct Dispatcher {
    http: Arc<Http>,
    completion: Arc<CompletionClient>,
    config: Arc<BridgeConfig>,
}

impl Dispatcher {
    pub fn new(
        http: Arc<Http>,
        completion: Arc<CompletionClient>,
        config: Arc<BridgeConfig>,
    ) -> Self {
        Self {
            http,
            completion,
            config,
        }
    }

    /// Runs until every sender of `events` is dropped, then waits for the
    /// prompts still being answered.
    ///
    /// Each prompt is answered in its own task. A task that fails or panics is
    /// logged and otherwise ignored.
    pub async fn run(self, events: UnboundedReceiver<BridgeEvent>) {
        event_loop(events, |event, tasks| self.dispatch(event, tasks)).await;
    }

    fn dispatch(&self, event: BridgeEvent, tasks: &mut JoinSet<Result<(), Error>>) {
        match event {
            BridgeEvent::Ready { user, shard } => {
                info!("Bot is ready! Logged in as {}", user.tag());
                shard.set_activity(Some(ActivityData::watching(PRESENCE)));
                info!("Claude Discord Bridge is now active");
            }
            BridgeEvent::Message(msg) => {
                let Some(prompt) =
                    incoming_prompt(msg.author.bot, &msg.content, &self.config.trigger_prefix)
                else {
                    return;
                };
                let prompt = prompt.to_string();
                let dispatcher = self.clone();
                tasks.spawn(async move { dispatcher.respond(&msg, &prompt).await });
            }
            BridgeEvent::Resumed => info!("Gateway session resumed"),
            BridgeEvent::ShardStage { shard_id, old, new } => match new {
                ConnectionStage::Disconnected | ConnectionStage::Resuming => {
                    warn!("Shard {} went from {:?} to {:?}", shard_id.0, old, new)
                }
                _ => debug!("Shard {} went from {:?} to {:?}", shard_id.0, old, new),
            },
            BridgeEvent::Ratelimited {
                path,
                timeout_ms,
                global,
            } => warn!(
                "Rate limited on {} for {} ms (global: {})",
                path, timeout_ms, global
            ),
        }
    }

    /// Answers one trigger message: a usage hint for an empty prompt, else the
    /// completion as one or more embeds, or the error embed if the API fails.
    async fn respond(&self, msg: &Message, prompt: &str) -> Result<(), Error> {
        let author = &msg.author;
        let typing = ChannelTyping::new(self.http.clone(), msg.channel_id);

        match self.answer(prompt, &Requester::from(author), typing).await? {
            Answer::UsageHint(hint) => {
                msg.reply(&*self.http, hint).await?;
            }
            Answer::Embeds(replies) => {
                debug!("Sending {} replies to {}", replies.len(), author.name);
                for embed in replies {
                    let reply = CreateMessage::new().embed(embed).reference_message(msg);
                    msg.channel_id.send_message(&*self.http, reply).await?;
                }
            }
        }

        Ok(())
    }

    /// Works out what to send back for `prompt`. The completion API is only
    /// called for a non-empty prompt, with `typing` shown while it runs.
    async fn answer<S: TypingSignal>(
        &self,
        prompt: &str,
        requester: &Requester,
        typing: S,
    ) -> Result<Answer, ChunkError> {
        if prompt.is_empty() {
            debug!("Empty prompt from {}, sending usage hint", requester.name);
            return Ok(Answer::UsageHint(trigger::usage_hint(
                &self.config.trigger_prefix,
            )));
        }

        info!("Prompt received from {}", requester.name);
        debug!("Prompt is {} characters", prompt.chars().count());

        let completion = {
            let _typing = TypingGuard::start(typing, self.config.typing_interval);
            self.completion.complete(prompt, None).await
        };

        replies(completion, requester, &self.config).map(Answer::Embeds)
    }
}

/// What the bridge sends back for one trigger message.
#[derive(Debug)]
enum Answer {
    UsageHint(String),
    Embeds(Vec<CreateEmbed>),
}

/// Turns a completion outcome into the embeds to send. Any API failure is a
/// single error embed; the request is never retried.
fn replies(
    completion: CompletionResult<String>,
    requester: &Requester,
    config: &BridgeConfig,
) -> Result<Vec<CreateEmbed>, ChunkError> {
    match completion {
        Ok(text) => Ok(embeds::response_parts(RESPONSE_LABEL, &text, config)?
            .into_iter()
            .map(|part| embeds::response_embed(part, requester, None))
            .collect()),
        Err(e) => {
            error!("Error calling Claude API for {}: {}", requester.name, e);
            Ok(vec![embeds::error_embed(UPSTREAM_ERROR_MESSAGE)])
        }
    }
}

/// Feeds every event to `on_event` until the channel closes, reaping the
/// tasks it spawns as they finish, then waits for the rest.
async fn event_loop<E, F>(mut events: UnboundedReceiver<E>, mut on_event: F)
where
    F: FnMut(E, &mut JoinSet<Result<(), Error>>),
{
    let mut tasks: JoinSet<Result<(), Error>> = JoinSet::new();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => on_event(event, &mut tasks),
                None => break,
            },
            Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                log_task_outcome(finished);
            }
        }
    }

    info!(
        "Event channel closed, waiting on {} in-flight requests",
        tasks.len()
    );
    while let Some(finished) = tasks.join_next().await {
        log_task_outcome(finished);
    }
    info!("Dispatcher stopped");
}

/// The prompt a message carries, or `None` if the bridge should ignore it.
/// Bot authors are always ignored.
fn incoming_prompt<'a>(author_is_bot: bool, content: &'a str, prefix: &str) -> Option<&'a str> {
    if author_is_bot {
        return None;
    }
    trigger::extract_prompt(content, prefix)
}

fn log_task_outcome(outcome: Result<Result<(), Error>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Unhandled failure while answering a prompt: {}", e),
        Err(e) if e.is_panic() => error!("Prompt task panicked: {}", e),
        Err(e) => debug!("Prompt task cancelled: {}", e),
    }
}

//! Discord bridge to the Anthropic Messages API.
//!
//! Messages starting with the trigger prefix are forwarded to Claude and the
//! reply is posted back as embeds, split on line boundaries when it does not
//! fit in one message. A few slash commands expose the same API directly.

use std::sync::Arc;

use tracing::error;

mod commands;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod utils;

use commands::{
    ai::{ask::*, models::*},
    general::ping::*,
};
use config::BridgeConfig;
use utils::anthropic_client::CompletionClient;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// State available to every slash command invocation.
pub struct Data {
    pub completion: Arc<CompletionClient>,
    pub config: Arc<BridgeConfig>,
}

#[poise::command(slash_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    let trigger_note = format!(
        "You can also start any message with `{prefix} <your message>`, e.g. `{prefix} What is the weather like?`",
        prefix = ctx.data().config.trigger_prefix
    );

    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: &trigger_note,
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

/// Every command registered with the framework.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        // Default commands
        register(),
        help(),
        // General commands
        ping(),
        // AI-centric commands
        ask(),
        models(),
    ]
}

/// Logs command failures before handing them to poise's default reporting.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    if let poise::FrameworkError::Command { error, ctx, .. } = &error {
        error!("Command '{}' failed: {}", ctx.command().name, error);
    }

    if let Err(e) = poise::builtins::on_error(error).await {
        error!("Error while handling error: {}", e);
    }
}

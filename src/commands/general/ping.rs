use poise::CreateReply;
use serenity::all::CreateEmbed;
use std::time::Duration;

use crate::{CommandResult, Context};

/// Check if the bot is responsive
#[poise::command(slash_command, category = "General")]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    let latency = get_shard_latency(&ctx).await;

    let embed = CreateEmbed::new()
        .title("🏓 Pong!")
        .description(latency_description(latency))
        .colour(0x00FF00);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Gateway heartbeat latency of the shard the command arrived on. `None`
/// until the first heartbeat has been acknowledged.
async fn get_shard_latency(ctx: &Context<'_>) -> Option<Duration> {
    let shard_manager = ctx.framework().shard_manager();
    let runners = shard_manager.runners.lock().await;

    runners.get(&ctx.serenity_context().shard_id)?.latency
}

fn latency_description(latency: Option<Duration>) -> String {
    match latency {
        Some(latency) => format!("Bot latency: {}ms", latency.as_millis()),
        None => "Bot latency: not measured yet".to_string(),
    }
}

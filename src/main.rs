use std::sync::Arc;
use std::time::Duration;

use ::serenity::all::ClientBuilder;
use claude_bridge::{
    Data, Error, config::BridgeConfig, dispatcher::Dispatcher, events::Handler,
    utils::anthropic_client::CompletionClient,
};
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// How long in-flight requests get to finish once the client has stopped.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();

    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("claude_bridge=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    // Missing secrets stop the process here.
    let config = Arc::new(BridgeConfig::from_env()?);
    let completion = Arc::new(CompletionClient::new(&config)?);

    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let data = Data {
        completion: completion.clone(),
        config: config.clone(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: claude_bridge::commands(),
            on_error: |error| Box::pin(claude_bridge::on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        });

    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework.build())
        .event_handler(Handler::new(events_tx))
        .await?;

    let dispatcher = Dispatcher::new(client.http.clone(), completion, config.clone());
    let dispatch_loop = tokio::spawn(dispatcher.run(events_rx));

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, disconnecting");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Unable to listen for shutdown signal: {}", e),
        }
    });

    info!("Starting Claude Discord Bridge");
    let result = client.start().await;

    // Dropping the client drops the event handler, which closes the dispatcher's channel.
    drop(client);
    match tokio::time::timeout(SHUTDOWN_GRACE, dispatch_loop).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Dispatcher task failed: {}", e),
        Err(_) => warn!("Dispatcher still busy after {:?}, exiting anyway", SHUTDOWN_GRACE),
    }

    result.map_err(Into::into)
}

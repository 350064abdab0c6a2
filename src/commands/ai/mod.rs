//! Slash commands that talk to the completion API directly, as an alternative
//! to the trigger prefix.

/// Submodule defining the `/ask` command.
pub(crate) mod ask;
/// Submodule defining the `/models` command.
pub(crate) mod models;

use crate::CommandResult;
use crate::Context;
use crate::utils::anthropic_client::ModelInfo;

/// Fetches the available models, logging and swallowing failures so callers
/// such as autocompletion can degrade to an empty list.
async fn fetch_models(ctx: Context<'_>) -> Vec<ModelInfo> {
    match ctx.data().completion.list_models().await {
        Ok(models) => models,
        Err(e) => {
            tracing::error!("Error listing models: {}", e);
            Vec::new()
        }
    }
}

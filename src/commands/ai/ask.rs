//! Defines the `/ask` command for prompting a specific model.

use futures::{Stream, StreamExt};
use poise::CreateReply;
use tracing::{debug, error, info};

use crate::utils::embeds::{self, Requester};

use super::*;

/// Ask Claude something, optionally choosing the model.
///
/// Long answers are split across several embeds the same way trigger replies
/// are. Uses `autocomplete_model` to suggest model ids.
#[poise::command(slash_command, category = "AI")]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Your message for Claude"] prompt: String,
    #[description = "The model to use (defaults to the configured model)"]
    #[autocomplete = "autocomplete_model"]
    model: Option<String>,
) -> CommandResult {
    let author = ctx.author();
    debug!("Ask request received from user {}", author.name);

    let prompt = prompt.trim();
    if prompt.is_empty() {
        ctx.say("Please provide a message for Claude.").await?;
        return Ok(());
    }

    ctx.defer().await?;

    let data = ctx.data();
    let model = chosen_model(model.as_deref(), data.completion.default_model());

    info!("Sending prompt from {} to model '{}'", author.name, model);
    match data.completion.complete(prompt, Some(model.as_str())).await {
        Ok(text) => {
            let requester = Requester::from(author);
            for part in embeds::response_parts(&model, &text, &data.config)? {
                let embed = embeds::response_embed(part, &requester, Some(model.as_str()));
                ctx.send(CreateReply::default().embed(embed)).await?;
            }
        }
        Err(e) => {
            error!("Error using model {} for {}: {}", model, author.name, e);
            let embed = embeds::error_embed(model_error_message(&model));
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
    }

    Ok(())
}

/// Autocomplete for the `model` argument: available model ids starting with
/// the partial input.
async fn autocomplete_model<'a>(
    ctx: Context<'_>,
    partial: &'a str,
) -> impl Stream<Item = String> + 'a {
    debug!("Processing model autocomplete for partial: '{}'", partial);
    let model_list = fetch_models(ctx).await;

    futures::stream::iter(model_list)
        .filter(move |model| futures::future::ready(model.id.starts_with(partial)))
        .map(|model| model.id)
}

fn chosen_model(requested: Option<&str>, default: &str) -> String {
    requested
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn model_error_message(model: &str) -> String {
    format!(
        "Sorry, I encountered an error using model `{model}`. Please check if the model name is correct or try a different model."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(None, "claude-default" ; "no model given")]
    #[test_case(Some("   "), "claude-default" ; "blank model")]
    #[test_case(Some(" claude-3-haiku "), "claude-3-haiku" ; "trimmed model")]
    fn test_chosen_model(requested: Option<&str>, expected: &str) {
        assert_eq!(chosen_model(requested, "claude-default"), expected);
    }

    #[test]
    fn test_model_error_message_names_model() {
        assert!(model_error_message("claude-nope").contains("`claude-nope`"));
    }
}

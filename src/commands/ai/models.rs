use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter};
use tracing::{debug, error, info};

use super::*;

/// At most this many models are listed.
const MODEL_LIST_LIMIT: usize = 20;

/// List the models available to the bridge.
#[poise::command(slash_command, category = "AI")]
pub async fn models(ctx: Context<'_>) -> CommandResult {
    let author = ctx.author();
    debug!("List models request received from user {}", author.name);

    ctx.defer().await?;

    match ctx.data().completion.list_models().await {
        Ok(models) if models.is_empty() => {
            ctx.say("No models available. Please check your API key.")
                .await?;
        }
        Ok(models) => {
            info!("Sending list of {} models to {}", models.len(), author.name);
            let embed = CreateEmbed::new()
                .title("🤖 Available Claude Models")
                .description(format_model_list(&models))
                .colour(0x00FF00)
                .footer(CreateEmbedFooter::new(
                    "Use /ask with the model option to pick one for a request",
                ));
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            error!("Failed to fetch models list: {}", e);
            ctx.say(format!("Error listing models: {}", e)).await?;
        }
    }

    Ok(())
}

fn format_model_list(models: &[ModelInfo]) -> String {
    let mut list = models
        .iter()
        .take(MODEL_LIST_LIMIT)
        .map(|model| {
            let mut details = Vec::new();
            if let Some(name) = &model.display_name {
                details.push(name.clone());
            }
            if let Some(created) = model.created_at {
                details.push(created.format("%Y-%m-%d").to_string());
            }

            if details.is_empty() {
                format!("- `{}`", model.id)
            } else {
                format!("- `{}` ({})", model.id, details.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    if models.len() > MODEL_LIST_LIMIT {
        list.push_str(&format!("\n...and {} more", models.len() - MODEL_LIST_LIMIT));
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn model(id: &str) -> ModelInfo {
        ModelInfo {
            id: id.to_string(),
            display_name: None,
            created_at: None,
        }
    }

    #[test]
    fn test_format_model_list_details() {
        let models = vec![
            ModelInfo {
                id: "claude-3-5-sonnet-20241022".to_string(),
                display_name: Some("Claude 3.5 Sonnet (New)".to_string()),
                created_at: Utc.with_ymd_and_hms(2024, 10, 22, 0, 0, 0).single(),
            },
            model("claude-3-haiku-20240307"),
        ];

        assert_eq!(
            format_model_list(&models),
            "- `claude-3-5-sonnet-20241022` (Claude 3.5 Sonnet (New), 2024-10-22)\n- `claude-3-haiku-20240307`"
        );
    }

    #[test]
    fn test_format_model_list_is_capped() {
        let models: Vec<ModelInfo> = (0..25).map(|i| model(&format!("model-{i}"))).collect();

        let list = format_model_list(&models);

        assert_eq!(list.lines().count(), MODEL_LIST_LIMIT + 1);
        assert!(list.ends_with("...and 5 more"));
        assert!(!list.contains("model-20"));
    }
}

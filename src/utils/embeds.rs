//! Embeds used to present completions and failures in Discord.

use serenity::all::{CreateEmbed, CreateEmbedFooter, Timestamp, User};

use crate::config::BridgeConfig;
use crate::utils::chunker::{self, ChunkError};

pub const RESPONSE_COLOUR: u32 = 0x7289DA;
pub const ERROR_COLOUR: u32 = 0xFF0000;

/// Shown whenever the completion API fails.
pub const UPSTREAM_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request. Please try again later.";

/// The user a response is addressed to, as shown in the embed footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub name: String,
    pub avatar_url: String,
}

impl From<&User> for Requester {
    fn from(user: &User) -> Self {
        Self {
            name: user.global_name.clone().unwrap_or_else(|| user.name.clone()),
            avatar_url: user.face(),
        }
    }
}

/// One reply worth of a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePart {
    pub title: String,
    pub body: String,
}

/// Breaks `text` into titled parts ready to be sent one per message.
///
/// Text within the message limit is a single part. Longer text is split on
/// line boundaries and every part after the first is numbered from 2.
pub fn response_parts(
    label: &str,
    text: &str,
    config: &BridgeConfig,
) -> Result<Vec<ResponsePart>, ChunkError> {
    let segments = if text.chars().count() > config.max_message_length {
        chunker::split_message(text, config.segment_length())?
    } else {
        vec![text.to_string()]
    };

    let parts = segments
        .into_iter()
        .enumerate()
        .map(|(i, body)| ResponsePart {
            title: match i {
                0 => format!("🤖 {label} Response"),
                _ => format!("🤖 {label} Response (Part {})", i + 1),
            },
            body,
        })
        .collect();

    Ok(parts)
}

/// Renders one part, crediting `requester` and optionally naming the model.
pub fn response_embed(part: ResponsePart, requester: &Requester, model: Option<&str>) -> CreateEmbed {
    let footer = match model {
        Some(model) => format!("Requested by {} • Model: {}", requester.name, model),
        None => format!("Requested by {}", requester.name),
    };

    CreateEmbed::new()
        .title(part.title)
        .description(part.body)
        .colour(RESPONSE_COLOUR)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(footer).icon_url(&requester.avatar_url))
}

/// Red embed reporting a failure to the user.
pub fn error_embed(description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(description)
        .colour(ERROR_COLOUR)
        .timestamp(Timestamp::now())
}

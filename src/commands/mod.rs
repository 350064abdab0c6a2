//! This module aggregates all the slash command modules for the bot.

/// Commands that call the completion API (ask, model listing).
pub(crate) mod ai;
/// General purpose commands (e.g., ping).
pub(crate) mod general;

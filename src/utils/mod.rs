//! This module aggregates various utility submodules used throughout the application.

/// Client for the Anthropic Messages API.
pub mod anthropic_client;
/// Splitting long responses into message-sized segments.
pub mod chunker;
/// Embeds presenting responses and errors.
pub mod embeds;
/// Trigger prefix parsing.
pub mod trigger;
/// Repeating typing indicator.
pub mod typing;

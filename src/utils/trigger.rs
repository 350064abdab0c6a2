//! Recognising trigger-prefixed chat messages.

/// Returns the prompt carried by `content`, or `None` if the message does not
/// start with `prefix`. Whitespace around the prompt is removed, so a bare
/// prefix yields an empty prompt.
pub fn extract_prompt<'a>(content: &'a str, prefix: &str) -> Option<&'a str> {
    content.strip_prefix(prefix).map(str::trim)
}

/// Reply sent when a message carries the prefix but no prompt.
pub fn usage_hint(prefix: &str) -> String {
    format!("Please provide a message for Claude. Example: `{prefix} Hello, how are you?`")
}

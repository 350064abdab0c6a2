//! Splitting realistic responses into Discord-sized parts.

mod common;

use claude_bridge::utils::chunker::split_message;
use claude_bridge::utils::embeds::response_parts;
use common::fixtures::{MARKDOWN_RESPONSE, long_response};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_markdown_response_is_sent_whole() {
    let config = common::test_config("https://api.anthropic.com");

    let parts = response_parts("Claude", MARKDOWN_RESPONSE, &config).unwrap();

    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].body, MARKDOWN_RESPONSE);
}

#[test]
fn test_long_response_splits_between_paragraphs() {
    common::init();
    let config = common::test_config("https://api.anthropic.com");
    let text = long_response(40);
    assert!(text.chars().count() > config.max_message_length);

    let parts = response_parts("Claude", &text, &config).unwrap();

    assert!(parts.len() > 1);
    for part in &parts {
        assert!(part.body.chars().count() <= config.segment_length());
        // Every part starts on a paragraph boundary.
        assert!(part.body.chars().next().is_some_and(|c| c.is_ascii_digit()));
    }
    let rejoined = parts
        .iter()
        .map(|p| p.body.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(rejoined, text);
}

#[rstest]
#[case(1)]
#[case(10)]
#[case(1900)]
fn test_segments_never_exceed_bound(#[case] max_length: usize) {
    let text = format!("{}\n{}\n{}", "x".repeat(4321), long_response(12), "é".repeat(777));

    let segments = split_message(&text, max_length).unwrap();

    assert!(segments.iter().all(|s| !s.is_empty()));
    assert!(segments.iter().all(|s| s.chars().count() <= max_length));
}

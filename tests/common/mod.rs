//! Common test utilities and fixtures shared by the integration tests.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Once;

use claude_bridge::config::BridgeConfig;
use tracing::Level;

static INIT: Once = Once::new();

/// Initialize tracing once per test binary.
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// Configuration with test secrets, pointing the API client at `base_url`.
pub fn test_config(base_url: &str) -> BridgeConfig {
    let base_url = base_url.to_string();
    BridgeConfig::from_lookup(|key| match key {
        "DISCORD_BOT_TOKEN" => Some("discord-token".to_string()),
        "ANTHROPIC_API_KEY" => Some("sk-ant-test".to_string()),
        "ANTHROPIC_BASE_URL" => Some(base_url.clone()),
        "REQUEST_TIMEOUT" => Some("5s".to_string()),
        _ => None,
    })
    .expect("Failed to build test config")
}

//! Process configuration read from the environment at startup.
//!
//! Secrets are required; every other setting has a default. Durations use
//! humantime syntax (`60s`, `1m 30s`).

use std::env;
use std::fmt;
use std::time::Duration;

use humantime_serde::re::humantime;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Characters held back from every outbound message for embed formatting.
pub const FORMAT_MARGIN: usize = 100;

const DEFAULT_TRIGGER_PREFIX: &str = "!claude";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;

/// Errors raised while loading [`BridgeConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings shared by the dispatcher, the slash commands and the API client.
#[derive(Clone)]
pub struct BridgeConfig {
    pub discord_token: String,
    pub anthropic_api_key: String,
    /// Literal a message must start with to be forwarded.
    pub trigger_prefix: String,
    /// Model used when a request does not name one.
    pub model: String,
    pub max_tokens: u32,
    pub api_base_url: Url,
    pub request_timeout: Duration,
    /// Period between typing signals while a completion is pending.
    pub typing_interval: Duration,
    /// Largest response sent as one message without splitting.
    pub max_message_length: usize,
}

impl BridgeConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = required(&lookup, "DISCORD_BOT_TOKEN")?;
        let anthropic_api_key = required(&lookup, "ANTHROPIC_API_KEY")?;

        let trigger_prefix = lookup("TRIGGER_PREFIX")
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_TRIGGER_PREFIX.to_string());

        let model = lookup("CLAUDE_MODEL")
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = match lookup("CLAUDE_MAX_TOKENS") {
            Some(raw) => parse_positive(&raw, "CLAUDE_MAX_TOKENS")?,
            None => DEFAULT_MAX_TOKENS,
        };

        let api_base_url = match lookup("ANTHROPIC_BASE_URL") {
            Some(raw) => Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
                key: "ANTHROPIC_BASE_URL",
                reason: e.to_string(),
            })?,
            None => Url::parse(DEFAULT_API_BASE_URL).map_err(|e| ConfigError::Invalid {
                key: "ANTHROPIC_BASE_URL",
                reason: e.to_string(),
            })?,
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT") {
            Some(raw) => parse_duration(&raw, "REQUEST_TIMEOUT")?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let typing_interval = match lookup("TYPING_INTERVAL") {
            Some(raw) => parse_duration(&raw, "TYPING_INTERVAL")?,
            None => DEFAULT_TYPING_INTERVAL,
        };

        let max_message_length = match lookup("MAX_MESSAGE_LENGTH") {
            Some(raw) => parse_positive(&raw, "MAX_MESSAGE_LENGTH")?,
            None => DEFAULT_MAX_MESSAGE_LENGTH,
        };
        if max_message_length <= FORMAT_MARGIN {
            return Err(ConfigError::Invalid {
                key: "MAX_MESSAGE_LENGTH",
                reason: format!("must be greater than {FORMAT_MARGIN}"),
            });
        }

        let config = Self {
            discord_token,
            anthropic_api_key,
            trigger_prefix,
            model,
            max_tokens,
            api_base_url,
            request_timeout,
            typing_interval,
            max_message_length,
        };
        debug!("Loaded configuration: {:?}", config);

        Ok(config)
    }

    /// Maximum characters per segment once a response has to be split.
    pub fn segment_length(&self) -> usize {
        self.max_message_length - FORMAT_MARGIN
    }

    /// Builds an endpoint URL under the configured API base.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("discord_token", &"<redacted>")
            .field("anthropic_api_key", &"<redacted>")
            .field("trigger_prefix", &self.trigger_prefix)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("typing_interval", &self.typing_interval)
            .field("max_message_length", &self.max_message_length)
            .finish()
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_positive<T>(raw: &str, key: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: fmt::Display,
{
    let value: T = raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;

    if value <= T::default() {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be positive".to_string(),
        });
    }

    Ok(value)
}

fn parse_duration(raw: &str, key: &'static str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;

    if duration.is_zero() {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be longer than zero".to_string(),
        });
    }

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const SECRETS: [(&str, &str); 2] = [
        ("DISCORD_BOT_TOKEN", "discord-token"),
        ("ANTHROPIC_API_KEY", "sk-ant-test"),
    ];

    #[test]
    fn test_defaults_apply_when_only_secrets_are_set() {
        let config = BridgeConfig::from_lookup(lookup_from(&SECRETS)).unwrap();

        assert_eq!(config.discord_token, "discord-token");
        assert_eq!(config.anthropic_api_key, "sk-ant-test");
        assert_eq!(config.trigger_prefix, "!claude");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.typing_interval, Duration::from_secs(5));
        assert_eq!(config.max_message_length, 2000);
        assert_eq!(config.segment_length(), 1900);
        assert_eq!(
            config.endpoint("/v1/messages"),
            "https://api.anthropic.com/v1/messages"
        );
    }

    #[test_case("DISCORD_BOT_TOKEN" ; "discord token")]
    #[test_case("ANTHROPIC_API_KEY" ; "api key")]
    fn test_missing_secret_fails(key: &'static str) {
        let pairs: Vec<(&str, &str)> = SECRETS.iter().copied().filter(|(k, _)| *k != key).collect();

        let result = BridgeConfig::from_lookup(lookup_from(&pairs));

        assert_matches!(result, Err(ConfigError::Missing(missing)) if missing == key);
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let result = BridgeConfig::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "   "),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
        ]));

        assert_matches!(result, Err(ConfigError::Missing("DISCORD_BOT_TOKEN")));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let mut pairs = SECRETS.to_vec();
        pairs.extend([
            ("TRIGGER_PREFIX", "!ai"),
            ("CLAUDE_MODEL", "claude-3-haiku-20240307"),
            ("CLAUDE_MAX_TOKENS", "1024"),
            ("ANTHROPIC_BASE_URL", "http://127.0.0.1:8080/"),
            ("REQUEST_TIMEOUT", "1m 30s"),
            ("TYPING_INTERVAL", "250ms"),
            ("MAX_MESSAGE_LENGTH", "500"),
        ]);

        let config = BridgeConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.trigger_prefix, "!ai");
        assert_eq!(config.model, "claude-3-haiku-20240307");
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.typing_interval, Duration::from_millis(250));
        assert_eq!(config.segment_length(), 400);
        assert_eq!(config.endpoint("v1/models"), "http://127.0.0.1:8080/v1/models");
    }

    #[test_case("CLAUDE_MAX_TOKENS", "0" ; "zero tokens")]
    #[test_case("CLAUDE_MAX_TOKENS", "lots" ; "non numeric tokens")]
    #[test_case("ANTHROPIC_BASE_URL", "not a url" ; "bad url")]
    #[test_case("REQUEST_TIMEOUT", "soon" ; "bad timeout")]
    #[test_case("TYPING_INTERVAL", "0s" ; "zero typing interval")]
    #[test_case("MAX_MESSAGE_LENGTH", "100" ; "length within margin")]
    fn test_invalid_values_fail(key: &'static str, value: &str) {
        let mut pairs = SECRETS.to_vec();
        pairs.push((key, value));

        let result = BridgeConfig::from_lookup(lookup_from(&pairs));

        assert_matches!(result, Err(ConfigError::Invalid { key: k, .. }) if k == key);
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = BridgeConfig::from_lookup(lookup_from(&SECRETS)).unwrap();

        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("discord-token"));
        assert!(!rendered.contains("sk-ant-test"));
        assert!(rendered.contains("<redacted>"));
    }
}

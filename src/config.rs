//! Configuration loading and validation.

use crate::error::{ConfigError, Result};
use anyhow::Context as _;
use std::time::Duration;

/// Default cooldown between accepted messages from the same user.
const DEFAULT_COOLDOWN_SECS: u64 = 10;

/// Relaybot configuration, loaded from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token.
    pub discord_token: String,

    /// Ordered Gemini API keys, rotated round-robin per generation call.
    pub api_keys: Vec<String>,

    /// The single channel the bot responds in.
    pub allowed_channel_id: u64,

    /// Gemini model name.
    pub model: String,

    /// Directory holding per-user transcript files.
    pub data_dir: std::path::PathBuf,

    /// Minimum interval between accepted messages from the same user.
    pub cooldown: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::MissingVar("DISCORD_TOKEN"))?;

        let api_keys: Vec<String> = std::env::var("GOOGLE_API_KEYS")
            .map_err(|_| ConfigError::MissingVar("GOOGLE_API_KEYS"))?
            .split(',')
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        if api_keys.is_empty() {
            return Err(ConfigError::Invalid(
                "GOOGLE_API_KEYS must contain at least one key".into(),
            )
            .into());
        }

        let allowed_channel_id = std::env::var("RELAYBOT_CHANNEL_ID")
            .map_err(|_| ConfigError::MissingVar("RELAYBOT_CHANNEL_ID"))?
            .parse::<u64>()
            .map_err(|error| {
                ConfigError::Invalid(format!("RELAYBOT_CHANNEL_ID is not a channel id: {error}"))
            })?;

        let model = std::env::var("RELAYBOT_MODEL").unwrap_or_else(|_| "gemini-1.5-pro".into());

        let data_dir = match std::env::var("RELAYBOT_DATA_DIR") {
            Ok(dir) => std::path::PathBuf::from(dir),
            Err(_) => dirs::data_dir()
                .map(|d| d.join("relaybot"))
                .unwrap_or_else(|| std::path::PathBuf::from("./user_messages")),
        };

        // Ensure the transcript directory exists before the first turn
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory: {}", data_dir.display()))
            .map_err(ConfigError::Other)?;

        let cooldown_secs = match std::env::var("RELAYBOT_COOLDOWN_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|error| {
                ConfigError::Invalid(format!("RELAYBOT_COOLDOWN_SECS is not a number: {error}"))
            })?,
            Err(_) => DEFAULT_COOLDOWN_SECS,
        };

        Ok(Self {
            discord_token,
            api_keys,
            allowed_channel_id,
            model,
            data_dir,
            cooldown: Duration::from_secs(cooldown_secs),
        })
    }
}

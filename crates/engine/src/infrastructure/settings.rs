//! Runtime settings, read from the environment with literal defaults.

use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::api_client::{ChatOptions, DEFAULT_BASE_URL};
use crate::infrastructure::rate_limiter::DEFAULT_REQUESTS_PER_WINDOW;
use crate::infrastructure::transport::DEFAULT_TIMEOUT;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Empty until the host provides one.
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub requests_per_window: u32,
    pub items: ChatOptions,
    pub dialogue: ChatOptions,
    pub environment: ChatOptions,
    pub image_model: String,
    pub image_size: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            requests_per_window: DEFAULT_REQUESTS_PER_WINDOW,
            items: ChatOptions::new(DEFAULT_CHAT_MODEL, 0.8, 2000),
            dialogue: ChatOptions::new(DEFAULT_CHAT_MODEL, 0.9, 150),
            environment: ChatOptions::new(DEFAULT_CHAT_MODEL, 1.0, 50),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
        }
    }
}

impl Settings {
    /// Overlay `NECRONOMICORE_*` environment variables on the defaults.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(key) = lookup("NECRONOMICORE_API_KEY") {
            settings.api_key = key;
        }
        if let Some(url) = lookup("NECRONOMICORE_BASE_URL") {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parsed::<u64>(&lookup, "NECRONOMICORE_TIMEOUT_SECS") {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = parsed(&lookup, "NECRONOMICORE_RATE_LIMIT") {
            settings.requests_per_window = limit;
        }

        apply_chat_overrides(&lookup, "ITEM", &mut settings.items);
        apply_chat_overrides(&lookup, "DIALOGUE", &mut settings.dialogue);
        apply_chat_overrides(&lookup, "ENVIRONMENT", &mut settings.environment);

        if let Some(model) = lookup("NECRONOMICORE_IMAGE_MODEL") {
            settings.image_model = model;
        }
        if let Some(size) = lookup("NECRONOMICORE_IMAGE_SIZE") {
            settings.image_size = size;
        }

        settings
    }
}

/// `NECRONOMICORE_<SITE>_MODEL`, `_TEMPERATURE`, `_MAX_TOKENS`
fn apply_chat_overrides(
    lookup: &impl Fn(&str) -> Option<String>,
    site: &str,
    options: &mut ChatOptions,
) {
    if let Some(model) = lookup(&format!("NECRONOMICORE_{site}_MODEL")) {
        options.model = model;
    }
    if let Some(temperature) = parsed(lookup, &format!("NECRONOMICORE_{site}_TEMPERATURE")) {
        options.temperature = temperature;
    }
    if let Some(max_tokens) = parsed(lookup, &format!("NECRONOMICORE_{site}_MAX_TOKENS")) {
        options.max_tokens = max_tokens;
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

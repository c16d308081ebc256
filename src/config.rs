use crate::cache::DEFAULT_CACHE_LIMIT;
use crate::i18n::Language;
use anyhow::{Context, Result};

pub const DEFAULT_TRANSLATION_API_URL: &str = "https://api.mymemory.translated.net/get";

#[derive(Debug, Clone)]
pub struct Config {
    // Machine translation endpoint
    pub translation_api_url: String,
    pub request_timeout_secs: Option<u64>,

    // Cache
    pub cache_limit: usize,

    // Auto-translation pacing
    pub auto_translate_delay_ms: u64,

    // Language used when the UI has not picked one
    pub default_language: Language,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(code.trim())
                .with_context(|| format!("DEFAULT_LANGUAGE '{}' is not supported", code))?,
            Err(_) => Language::canonical(),
        };

        Ok(Self {
            translation_api_url: std::env::var("TRANSLATION_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATION_API_URL.to_string()),
            // Zero would fail every request immediately
            request_timeout_secs: std::env::var("TRANSLATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0),

            cache_limit: std::env::var("TRANSLATION_CACHE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_LIMIT),

            auto_translate_delay_ms: std::env::var("AUTO_TRANSLATE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),

            default_language,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translation_api_url: DEFAULT_TRANSLATION_API_URL.to_string(),
            request_timeout_secs: None,
            cache_limit: DEFAULT_CACHE_LIMIT,
            auto_translate_delay_ms: 100,
            default_language: Language::canonical(),
        }
    }
}

//! Auto-translate a text into every supported language and print the
//! resulting multilingual value as JSON.
//!
//! Usage:
//!   garden-l10n <text> [source-language]
//!
//! Optional environment variables:
//! - TRANSLATION_API_URL (defaults to the MyMemory endpoint)
//! - TRANSLATION_TIMEOUT_SECS
//! - TRANSLATION_CACHE_LIMIT (defaults to 5000)
//! - AUTO_TRANSLATE_DELAY_MS (defaults to 100)
//! - DEFAULT_LANGUAGE (defaults to en, used when no source language is given)

use anyhow::{bail, Context, Result};
use garden_l10n::{cache::TranslationCache, config::Config, i18n::Language, translation::Translator};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("garden_l10n=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let mut args = std::env::args().skip(1);
    let Some(text) = args.next() else {
        bail!("Usage: garden-l10n <text> [source-language]");
    };
    let source = match args.next() {
        Some(code) => Language::from_code(&code)?,
        None => config.default_language,
    };

    let cache = Arc::new(TranslationCache::new(config.cache_limit));
    let translator = Translator::new(&config, cache)?;

    info!("Translating from {} into all supported languages", source.name());
    let result = translator.auto_translate_to_all(&text, source).await;

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Failed to serialize translations")?
    );

    let report = translator.metrics().report();
    info!(
        "Done: {} requests, {} failed",
        report.api_calls, report.api_failures
    );

    Ok(())
}

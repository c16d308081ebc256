//! Language registry: Single source of truth for all supported languages.
//!
//! The registry order is the order auto-translation walks the languages in.
//! Resolution of multilingual values uses a separate, fixed fallback chain.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "ar", "en", "bn")
    pub code: &'static str,

    /// English name of the language (e.g., "Arabic", "Bengali")
    pub name: &'static str,

    /// Native name of the language (e.g., "العربية", "বাংলা")
    pub native_name: &'static str,

    /// Whether this is the default source language for translations (only one should be true)
    pub is_canonical: bool,

    /// Whether text in this language is laid out right-to-left
    pub is_rtl: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,
}

/// Global language registry singleton.
///
/// Initialized once on first access and immutable thereafter. Adding a
/// language is a change to `default_languages`, nothing else.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

/// Order in which languages are tried when the requested one has no text.
pub const FALLBACK_CHAIN: [&str; 3] = ["en", "ar", "bn"];

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in registry order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get the canonical language configuration.
    ///
    /// The canonical language is the default source language for machine
    /// translation (English).
    ///
    /// # Panics
    /// Panics if no canonical language is found or if multiple canonical
    /// languages are defined (this indicates a configuration error).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }
}

/// Default language configurations: Arabic, English (canonical) and Bengali.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            is_canonical: false,
            is_rtl: true,
            enabled: true,
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
            is_rtl: false,
            enabled: true,
        },
        LanguageConfig {
            code: "bn",
            name: "Bengali",
            native_name: "বাংলা",
            is_canonical: false,
            is_rtl: false,
            enabled: true,
        },
    ]
}

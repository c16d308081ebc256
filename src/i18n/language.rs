//! Language type: Flexible, validated language representation.
//!
//! `Language` can only be built from codes present and enabled in the
//! registry, so every other module can treat it as a supported language.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "ar", "en", "bn")
    code: &'static str,
}

impl Language {
    pub const ARABIC: Language = Language { code: "ar" };

    pub const ENGLISH: Language = Language { code: "en" };

    pub const BENGALI: Language = Language { code: "bn" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    ///
    /// # Example
    /// ```ignore
    /// let bengali = Language::from_code("bn")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language {
                code: config.code, // Use the static str from the registry
            }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Get the canonical language (the default translation source, English).
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// All enabled languages in registry order.
    ///
    /// This is the set auto-translation fills in.
    pub fn supported() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This should
    /// never happen if the Language was constructed properly (via `from_code`
    /// or constants).
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language (e.g., "العربية").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Check if text in this language is laid out right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.config().is_rtl
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::canonical()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_constants_match_registry() {
        assert_eq!(Language::ARABIC.name(), "Arabic");
        assert_eq!(Language::ENGLISH.name(), "English");
        assert_eq!(Language::BENGALI.name(), "Bengali");
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_arabic() {
        let language = Language::from_code("ar").expect("Should succeed");
        assert_eq!(language, Language::ARABIC);
    }

    #[test]
    fn test_from_code_bengali() {
        let language = Language::from_code("bn").expect("Should succeed");
        assert_eq!(language.code(), "bn");
        assert_eq!(language.native_name(), "বাংলা");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("fr");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    // ==================== canonical Tests ====================

    #[test]
    fn test_canonical_returns_english() {
        let canonical = Language::canonical();
        assert_eq!(canonical, Language::ENGLISH);
        assert_eq!(Language::default(), canonical);
    }

    #[test]
    fn test_supported_order() {
        assert_eq!(
            Language::supported(),
            vec![Language::ARABIC, Language::ENGLISH, Language::BENGALI]
        );
    }

    // ==================== Direction Tests ====================

    #[test]
    fn test_only_arabic_is_rtl() {
        assert!(Language::ARABIC.is_rtl());
        assert!(!Language::ENGLISH.is_rtl());
        assert!(!Language::BENGALI.is_rtl());
    }

    // ==================== Trait Tests ====================

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::BENGALI.to_string(), "bn");
        assert_eq!(format!("{}|{}", Language::ENGLISH, Language::ARABIC), "en|ar");
    }

    #[test]
    fn test_language_debug() {
        let debug = format!("{:?}", Language::ARABIC);
        assert!(debug.contains("ar"));
    }
}

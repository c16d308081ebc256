//! Internationalization (i18n) module for multilingual content.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Validated `Language` type
//! - `text`: `MultilingualText` values and offline resolution with fallback
//! - `metrics`: Translation counters
//!
//! # Example
//!
//! ```rust,ignore
//! use garden_l10n::i18n::{resolve, Language, MultilingualText};
//!
//! let name = MultilingualText::from_parts("وردة", "Rose", "");
//! assert_eq!(resolve(Some(&name), Language::BENGALI), "Rose");
//! ```

mod language;
mod metrics;
pub(crate) mod registry;
mod text;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry, FALLBACK_CHAIN};
pub use text::{resolve, MultilingualText};

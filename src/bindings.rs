//! Language-aware bindings for views.
//!
//! [`LanguageState`] holds the active UI language and notifies subscribers
//! when it changes. [`LocalizedText`] re-resolves a multilingual value on
//! every change; [`DynamicTranslation`] re-translates a source string in a
//! background task and exposes a loading flag while the request is in flight.

use crate::i18n::{resolve, Language, MultilingualText};
use crate::translation::Translator;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Active UI language provider.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone)]
pub struct LanguageState {
    tx: Arc<watch::Sender<Language>>,
}

impl LanguageState {
    pub fn new(initial: Language) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Language {
        *self.tx.borrow()
    }

    /// Switch the active language. Subscribers are only notified when the
    /// language actually changes.
    pub fn change_language(&self, language: Language) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == language {
                return false;
            }
            *current = language;
            true
        });
        if changed {
            info!("Active language changed to {} ({})", language.name(), language);
        }
    }

    /// Whether the active language is laid out right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.current().is_rtl()
    }

    /// Languages a user can switch between.
    pub fn languages(&self) -> Vec<Language> {
        Language::supported()
    }

    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.tx.subscribe()
    }
}

impl Default for LanguageState {
    fn default() -> Self {
        Self::new(Language::canonical())
    }
}

/// A multilingual value resolved for the active language.
///
/// Resolution is synchronous and local, so `text` always reflects the
/// language that is active right now and there is no loading state.
#[derive(Debug)]
pub struct LocalizedText {
    value: Option<MultilingualText>,
    language: watch::Receiver<Language>,
}

impl LocalizedText {
    pub fn new(value: Option<MultilingualText>, state: &LanguageState) -> Self {
        Self {
            value,
            language: state.subscribe(),
        }
    }

    /// Text of the bound value in the active language.
    pub fn text(&self) -> &str {
        let current = *self.language.borrow();
        resolve(self.value.as_ref(), current)
    }

    pub fn set_value(&mut self, value: Option<MultilingualText>) {
        self.value = value;
    }

    /// Wait for the next language change and return the re-resolved text.
    ///
    /// Returns `None` once the language provider is gone.
    pub async fn changed(&mut self) -> Option<&str> {
        self.language.changed().await.ok()?;
        let _ = self.language.borrow_and_update();
        Some(self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationPhase {
    /// Nothing requested yet; text is the source text
    Idle,
    /// A translation for the active language is pending
    Loading,
    /// Text is final for the active language
    Settled,
}

/// Text to translate and the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSource {
    pub text: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationState {
    pub phase: TranslationPhase,
    pub text: String,
    /// Language the state was produced for
    pub target: Language,
    /// Source the state was produced from
    pub source: TranslationSource,
}

impl TranslationState {
    pub fn is_loading(&self) -> bool {
        self.phase == TranslationPhase::Loading
    }

    fn is_for(&self, target: Language, source: &TranslationSource) -> bool {
        self.target == target && self.source == *source
    }
}

/// A source string machine-translated into the active language.
///
/// A background task re-translates on every language change. The state
/// reported by this handle is always about the active language: right
/// after a switch it is `Loading` (keeping the previous text) until the
/// task settles the new translation. When the active language equals the
/// source language the source text is settled directly with no loading
/// state. The task stops once this handle or the language provider is
/// dropped; an in-flight request is allowed to finish first.
#[derive(Debug)]
pub struct DynamicTranslation {
    state: watch::Receiver<TranslationState>,
    source: watch::Sender<TranslationSource>,
    language: watch::Receiver<Language>,
}

impl DynamicTranslation {
    /// Start the binding.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn(
        translator: Arc<Translator>,
        source_text: impl Into<String>,
        source_language: Language,
        languages: &LanguageState,
    ) -> Self {
        let source = TranslationSource {
            text: source_text.into(),
            language: source_language,
        };
        let (state_tx, state_rx) = watch::channel(TranslationState {
            phase: TranslationPhase::Idle,
            text: source.text.clone(),
            target: languages.current(),
            source: source.clone(),
        });
        let (source_tx, source_rx) = watch::channel(source);

        tokio::spawn(run_dynamic_translation(
            translator,
            languages.subscribe(),
            source_rx,
            state_tx,
        ));

        Self {
            state: state_rx,
            source: source_tx,
            language: languages.subscribe(),
        }
    }

    /// State for the active language and current source.
    pub fn state(&self) -> TranslationState {
        let target = *self.language.borrow();
        let source = self.source.borrow().clone();

        if target == source.language {
            return TranslationState {
                phase: TranslationPhase::Settled,
                text: source.text.clone(),
                target,
                source,
            };
        }

        let stored = self.state.borrow().clone();
        if stored.is_for(target, &source) {
            return stored;
        }

        TranslationState {
            phase: TranslationPhase::Loading,
            text: stored.text,
            target,
            source,
        }
    }

    pub fn text(&self) -> String {
        self.state().text
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// Replace the source text and language; triggers a new translation.
    pub fn set_source(&self, text: impl Into<String>, language: Language) {
        self.source.send_replace(TranslationSource {
            text: text.into(),
            language,
        });
    }

    /// Wait for the background task to publish a new state.
    ///
    /// Returns `None` once the background task has stopped.
    pub async fn changed(&mut self) -> Option<TranslationState> {
        self.state.changed().await.ok()?;
        let _ = self.state.borrow_and_update();
        Some(self.state())
    }

    /// Wait until the text is settled for the active language and source.
    pub async fn settled(&mut self) -> TranslationState {
        let language = &self.language;
        let source = &self.source;
        let _ = self
            .state
            .wait_for(|state| {
                let target = *language.borrow();
                let source = source.borrow();
                target == source.language
                    || (state.phase == TranslationPhase::Settled && state.is_for(target, &source))
            })
            .await;
        self.state()
    }
}

async fn run_dynamic_translation(
    translator: Arc<Translator>,
    mut language: watch::Receiver<Language>,
    mut source: watch::Receiver<TranslationSource>,
    state: watch::Sender<TranslationState>,
) {
    loop {
        let target = *language.borrow_and_update();
        let current = source.borrow_and_update().clone();

        let text = if target == current.language {
            current.text.clone()
        } else {
            state.send_modify(|pending| {
                pending.phase = TranslationPhase::Loading;
                pending.target = target;
                pending.source = current.clone();
            });
            translator
                .translate(&current.text, target, current.language)
                .await
        };
        state.send_replace(TranslationState {
            phase: TranslationPhase::Settled,
            text,
            target,
            source: current,
        });

        tokio::select! {
            changed = language.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = source.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = state.closed() => break,
        }
    }
    debug!("Dynamic translation binding stopped");
}

use crate::cache::{CacheKey, TranslationCache};
use crate::config::Config;
use crate::i18n::{resolve, Language, MultilingualText, TranslationMetrics};
use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single request to the translation endpoint produced no text.
///
/// Never returned from the public translate operations: callers get the
/// source text back and the error is logged.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("request to translation endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
}

/// Response body of the machine-translation endpoint.
#[derive(Debug, Deserialize)]
struct TranslationResponse {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// Extract the translated text from a response body.
fn parse_translation_response(body: &str) -> Result<String, TranslationError> {
    let response: TranslationResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;

    response
        .response_data
        .and_then(|data| data.translated_text)
        .ok_or_else(|| {
            TranslationError::MalformedResponse("missing responseData.translatedText".to_string())
        })
}

/// Machine-translation client backed by a shared cache.
///
/// Every failure degrades to the source text; nothing here returns an error
/// to the caller once the translator is built.
pub struct Translator {
    client: reqwest::Client,
    endpoint: String,
    cache: Arc<TranslationCache>,
    metrics: TranslationMetrics,
    auto_translate_delay: Duration,
}

impl Translator {
    /// Build a translator with its own HTTP client.
    ///
    /// Without `request_timeout_secs` the HTTP client default applies.
    pub fn new(config: &Config, cache: Arc<TranslationCache>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .context("Failed to build HTTP client for translation endpoint")?;

        Ok(Self::with_client(client, config, cache))
    }

    /// Build a translator around an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        config: &Config,
        cache: Arc<TranslationCache>,
    ) -> Self {
        Self {
            client,
            endpoint: config.translation_api_url.clone(),
            cache,
            metrics: TranslationMetrics::new(),
            auto_translate_delay: Duration::from_millis(config.auto_translate_delay_ms),
        }
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Translate `text` from `source` to `target`.
    ///
    /// Empty text and same-language pairs are returned unchanged without a
    /// request. Cached translations are returned without a request. On any
    /// endpoint failure the error is logged and `text` is returned.
    pub async fn translate(&self, text: &str, target: Language, source: Language) -> String {
        if text.is_empty() || source == target {
            return text.to_string();
        }

        let key = CacheKey::new(source, target, text);
        if let Some(cached) = self.cache.get(&key) {
            self.metrics.record_cache_hit();
            return cached;
        }
        self.metrics.record_cache_miss();

        match self.request_translation(text, target, source).await {
            Ok(translated) => {
                self.cache.put(key, translated.clone());
                translated
            }
            Err(e) => {
                self.metrics.record_api_failure();
                warn!(
                    "Translation {}|{} failed, keeping source text: {}",
                    source, target, e
                );
                text.to_string()
            }
        }
    }

    /// Translate every text concurrently.
    ///
    /// The output has the same length and order as the input; each element
    /// falls back to its own source text independently.
    pub async fn translate_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        target: Language,
        source: Language,
    ) -> Vec<String> {
        join_all(
            texts
                .iter()
                .map(|text| self.translate(text.as_ref(), target, source)),
        )
        .await
    }

    /// Display text of a multilingual value in `target`.
    ///
    /// Uses the value's own text for `target` when present. Otherwise, if the
    /// value has English text, machine-translates it. Otherwise returns the
    /// offline fallback.
    pub async fn translate_multilingual(
        &self,
        value: Option<&MultilingualText>,
        target: Language,
    ) -> String {
        let Some(value) = value else {
            return String::new();
        };

        if let MultilingualText::Plain(text) = value {
            return text.clone();
        }

        if let Some(direct) = value.get(target).filter(|text| !text.is_empty()) {
            return direct.to_string();
        }

        let english = Language::ENGLISH;
        match value.get(english).filter(|text| !text.is_empty()) {
            Some(text) if target != english => self.translate(text, target, english).await,
            _ => resolve(Some(value), target).to_string(),
        }
    }

    /// Fill in every supported language from one source text.
    ///
    /// Requests run one at a time with a fixed pause between them to stay
    /// under the endpoint's rate limit. Languages whose translation failed
    /// carry the source text.
    pub async fn auto_translate_to_all(&self, text: &str, source: Language) -> MultilingualText {
        let mut entries = vec![(source, text.to_string())];

        let targets: Vec<Language> = Language::supported()
            .into_iter()
            .filter(|language| *language != source)
            .collect();

        for (i, target) in targets.iter().enumerate() {
            if i > 0 && !self.auto_translate_delay.is_zero() {
                tokio::time::sleep(self.auto_translate_delay).await;
            }
            let translated = self.translate(text, *target, source).await;
            entries.push((*target, translated));
        }

        entries.into_iter().collect()
    }

    /// Issue one request to the translation endpoint.
    async fn request_translation(
        &self,
        text: &str,
        target: Language,
        source: Language,
    ) -> Result<String, TranslationError> {
        self.metrics.record_api_call();
        let langpair = format!("{}|{}", source, target);
        debug!("Requesting translation {} ({} chars)", langpair, text.chars().count());

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TranslationError::Status { status, body });
        }

        parse_translation_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_test_config(api_url: &str) -> Config {
        Config {
            translation_api_url: api_url.to_string(),
            request_timeout_secs: None,
            cache_limit: 100,
            auto_translate_delay_ms: 0,
            default_language: Language::ENGLISH,
        }
    }

    fn create_translator(api_url: &str) -> Translator {
        let config = create_test_config(api_url);
        let cache = Arc::new(TranslationCache::new(config.cache_limit));
        Translator::with_client(reqwest::Client::new(), &config, cache)
    }

    fn create_translation_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "responseData": {
                "translatedText": text,
                "match": 1
            },
            "responseStatus": 200
        })
    }

    // ==================== Response Parsing Tests ====================

    #[test]
    fn test_parse_translation_response() {
        let body = create_translation_response("مرحبا").to_string();
        assert_eq!(parse_translation_response(&body).expect("Should parse"), "مرحبا");
    }

    #[test]
    fn test_parse_translation_response_missing_data() {
        let result = parse_translation_response(r#"{"responseStatus": 403}"#);
        assert!(matches!(result, Err(TranslationError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_translation_response_missing_text() {
        let result = parse_translation_response(r#"{"responseData": {}}"#);
        assert!(matches!(result, Err(TranslationError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_translation_response_not_json() {
        let result = parse_translation_response("<html>oops</html>");
        assert!(matches!(result, Err(TranslationError::MalformedResponse(_))));
    }

    // ==================== Fast Path Tests ====================

    #[tokio::test]
    async fn test_translate_same_language_skips_api_call() {
        // Use an invalid URL to ensure no request is made
        let translator = create_translator("http://invalid-url-should-not-be-called.test");

        let result = translator
            .translate("Hello", Language::BENGALI, Language::BENGALI)
            .await;

        assert_eq!(result, "Hello");
        assert_eq!(translator.metrics().api_calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_empty_text_skips_api_call() {
        let translator = create_translator("http://invalid-url-should-not-be-called.test");

        let result = translator
            .translate("", Language::ARABIC, Language::ENGLISH)
            .await;

        assert_eq!(result, "");
        assert_eq!(translator.metrics().api_calls(), 0);
    }

    // ==================== Endpoint Tests with Wiremock ====================

    #[tokio::test]
    async fn test_translate_success_is_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("q", "Hello"))
            .and(query_param("langpair", "en|ar"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_translation_response("مرحبا")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));

        let first = translator
            .translate("Hello", Language::ARABIC, Language::ENGLISH)
            .await;
        let second = translator
            .translate("Hello", Language::ARABIC, Language::ENGLISH)
            .await;

        assert_eq!(first, "مرحبا");
        assert_eq!(second, "مرحبا");
        assert_eq!(translator.cache_size(), 1);

        let report = translator.metrics().report();
        assert_eq!(report.cache_hits, 1);
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.api_calls, 1);
    }

    #[tokio::test]
    async fn test_translate_server_error_returns_source() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("langpair", "en|bn"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));

        let result = translator
            .translate("Hello", Language::BENGALI, Language::ENGLISH)
            .await;

        assert_eq!(result, "Hello");
        assert_eq!(translator.cache_size(), 0);
        assert_eq!(translator.metrics().api_failures(), 1);
    }

    #[tokio::test]
    async fn test_translate_failure_is_not_cached_and_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2) // one request per call, no retries
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));

        for _ in 0..2 {
            let result = translator
                .translate("Hello", Language::ARABIC, Language::ENGLISH)
                .await;
            assert_eq!(result, "Hello");
        }
    }

    #[tokio::test]
    async fn test_translate_malformed_body_returns_source() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"unexpected": true})),
            )
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));

        let result = translator
            .translate("Water the roses", Language::ARABIC, Language::ENGLISH)
            .await;

        assert_eq!(result, "Water the roses");
        assert_eq!(translator.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_translate_unreachable_endpoint_returns_source() {
        let translator = create_translator("http://127.0.0.1:1/get");

        let result = translator
            .translate("Hello", Language::ARABIC, Language::ENGLISH)
            .await;

        assert_eq!(result, "Hello");
        assert_eq!(translator.metrics().api_failures(), 1);
    }

    #[tokio::test]
    async fn test_zero_timeout_falls_back_to_client_default() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_translation_response("مرحبا"))
                    .set_delay(Duration::from_millis(20)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&format!("{}/get", mock_server.uri()));
        config.request_timeout_secs = Some(0);
        let cache = Arc::new(TranslationCache::new(config.cache_limit));
        let translator = Translator::new(&config, cache).expect("Should build translator");

        let result = translator
            .translate("Hello", Language::ARABIC, Language::ENGLISH)
            .await;

        assert_eq!(result, "مرحبا");
        assert_eq!(translator.metrics().api_failures(), 0);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_new_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_translation_response("হ্যালো")),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));

        translator
            .translate("Hello", Language::BENGALI, Language::ENGLISH)
            .await;
        translator.clear_cache();
        assert_eq!(translator.cache_size(), 0);
        translator
            .translate("Hello", Language::BENGALI, Language::ENGLISH)
            .await;
    }

    // ==================== Batch Tests ====================

    #[tokio::test]
    async fn test_translate_batch_preserves_order() {
        let mock_server = MockServer::start().await;

        // "a" answers last, "b" fails, "c" answers first
        Mock::given(method("GET"))
            .and(query_param("q", "a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_translation_response("A"))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_translation_response("C")))
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));

        let result = translator
            .translate_batch(&["a", "b", "c"], Language::ARABIC, Language::ENGLISH)
            .await;

        assert_eq!(result, vec!["A", "b", "C"]);
    }

    #[tokio::test]
    async fn test_translate_batch_empty() {
        let translator = create_translator("http://invalid-url-should-not-be-called.test");
        let texts: Vec<String> = Vec::new();

        let result = translator
            .translate_batch(&texts, Language::ARABIC, Language::ENGLISH)
            .await;

        assert!(result.is_empty());
    }

    // ==================== Multilingual Tests ====================

    #[tokio::test]
    async fn test_translate_multilingual_prefers_own_text() {
        let translator = create_translator("http://invalid-url-should-not-be-called.test");
        let value = MultilingualText::from_parts("وردة", "Rose", "গোলাপ");

        let result = translator
            .translate_multilingual(Some(&value), Language::BENGALI)
            .await;

        assert_eq!(result, "গোলাপ");
        assert_eq!(translator.metrics().api_calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_multilingual_translates_english() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Rose"))
            .and(query_param("langpair", "en|bn"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_translation_response("গোলাপ")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));
        let value = MultilingualText::from_parts("وردة", "Rose", "");

        let result = translator
            .translate_multilingual(Some(&value), Language::BENGALI)
            .await;

        assert_eq!(result, "গোলাপ");
    }

    #[tokio::test]
    async fn test_translate_multilingual_without_english_uses_fallback() {
        let translator = create_translator("http://invalid-url-should-not-be-called.test");
        let value = MultilingualText::from_parts("وردة", "", "");

        let result = translator
            .translate_multilingual(Some(&value), Language::BENGALI)
            .await;

        assert_eq!(result, "وردة");
        assert_eq!(translator.metrics().api_calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_multilingual_plain_and_absent() {
        let translator = create_translator("http://invalid-url-should-not-be-called.test");
        let plain = MultilingualText::from("Rose");

        assert_eq!(
            translator
                .translate_multilingual(Some(&plain), Language::ARABIC)
                .await,
            "Rose"
        );
        assert_eq!(
            translator.translate_multilingual(None, Language::ARABIC).await,
            ""
        );
    }

    // ==================== Auto-Translate Tests ====================

    #[tokio::test]
    async fn test_auto_translate_to_all_from_english() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("langpair", "en|ar"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_translation_response("مرحبا")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("langpair", "en|bn"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));

        let result = translator
            .auto_translate_to_all("Hello", Language::ENGLISH)
            .await;

        assert_eq!(result.get(Language::ENGLISH), Some("Hello"));
        assert_eq!(result.get(Language::ARABIC), Some("مرحبا"));
        assert_eq!(result.get(Language::BENGALI), Some("Hello"));
    }

    #[tokio::test]
    async fn test_auto_translate_to_all_from_arabic_skips_source() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("langpair", "ar|ar"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_translation_response("Hi")),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let translator = create_translator(&format!("{}/get", mock_server.uri()));

        let result = translator
            .auto_translate_to_all("مرحبا", Language::ARABIC)
            .await;

        assert_eq!(result.get(Language::ARABIC), Some("مرحبا"));
        assert_eq!(result.get(Language::ENGLISH), Some("Hi"));
        assert_eq!(result.get(Language::BENGALI), Some("Hi"));
    }

    #[tokio::test]
    async fn test_auto_translate_to_all_waits_between_requests() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_translation_response("x")))
            .expect(2)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&format!("{}/get", mock_server.uri()));
        config.auto_translate_delay_ms = 100;
        let translator = Translator::with_client(
            reqwest::Client::new(),
            &config,
            Arc::new(TranslationCache::new(10)),
        );

        let start = std::time::Instant::now();
        translator
            .auto_translate_to_all("Hello", Language::ENGLISH)
            .await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(100),
            "Should pause between requests, took {:?}",
            elapsed
        );
    }
}

use crate::config::Config;
use crate::language::map_language_code;
use crate::retry::{with_retry, RetryConfig, Sleeper, TokioSleeper};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// DeepL translate response: `{"translations": [{"text": "..."}]}`
#[derive(Debug, Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// Why a single DeepL attempt failed
#[derive(Debug, Error)]
pub enum DeepLError {
    #[error("rate limited by DeepL (429)")]
    RateLimited,

    #[error("DeepL API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("request to DeepL failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed DeepL response: {0}")]
    Malformed(String),
}

impl DeepLError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DeepLError::RateLimited)
    }
}

/// Outcome of translating one string.
///
/// Every variant carries the text to write out, so callers that only want the
/// string can use [`Translation::text`] and still keep the original on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// The API returned a translation
    Translated(String),
    /// Empty or whitespace-only input, returned as-is without an API call
    Blank(String),
    /// Every attempt failed; the original text is kept
    Failed { original: String, reason: String },
}

impl Translation {
    pub fn text(&self) -> &str {
        match self {
            Translation::Translated(text) | Translation::Blank(text) => text,
            Translation::Failed { original, .. } => original,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Translation::Translated(text) | Translation::Blank(text) => text,
            Translation::Failed { original, .. } => original,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, Translation::Translated(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Translation::Failed { .. })
    }
}

/// Anything that can translate a single string into a target locale.
#[allow(async_fn_in_trait)]
pub trait TextTranslator {
    async fn translate(&self, text: &str, locale: &str) -> Translation;
}

/// DeepL `/v2/translate` client with retries.
///
/// Never returns an error: when every attempt fails the result is
/// [`Translation::Failed`] holding the original text.
pub struct DeepLClient<S = TokioSleeper> {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    source_lang: String,
    retry: RetryConfig,
    sleeper: S,
}

impl DeepLClient<TokioSleeper> {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.deepl_api_url.clone(),
            api_key: config.deepl_api_key.clone(),
            source_lang: config.source_lang.clone(),
            retry: RetryConfig::deepl()
                .with_max_attempts(config.max_attempts)
                .with_rate_limit_cooldown(config.rate_limit_cooldown),
            sleeper: TokioSleeper,
        })
    }
}

impl<S: Sleeper> DeepLClient<S> {
    /// Replace the clock used for backoff and cooldown waits
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> DeepLClient<T> {
        DeepLClient {
            client: self.client,
            api_url: self.api_url,
            api_key: self.api_key,
            source_lang: self.source_lang,
            retry: self.retry,
            sleeper,
        }
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Translate from the configured source language with the configured attempts
    pub async fn translate_text(&self, text: &str, target_locale: &str) -> Translation {
        self.translate_text_with(
            text,
            target_locale,
            &self.source_lang,
            self.retry.max_attempts,
        )
        .await
    }

    pub async fn translate_text_with(
        &self,
        text: &str,
        target_locale: &str,
        source_lang: &str,
        max_attempts: u32,
    ) -> Translation {
        if text.trim().is_empty() {
            return Translation::Blank(text.to_string());
        }

        let target_lang = map_language_code(target_locale);
        let retry = self.retry.clone().with_max_attempts(max_attempts);

        let result = with_retry(
            &retry,
            &self.sleeper,
            &format!("DeepL translation to {}", target_lang),
            || self.request(text, &target_lang, source_lang),
            DeepLError::is_rate_limited,
        )
        .await;

        match result {
            Ok(translated) => Translation::Translated(translated),
            Err(e) => {
                let reason = e.to_string();
                warn!(
                    "Translation error, keeping original text: {}",
                    truncate_for_log(&reason, 100)
                );
                Translation::Failed {
                    original: text.to_string(),
                    reason,
                }
            }
        }
    }

    async fn request(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> Result<String, DeepLError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&[
                ("text", text),
                ("target_lang", target_lang),
                ("source_lang", source_lang),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DeepLError::RateLimited);
        }
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(DeepLError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: DeepLResponse =
            serde_json::from_str(&body).map_err(|e| DeepLError::Malformed(e.to_string()))?;

        parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| DeepLError::Malformed("response contained no translations".to_string()))
    }
}

impl<S: Sleeper> TextTranslator for DeepLClient<S> {
    async fn translate(&self, text: &str, locale: &str) -> Translation {
        self.translate_text(text, locale).await
    }
}

/// Cut a message to at most `max` characters for log output
pub(crate) fn truncate_for_log(message: &str, max: usize) -> String {
    match message.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message.to_string(),
    }
}

//! Recursive translation of localization documents.
//!
//! A document is walked depth-first in key order. String leaves are sent to a
//! [`TextTranslator`]; everything else keeps its value, so the output always
//! has exactly the input's shape. Subtrees named by a pass-through path (such
//! as `books.languages`, the list of language display names) are copied
//! verbatim.

use crate::config::Config;
use crate::retry::Sleeper;
use crate::translation::TextTranslator;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Leaves sent to the translator while walking one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    pub translated: u64,
    pub failed: u64,
}

pub struct DocumentTranslator<'a, T, S> {
    translator: &'a T,
    sleeper: &'a S,
    pass_through: Vec<Vec<String>>,
    pacing_delay: Duration,
    progress_interval: u64,
}

impl<'a, T: TextTranslator, S: Sleeper> DocumentTranslator<'a, T, S> {
    pub fn new(translator: &'a T, sleeper: &'a S) -> Self {
        Self {
            translator,
            sleeper,
            pass_through: Vec::new(),
            pacing_delay: Duration::from_millis(100),
            progress_interval: 50,
        }
    }

    pub fn from_config(config: &Config, translator: &'a T, sleeper: &'a S) -> Self {
        Self::new(translator, sleeper)
            .with_pass_through(&config.pass_through_paths)
            .with_pacing_delay(config.pacing_delay)
            .with_progress_interval(config.progress_interval)
    }

    /// Dotted key paths (from the document root) to copy without translating
    pub fn with_pass_through<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.pass_through = paths
            .into_iter()
            .map(|p| p.as_ref().split('.').map(str::to_string).collect())
            .collect();
        self
    }

    /// Pause inserted after every translated leaf
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Translate a whole document, logging each top-level section as it starts.
    pub async fn translate_document(
        &self,
        document: &Value,
        locale: &str,
        stats: &mut TranslationStats,
    ) -> Value {
        let Value::Object(sections) = document else {
            return self.translate_value(document, locale, stats).await;
        };

        let mut out = Map::with_capacity(sections.len());
        for (key, section) in sections {
            let path = vec![key.as_str()];
            if self.is_pass_through(&path) {
                debug!("  Keeping {} untranslated", key);
                out.insert(key.clone(), section.clone());
                continue;
            }

            info!("  Translating section: {}", key);
            let translated = self.walk(section, path, locale, stats).await;
            out.insert(key.clone(), translated);
        }
        Value::Object(out)
    }

    /// Translate any value, treating it as the document root for pass-through paths.
    pub async fn translate_value(
        &self,
        value: &Value,
        locale: &str,
        stats: &mut TranslationStats,
    ) -> Value {
        self.walk(value, Vec::new(), locale, stats).await
    }

    fn walk<'f>(
        &'f self,
        value: &'f Value,
        path: Vec<&'f str>,
        locale: &'f str,
        stats: &'f mut TranslationStats,
    ) -> LocalBoxFuture<'f, Value>
    where
        T: 'f,
        S: 'f,
    {
        async move {
            match value {
                Value::Object(map) => {
                    let mut out = Map::with_capacity(map.len());
                    for (key, child) in map {
                        let mut child_path = path.clone();
                        child_path.push(key.as_str());

                        let translated = if self.is_pass_through(&child_path) {
                            child.clone()
                        } else {
                            self.walk(child, child_path, locale, &mut *stats).await
                        };
                        out.insert(key.clone(), translated);
                    }
                    Value::Object(out)
                }
                // Only objects and strings inside arrays are translated;
                // nested arrays and scalars are kept as they are
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::Object(_) | Value::String(_) => {
                                out.push(self.walk(item, path.clone(), locale, &mut *stats).await)
                            }
                            other => out.push(other.clone()),
                        }
                    }
                    Value::Array(out)
                }
                Value::String(text) if !text.trim().is_empty() => {
                    Value::String(self.translate_leaf(text, locale, stats).await)
                }
                other => other.clone(),
            }
        }
        .boxed_local()
    }

    async fn translate_leaf(
        &self,
        text: &str,
        locale: &str,
        stats: &mut TranslationStats,
    ) -> String {
        stats.translated += 1;
        if stats.translated % self.progress_interval == 0 {
            info!("    {} translations completed...", stats.translated);
        }

        let result = self.translator.translate(text, locale).await;
        if result.is_failed() {
            stats.failed += 1;
        }

        if !self.pacing_delay.is_zero() {
            self.sleeper.sleep(self.pacing_delay).await;
        }

        result.into_text()
    }

    fn is_pass_through(&self, path: &[&str]) -> bool {
        self.pass_through.iter().any(|skip| {
            skip.len() == path.len() && skip.iter().zip(path).all(|(a, b)| a == b)
        })
    }
}

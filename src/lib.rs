//! Translate JSON localization files in place with the DeepL API.
//!
//! The pieces, bottom-up:
//!
//! - `language`: locale tag to DeepL language tag mapping
//! - `retry`: backoff, rate-limit cooldown and the `Sleeper` clock
//! - `translation`: DeepL client and the `TextTranslator` trait
//! - `document`: recursive walk translating the string leaves of a document
//! - `batch`: per-file driver with the already-translated check

pub mod batch;
pub mod config;
pub mod document;
pub mod language;
pub mod retry;
pub mod translation;

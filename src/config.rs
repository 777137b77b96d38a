use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Locales translated when `TARGET_LOCALES` is not set.
pub const DEFAULT_TARGET_LOCALES: &[&str] = &[
    "zh", "hi", "es", "pt", "ru", "it", "ko", "uk", "ku", "ro", "bg", "sr", "hu", "cs", "pl", "sk",
    "sl", "mk", "hy", "mr", "te", "gu", "ml", "kn", "or",
];

pub const DEFAULT_DEEPL_API_URL: &str = "https://api-free.deepl.com/v2/translate";

#[derive(Debug, Clone)]
pub struct Config {
    // DeepL
    pub deepl_api_key: String,
    pub deepl_api_url: String,
    pub source_lang: String,

    // Files
    pub messages_dir: PathBuf,
    pub reference_file: String,
    pub target_locales: Vec<String>,
    /// Dotted key paths copied verbatim (e.g. `books.languages`)
    pub pass_through_paths: Vec<String>,

    // Retry and pacing
    pub max_attempts: u32,
    pub request_timeout: Duration,
    pub rate_limit_cooldown: Duration,
    pub pacing_delay: Duration,
    pub progress_interval: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // DeepL
            deepl_api_key: std::env::var("DEEPL_API_KEY").context("DEEPL_API_KEY not set")?,
            deepl_api_url: std::env::var("DEEPL_API_URL")
                .unwrap_or_else(|_| DEFAULT_DEEPL_API_URL.to_string()),
            source_lang: std::env::var("DEEPL_SOURCE_LANG").unwrap_or_else(|_| "EN".to_string()),

            // Files
            messages_dir: std::env::var("MESSAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            reference_file: std::env::var("REFERENCE_FILE")
                .unwrap_or_else(|_| "en.json".to_string()),
            target_locales: std::env::var("TARGET_LOCALES")
                .ok()
                .map(|v| parse_list(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| {
                    DEFAULT_TARGET_LOCALES
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
            pass_through_paths: std::env::var("PASS_THROUGH_PATHS")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| vec!["books.languages".to_string()]),

            // Retry and pacing
            max_attempts: std::env::var("MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &u32| *n >= 1)
                .unwrap_or(3),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            rate_limit_cooldown: Duration::from_secs(
                std::env::var("RATE_LIMIT_COOLDOWN_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            pacing_delay: Duration::from_millis(
                std::env::var("PACING_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100),
            ),
            progress_interval: std::env::var("PROGRESS_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &u64| *n >= 1)
                .unwrap_or(50),
        })
    }

    /// API key shortened for log output
    pub fn masked_api_key(&self) -> String {
        let prefix: String = self.deepl_api_key.chars().take(8).collect();
        format!("{}...", prefix)
    }

    /// Full path of the baseline reference document
    pub fn reference_path(&self) -> PathBuf {
        self.messages_dir.join(&self.reference_file)
    }
}

/// Split a comma-separated env value, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "DEEPL_API_KEY",
        "DEEPL_API_URL",
        "DEEPL_SOURCE_LANG",
        "MESSAGES_DIR",
        "REFERENCE_FILE",
        "TARGET_LOCALES",
        "PASS_THROUGH_PATHS",
        "MAX_ATTEMPTS",
        "REQUEST_TIMEOUT_SECS",
        "RATE_LIMIT_COOLDOWN_SECS",
        "PACING_DELAY_MS",
        "PROGRESS_INTERVAL",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_key() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("DEEPL_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("DEEPL_API_KEY", "abc123:fx");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.deepl_api_key, "abc123:fx");
        assert_eq!(config.deepl_api_url, DEFAULT_DEEPL_API_URL);
        assert_eq!(config.source_lang, "EN");
        assert_eq!(config.messages_dir, PathBuf::from("."));
        assert_eq!(config.reference_file, "en.json");
        assert_eq!(config.target_locales.len(), 25);
        assert_eq!(config.target_locales[0], "zh");
        assert_eq!(config.pass_through_paths, vec!["books.languages"]);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.rate_limit_cooldown, Duration::from_secs(10));
        assert_eq!(config.pacing_delay, Duration::from_millis(100));
        assert_eq!(config.progress_interval, 50);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("DEEPL_API_KEY", "key");
        std::env::set_var("MESSAGES_DIR", "/tmp/messages");
        std::env::set_var("TARGET_LOCALES", "de, fr ,,ku");
        std::env::set_var("PASS_THROUGH_PATHS", "books.languages,meta.codes");
        std::env::set_var("MAX_ATTEMPTS", "5");
        std::env::set_var("PACING_DELAY_MS", "0");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.messages_dir, PathBuf::from("/tmp/messages"));
        assert_eq!(config.target_locales, vec!["de", "fr", "ku"]);
        assert_eq!(
            config.pass_through_paths,
            vec!["books.languages", "meta.codes"]
        );
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.pacing_delay, Duration::ZERO);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("DEEPL_API_KEY", "key");
        std::env::set_var("MAX_ATTEMPTS", "0");
        std::env::set_var("PROGRESS_INTERVAL", "lots");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.progress_interval, 50);

        clear_env();
    }

    #[test]
    fn test_masked_api_key() {
        let mut config = test_config();
        config.deepl_api_key = "b80f08d3-407a-4af5-981b".to_string();
        assert_eq!(config.masked_api_key(), "b80f08d3...");
    }

    #[test]
    fn test_reference_path() {
        let config = test_config();
        assert_eq!(config.reference_path(), PathBuf::from("msgs/en.json"));
    }

    fn test_config() -> Config {
        Config {
            deepl_api_key: "test-key".to_string(),
            deepl_api_url: DEFAULT_DEEPL_API_URL.to_string(),
            source_lang: "EN".to_string(),
            messages_dir: PathBuf::from("msgs"),
            reference_file: "en.json".to_string(),
            target_locales: vec!["de".to_string()],
            pass_through_paths: vec!["books.languages".to_string()],
            max_attempts: 3,
            request_timeout: Duration::from_secs(30),
            rate_limit_cooldown: Duration::from_secs(10),
            pacing_delay: Duration::ZERO,
            progress_interval: 50,
        }
    }
}

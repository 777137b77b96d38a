use crate::config::Config;
use crate::document::{DocumentTranslator, TranslationStats};
use crate::language::{is_aliased, map_language_code};
use crate::retry::Sleeper;
use crate::translation::{truncate_for_log, TextTranslator};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

/// Section and key holding the "already translated" marker (`common.welcome`)
const MARKER_SECTION: &str = "common";
const MARKER_KEY: &str = "welcome";
/// Marker value of a file that was copied from English but never translated
const UNTRANSLATED_MARKER: &str = "Welcome";

/// One locale file to translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    pub file_name: String,
    pub locale: String,
}

impl TargetFile {
    pub fn for_locale(locale: &str) -> Self {
        Self {
            file_name: format!("{}.json", locale),
            locale: locale.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Translated {
        stats: TranslationStats,
        elapsed: Duration,
    },
    AlreadyTranslated,
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub target: TargetFile,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn translated_files(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Translated { .. }))
    }

    pub fn skipped_files(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::AlreadyTranslated))
    }

    pub fn missing_files(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Missing))
    }

    pub fn failed_files(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed(_)))
    }

    /// Leaf translations across all files, and how many of them failed
    pub fn totals(&self) -> TranslationStats {
        self.files
            .iter()
            .filter_map(|f| match &f.status {
                FileStatus::Translated { stats, .. } => Some(*stats),
                _ => None,
            })
            .fold(TranslationStats::default(), |acc, s| TranslationStats {
                translated: acc.translated + s.translated,
                failed: acc.failed + s.failed,
            })
    }

    pub fn status_of(&self, file_name: &str) -> Option<&FileStatus> {
        self.files
            .iter()
            .find(|f| f.target.file_name == file_name)
            .map(|f| &f.status)
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.status)).count()
    }
}

/// Target files in the configured order
pub fn target_files(config: &Config) -> Vec<TargetFile> {
    config
        .target_locales
        .iter()
        .map(|locale| TargetFile::for_locale(locale))
        .collect()
}

/// Translate every configured locale file in place.
///
/// Fails only when the reference document cannot be loaded. Problems with an
/// individual target file are logged and recorded in the report, and the
/// batch moves on to the next file.
pub async fn run<T: TextTranslator, S: Sleeper>(
    config: &Config,
    translator: &T,
    sleeper: &S,
) -> Result<BatchReport> {
    let reference_path = config.reference_path();
    let reference = load_document(&reference_path)
        .with_context(|| format!("Reference file unusable: {}", reference_path.display()))?;
    let reference_marker = marker(&reference)
        .unwrap_or(UNTRANSLATED_MARKER)
        .to_string();

    let doc_translator = DocumentTranslator::from_config(config, translator, sleeper);
    let targets = target_files(config);
    let total = targets.len();
    let start = Instant::now();
    let mut files = Vec::with_capacity(total);

    for (index, target) in targets.into_iter().enumerate() {
        let current = index + 1;
        info!(
            "[{}/{}] {} ({}) translating...",
            current, total, target.file_name, target.locale
        );
        if is_aliased(&target.locale) {
            info!(
                "  No direct DeepL support for '{}', using {} as the closest language",
                target.locale,
                map_language_code(&target.locale)
            );
        }

        let status = translate_file(config, &doc_translator, &target, &reference_marker).await;

        if let FileStatus::Translated { stats, elapsed } = &status {
            info!("  ✓ {} translated and saved", target.file_name);
            info!(
                "     {} translations ({} failed), {:.1} seconds ({:.1} minutes)",
                stats.translated,
                stats.failed,
                elapsed.as_secs_f64(),
                elapsed.as_secs_f64() / 60.0
            );

            let overall = start.elapsed();
            let remaining = overall.div_f64(current as f64) * (total - current) as u32;
            info!(
                "     Total: {:.1} min, remaining: ~{:.1} min",
                overall.as_secs_f64() / 60.0,
                remaining.as_secs_f64() / 60.0
            );
        }

        files.push(FileOutcome { target, status });
    }

    Ok(BatchReport {
        files,
        elapsed: start.elapsed(),
    })
}

async fn translate_file<T: TextTranslator, S: Sleeper>(
    config: &Config,
    doc_translator: &DocumentTranslator<'_, T, S>,
    target: &TargetFile,
    reference_marker: &str,
) -> FileStatus {
    let path = config.messages_dir.join(&target.file_name);
    if !path.exists() {
        warn!("  File not found: {}", path.display());
        return FileStatus::Missing;
    }

    match process_file(&path, &target.locale, doc_translator, reference_marker).await {
        Ok(status) => status,
        Err(e) => {
            error!("  Error: {}", truncate_for_log(&format!("{:#}", e), 200));
            error!("{:?}", e);
            FileStatus::Failed(format!("{:#}", e))
        }
    }
}

async fn process_file<T: TextTranslator, S: Sleeper>(
    path: &Path,
    locale: &str,
    doc_translator: &DocumentTranslator<'_, T, S>,
    reference_marker: &str,
) -> Result<FileStatus> {
    let file_start = Instant::now();
    let document = load_document(path)?;

    if is_already_translated(&document, reference_marker) {
        info!("  {} already translated, skipping", path.display());
        return Ok(FileStatus::AlreadyTranslated);
    }

    info!("  Starting translation...");
    let mut stats = TranslationStats::default();
    let translated = doc_translator
        .translate_document(&document, locale, &mut stats)
        .await;

    save_document(path, &translated)?;

    Ok(FileStatus::Translated {
        stats,
        elapsed: file_start.elapsed(),
    })
}

/// Whether a target file already holds translated content.
///
/// The marker `common.welcome` counts as translated when it is set and differs
/// from both the untranslated default and the reference document's value.
pub fn is_already_translated(document: &Value, reference_marker: &str) -> bool {
    let current = marker(document).unwrap_or("");
    !current.is_empty() && current != UNTRANSLATED_MARKER && current != reference_marker
}

fn marker(document: &Value) -> Option<&str> {
    document.get(MARKER_SECTION)?.get(MARKER_KEY)?.as_str()
}

pub fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a document as 2-space indented UTF-8 JSON, replacing the file atomically.
pub fn save_document(path: &Path, document: &Value) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let json = serde_json::to_string_pretty(document).context("Failed to serialize document")?;

    let mut temp_file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    temp_file
        .write_all(json.as_bytes())
        .context("Failed to write temporary file")?;

    // Keep the permissions of the file being replaced
    if let Ok(metadata) = fs::metadata(path) {
        let _ = temp_file.as_file().set_permissions(metadata.permissions());
    }

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

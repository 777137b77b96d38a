use anyhow::Result;
use chrono::Local;
use locale_translator::{batch, config::Config, retry::TokioSleeper, translation::DeepLClient};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the shell)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_translator=info".parse()?),
        )
        .init();

    // Load configuration from environment
    let config = Config::from_env()?;
    let working_dir = std::fs::canonicalize(&config.messages_dir)
        .unwrap_or_else(|_| config.messages_dir.clone());

    info!("{}", "=".repeat(80));
    info!("Translating locale files with DeepL");
    info!("{}", "=".repeat(80));
    info!("Working directory: {}", working_dir.display());
    info!("Started at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("API URL: {}", config.deepl_api_url);
    info!("API key: {}", config.masked_api_key());
    info!(
        "{} target files, {:?} pause between requests; this will take a while",
        config.target_locales.len(),
        config.pacing_delay
    );

    let client = DeepLClient::new(&config)?;
    let report = batch::run(&config, &client, &TokioSleeper).await?;

    let totals = report.totals();
    info!("{}", "=".repeat(80));
    info!(
        "Done: {} translated, {} already translated, {} missing, {} failed",
        report.translated_files(),
        report.skipped_files(),
        report.missing_files(),
        report.failed_files()
    );
    info!(
        "{} strings sent to DeepL, {} kept untranslated after errors",
        totals.translated, totals.failed
    );
    info!("Total time: {:.1} minutes", report.elapsed.as_secs_f64() / 60.0);
    info!("Finished at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(80));

    Ok(())
}

use chrono::Utc;
use rawg_bronze::shell;
use rawg_bronze::shell::config::Config;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    // The run is named after the UTC day it started, even if it ends after midnight.
    let run_date = Utc::now().date_naive();

    let report = shell::run(&config, run_date).await?;
    for partition in &report.partitions {
        tracing::info!(key = %partition, "landed");
    }
    tracing::info!(run_id = %report.run_id, watermark = %report.watermark, "extraction succeeded");
    Ok(())
}

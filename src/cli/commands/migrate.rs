use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(cfg: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = crate::cli::connect(cfg).await?;
    DatabaseManager::migrate(&pool).await?;

    utils::output_success(&output_format, "migrations complete", None)
}

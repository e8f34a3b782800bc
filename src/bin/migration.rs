use anyhow::Result;
use tracing::info;

use counterbook::migrator::run_migration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting database migration");

    let database_url = std::env::var("APP__DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| "sqlite::memory:".to_string());

    run_migration(&database_url).await?;

    info!("Migration completed successfully");

    Ok(())
}

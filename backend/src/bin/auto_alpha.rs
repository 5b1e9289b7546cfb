//! Daily reconciliation: mark scheduled employees with no attendance record
//! as absent without notice. Scheduled shortly before midnight.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presensi_backend::{
    config::Config, db::connection::create_pool, services::reconciliation,
    utils::time::today_local,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presensi_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let today = today_local(&config.time_zone);
    let created = reconciliation::auto_alpha(&pool, &config, today)
        .await
        .map_err(|e| anyhow::anyhow!("auto alpha failed: {}", e))?;

    tracing::info!(date = %today, created, "auto alpha finished");

    Ok(())
}

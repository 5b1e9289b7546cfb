//! Daily reconciliation: force-close sessions nobody clocked out of.
//! Scheduled shortly before midnight.

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presensi_backend::{
    config::Config, db::connection::create_pool, services::reconciliation,
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

    let report = reconciliation::auto_clock_out(&pool, &config, Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("auto clock-out failed: {}", e))?;

    tracing::info!(
        forced = report.forced,
        skipped_night = report.skipped_night,
        skipped_not_due = report.skipped_not_due,
        "auto clock-out finished"
    );

    Ok(())
}

//! Media quota enforcement, meant to run from cron.

use gnss_portal::{Config, service::cleanup::enforce_quota};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cfg = Config::load()?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.cleanup.log_file)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    // failures are logged, not propagated: the job always exits cleanly
    if let Err(e) = enforce_quota(&cfg.cleanup.folder, cfg.cleanup.max_size_mb) {
        error!("Cleanup of {} failed: {e}", cfg.cleanup.folder.display());
    }
    Ok(())
}

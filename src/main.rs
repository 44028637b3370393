use gnss_portal::{
    Config,
    api::SftpConnector,
    db::PortalStorage,
    router::{PortalState, portal_router},
};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let mut cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    if cfg.auth.secret_key.is_empty() {
        warn!("auth.secret_key not set; using a random key, tokens will not survive a restart");
        cfg.auth.secret_key = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    }

    info!(
        database_url = %cfg.database.url,
        media_root = %cfg.server.media_root.display(),
        remote = %format!("{}@{}:{}", cfg.remote.username, cfg.remote.host, cfg.remote.port),
        loglevel = %cfg.loglevel,
    );

    tokio::fs::create_dir_all(&cfg.server.media_root).await?;
    let storage = PortalStorage::connect(&cfg.database.url).await?;
    let remote = Arc::new(SftpConnector::new(&cfg.remote));

    let addr = cfg.server.listen_addr.clone();
    let state = PortalState::new(storage, Arc::new(cfg), remote);
    let app = portal_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

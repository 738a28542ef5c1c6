use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use kennel::config::KennelConfig;
use kennel::engine::Engine;
use kennel::notify::NotifyHub;
use kennel::publisher;

/// How often the compactor checks the journal size.
const COMPACT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = KennelConfig::from_env();
    kennel::observability::init(config.metrics_port)?;

    // Ensure data directory exists
    std::fs::create_dir_all(&config.data_dir)?;

    let notify = Arc::new(NotifyHub::new());
    let engine = Arc::new(Engine::open(&config, notify)?);

    info!("kennel scheduler started");
    info!("  data_dir: {}", config.data_dir.display());
    info!("  capacity: {}", config.capacity);
    info!("  free space file: {}", config.free_space_path().display());
    info!("  metrics: {}", config.metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let publisher_task = tokio::spawn(publisher::run_publisher(
        engine.clone(),
        config.free_space_path(),
        config.publish_interval,
    ));
    let compactor_task = tokio::spawn(publisher::run_compactor(
        engine.clone(),
        config.compact_threshold,
        COMPACT_CHECK_INTERVAL,
    ));

    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    info!("shutdown signal received");
    publisher_task.abort();
    compactor_task.abort();

    if let Err(e) = engine.shutdown().await {
        tracing::error!("final compaction failed: {e}");
    }
    info!("kennel scheduler stopped");
    Ok(())
}

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use treeboard::*;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(name = NAME, version = VERSION, "starting");

    let device_store = Arc::new(store::DeviceStore::new(
        &app_config.storage.device_states_path,
    ));
    let scoreboard_store = Arc::new(store::ScoreboardStore::new(
        &app_config.storage.scoreboard_path,
    ));
    let registry = Arc::new(
        ingest::DeviceRegistry::load(
            store::DeviceStore::new(&app_config.storage.device_states_path),
            app_config.ingest.device_ids.iter().cloned(),
        )
        .await,
    );

    let worker_config =
        aggregation_worker::AggregationWorkerConfig::try_from(&app_config.aggregation)?;
    let engine = aggregation_worker::start_engine(&scoreboard_store, &worker_config).await;
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = aggregation_worker::spawn(
        engine,
        aggregation_worker::WorkerDeps {
            device_store,
            scoreboard_store: scoreboard_store.clone(),
            shutdown_rx,
        },
        worker_config,
    );

    let app = routes::app(registry, scoreboard_store, &app_config);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(dashboard = %app_config.dashboard.dir, "Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use placedrive_notify::DeadlineSweep;

/// How long to wait for the sweep task after cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Seconds between sweep passes when `SWEEP_INTERVAL_SECS` is not set.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "placedrive_worker=debug,placedrive_notify=debug,placedrive_db=debug,info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = placedrive_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    placedrive_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    placedrive_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Deadline sweep ---
    let interval = sweep_interval_from_env();
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Starting deadline sweep"
    );

    let store = Arc::new(placedrive_db::PgDriveStore::new(pool.clone()));
    let sweep = DeadlineSweep::new(store).with_interval(interval);

    let cancel = CancellationToken::new();
    let sweep_cancel = cancel.clone();
    let sweep_handle = tokio::spawn(async move {
        sweep.run(sweep_cancel).await;
    });

    shutdown_signal().await;

    // --- Graceful shutdown ---
    cancel.cancel();
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, sweep_handle).await;
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Sweep interval from `SWEEP_INTERVAL_SECS`, defaulting to one minute.
fn sweep_interval_from_env() -> Duration {
    let secs = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
    Duration::from_secs(secs)
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

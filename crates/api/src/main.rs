use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_api::background;
use pulse_api::config::ServerConfig;
use pulse_api::notifications::Notifier;
use pulse_api::router::build_app_router;
use pulse_api::state::AppState;
use pulse_events::{EmailConfig, EmailDelivery};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = pulse_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    pulse_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    pulse_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // --- Notifications ---
    let email = match EmailConfig::from_env() {
        Some(email_config) => {
            let delivery =
                EmailDelivery::new(&email_config).expect("Failed to build SMTP transport");
            tracing::info!(host = %email_config.smtp_host, "Email delivery enabled");
            Some(delivery)
        }
        None => {
            tracing::info!("SMTP_HOST not set, email delivery disabled");
            None
        }
    };
    let notifier = Arc::new(Notifier::new(pool.clone(), email));

    // --- Background jobs ---
    let jobs_cancel = CancellationToken::new();

    let deadline_handle = tokio::spawn(background::deadline_risk::run(
        pool.clone(),
        Arc::clone(&notifier),
        config.jobs.clone(),
        jobs_cancel.clone(),
    ));
    let weekly_handle = tokio::spawn(background::weekly_update::run(
        pool.clone(),
        Arc::clone(&notifier),
        config.jobs.clone(),
        jobs_cancel.clone(),
    ));

    // --- App state & router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifier,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, stopping background jobs");

    jobs_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), deadline_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), weekly_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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

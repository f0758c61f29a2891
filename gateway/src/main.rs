//! Gateway main entry point
//!
//! Serves the student portal over HTTP.

use std::sync::Arc;

use auth::{LogNotifier, Notifier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_store::JsonFileStore;

use gateway_lib::{build_router, AppState, GatewayConfig, HttpMailNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!("Starting Gateway v{}", config.version);
    tracing::info!("User records at {}", config.users_path.display());

    let store = Arc::new(JsonFileStore::new(config.users_path.clone()));

    let notifier: Arc<dyn Notifier> = match config.mail.clone() {
        Some(mail) => Arc::new(HttpMailNotifier::new(mail)?),
        None => {
            tracing::warn!("MAIL_API_URL not set, OTP codes will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let bootstrap_admin = config.bootstrap_admin.clone();
    let addr = config.http_addr.clone();
    let state = AppState::new(config, store, notifier)?;

    if let Some(admin) = bootstrap_admin {
        if state.students.ensure_admin(admin).await? {
            tracing::info!("Created bootstrap administrator");
        }
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

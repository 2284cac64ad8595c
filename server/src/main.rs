//! `ZaloBridge` Server - Main Entry Point
//!
//! Exchanges Zalo access tokens for identity-provider sessions.

use anyhow::Result;
use std::time::Duration;
use tracing::info;

use zb_server::auth::ZaloClient;
use zb_server::identity::IdentityClient;
use zb_server::{api, config, db};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zb_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration (fails fast on missing secrets)
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting ZaloBridge Server"
    );

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    // One shared HTTP client with a bounded timeout for every outbound call,
    // so a stalled upstream cannot suspend a handler indefinitely
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let identity = IdentityClient::new(
        http.clone(),
        &config.supabase_url,
        &config.supabase_anon_key,
        &config.supabase_service_role_key,
    );
    let zalo = ZaloClient::new(http, &config.zalo_api_base, &config.zalo_app_secret);

    // Build application state
    let state = api::AppState::new(db_pool, identity, zalo, config.clone());

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

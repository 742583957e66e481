//! LMS Gateway - HTTP API server
//!
//! This is the main entry point for the gateway service. Configuration is
//! read from the environment (see [`GatewayConfig::from_env`]).
//!
//! # Dev Mode
//!
//! Build with `--features dev-mode` to use a mock token service that needs
//! no signing secret. Use tokens in format: `test-token:<user-id>:<role>`

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "dev-mode")]
use lms_auth::MockJwtValidator;
#[cfg(not(feature = "dev-mode"))]
use lms_auth::HmacTokens;
use lms_gateway::{create_router, GatewayConfig, GatewayState};
use lms_service::LmsService;
use lms_store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LMS Gateway");

    let config = GatewayConfig::from_env();
    tracing::info!(
        listen_addr = %config.listen_addr,
        cors_origins = ?config.cors_origins,
        max_body_bytes = config.max_body_bytes,
        seed_demo_data = config.seed_demo_data,
        simulated_latency_ms = config.simulated_latency_ms,
        "Gateway configuration loaded"
    );

    let store = if config.seed_demo_data {
        tracing::info!("Seeding demo data");
        Arc::new(MemoryStore::with_demo_data())
    } else {
        Arc::new(MemoryStore::new())
    };

    // One token service both issues (login) and validates (extractors)
    #[cfg(feature = "dev-mode")]
    let tokens = {
        tracing::warn!("DEV MODE ENABLED - using mock token service");
        tracing::warn!("Use tokens in format: test-token:<user-id>:<role>");
        Arc::new(MockJwtValidator)
    };

    #[cfg(not(feature = "dev-mode"))]
    let tokens = {
        if config.auth.token_secret == lms_auth::AuthConfig::default().token_secret {
            tracing::warn!("TOKEN_SECRET not set - using the built-in development secret");
        }
        Arc::new(HmacTokens::new(config.auth.clone()))
    };

    let lms = Arc::new(LmsService::new(
        store,
        Arc::clone(&tokens),
        config.service_config(),
    ));
    tracing::info!("LMS service initialized");

    let listen_addr = config.listen_addr.clone();
    let state = GatewayState::new(lms, tokens, config);

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Pep-Talk account server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use peptalk_api::{middleware::AppState, router as api_router};
use peptalk_common::Config;
use peptalk_core::{AccountService, BillingService, RevenueCatClient};
use peptalk_db::repositories::{
    BillingEntitlementRepository, BillingWebhookEventRepository, DeletionRequestRepository,
    IdentityRepository, ProfileRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Webhook payloads and deletion reasons are small.
const MAX_BODY_BYTES: usize = 256 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peptalk=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting Pep-Talk account server...");

    // Load configuration
    let config = Config::load()?;
    if config.billing.force_pro_on {
        tracing::warn!("force_pro_on is set: every signed-in viewer is Pro");
    }
    if config.billing.webhook_auth.is_none() {
        tracing::warn!("billing.webhook_auth is not set: billing webhooks will be rejected");
    }

    // Connect to database
    let db = Arc::new(peptalk_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    peptalk_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let identity_repo = IdentityRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let entitlement_repo = BillingEntitlementRepository::new(Arc::clone(&db));
    let event_repo = BillingWebhookEventRepository::new(Arc::clone(&db));
    let deletion_repo = DeletionRequestRepository::new(Arc::clone(&db));

    // Initialize services
    let account_service = AccountService::new(
        identity_repo.clone(),
        profile_repo.clone(),
        entitlement_repo.clone(),
        event_repo.clone(),
        deletion_repo,
        config.billing.force_pro_on,
    );
    let subscribers = Arc::new(RevenueCatClient::new(&config.billing)?);
    let billing_service = BillingService::new(
        identity_repo,
        profile_repo,
        entitlement_repo,
        event_repo,
        subscribers,
        config.billing.clone(),
    );

    let state = AppState {
        account_service,
        billing_service,
    };

    let app = Router::new()
        .nest("/api", api_router(state.clone()))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod seed;

use crate::config::{Config, SeedMode};
use crate::db::Store;
use crate::seed::{Fixtures, SeedState};

/// Shared application state — cheap to clone (store handles are pooled internally).
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub seed: Arc<RwLock<SeedState>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dealership_reviews=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let fixtures = Fixtures::load(&config.reviews_fixture, &config.dealerships_fixture)?;
    info!(
        reviews = fixtures.reviews.len(),
        dealerships = fixtures.dealerships.len(),
        "Loaded fixtures"
    );

    let store = Store::connect(&config).await?;

    let state = AppState {
        store: store.clone(),
        seed: Arc::new(RwLock::new(SeedState::pending())),
    };

    match config.seed_mode {
        SeedMode::Background => {
            tokio::spawn(seed::run(store, fixtures, state.seed.clone()));
        }
        SeedMode::Blocking => seed::run(store, fixtures, state.seed.clone()).await,
        SeedMode::Skip => seed::mark_skipped(&state.seed).await,
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server is running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health))

        // ── Reviews ─────────────────────────────────────────────────────────
        .route("/fetchReviews", get(handlers::reviews::fetch_reviews))
        .route(
            "/fetchReviews/dealer/:id",
            get(handlers::reviews::fetch_dealer_reviews),
        )
        .route("/insert_review", post(handlers::reviews::insert_review))

        // ── Dealerships ─────────────────────────────────────────────────────
        .route("/fetchDealers", get(handlers::dealers::fetch_dealers))
        .route(
            "/fetchDealers/:state",
            get(handlers::dealers::fetch_dealers_by_state),
        )
        .route("/fetchDealer/:id", get(handlers::dealers::fetch_dealer))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

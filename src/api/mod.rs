//! Waypoint REST API
//!
//! HTTP API layer for the store, built with Axum.
//!
//! # Endpoints
//!
//! ## Users
//! - `GET /users/:id` - Get a person
//! - `GET /users/:id/visits` - Visits of a person
//! - `POST /users/new` - Create a person
//! - `POST /users/:id` - Update a person
//!
//! ## Locations
//! - `GET /locations/:id` - Get a place
//! - `GET /locations/:id/avg` - Average mark of a place
//! - `POST /locations/new` - Create a place
//! - `POST /locations/:id` - Update a place
//!
//! ## Visits
//! - `GET /visits/:id` - Get a visit
//! - `POST /visits/new` - Create a visit
//! - `POST /visits/:id` - Update a visit
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! An unknown record always answers 404, even when the request also
//! carries a bad body or bad query parameters.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use waypoint::api::{serve, AppState};
//! use waypoint::config::ApiConfig;
//! use waypoint::storage::Store;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(Store::new(1_503_695_452));
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(store, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let record_routes = Router::new()
        .route(
            "/users/:id",
            get(routes::users::get_user).post(routes::users::post_user),
        )
        .route("/users/:id/visits", get(routes::users::user_visits))
        .route(
            "/locations/:id",
            get(routes::locations::get_location).post(routes::locations::post_location),
        )
        .route("/locations/:id/avg", get(routes::locations::location_average))
        .route(
            "/visits/:id",
            get(routes::visits::get_visit).post(routes::visits::post_visit),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .merge(record_routes)
        .nest("/health", health_routes)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Waypoint API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Waypoint API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

//! Simple Bank API library
//!
//! An in-memory banking demo: users, accounts and transactions over REST.
//! Re-exports modules for integration testing and external use.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod domain;
pub mod ledger;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use ledger::{DeletePolicy, Ledger};

/// Build the application router around a shared ledger.
pub fn build_router(ledger: Arc<Ledger>) -> Router {
    Router::new()
        .route("/", axum::routing::get(index))
        .route("/health", axum::routing::get(health_check))
        .nest("/api/v1", api::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ledger)
}

/// Welcome message for the API root
async fn index() -> &'static str {
    "Welcome to the Simple Bank API!"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

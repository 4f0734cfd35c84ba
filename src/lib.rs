//! FGS Store
//!
//! Storefront, repair desk and back-office service for a phone and
//! electronics repair shop.
//!
//! ## Features
//! - Product catalog with variants, brands and stock badges
//! - Per-user cart and cash-on-delivery checkout
//! - Repair intake and public tracking by reference number
//! - Customer profile, order history and favorites
//! - Staff back-office: catalog, stock, orders, repairs, feedback, dashboard
//! - Streaming shop assistant proxied to an LLM gateway

pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod models;
pub mod publisher;
pub mod routes;
pub mod state;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{AppError, Result};
pub use state::AppState;

/// Build the HTTP application with tracing and permissive CORS.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

//! HTTP read API over the classification graph
//!
//! Routes:
//! - `GET /api/v1/taxon/{rank}/{id}`
//! - `GET /api/v1/taxon/{rank}/{id}/children`
//!
//! Success bodies are `{"data": ...}`; every failure is a 400 with
//! `{"error": "..."}`, including malformed paths and panicking handlers.
//! A trailing slash is ignored.

mod handlers;

pub use handlers::{get_children, get_taxon, ApiError, Data, TaxonResponse};

use crate::query::TaxonQuery;
use crate::storage::TaxonStore;
use axum::extract::Request;
use axum::routing::get;
use axum::{Router, ServiceExt};
use handlers::panic_response;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub query: TaxonQuery,
}

impl AppState {
    pub fn new(store: Arc<dyn TaxonStore>) -> Self {
        Self {
            query: TaxonQuery::new(store),
        }
    }
}

/// Build the API router with tracing, gzip and permissive CORS
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/taxon/{rank}/{id}", get(get_taxon))
        .route("/api/v1/taxon/{rank}/{id}/children", get(get_children))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// The router behind trailing-slash trimming.
///
/// Trimming has to wrap the router; as a route layer it would run after
/// route matching.
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(router(state))
}

/// Serve the API on an already bound listener until the task is cancelled
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "read API listening");
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app(state))).await
}

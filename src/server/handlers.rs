//! Request handlers

use super::AppState;
use crate::graph::{Rank, TaxonId, TaxonNode};
use crate::query::{parse_address, QueryError};
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::{debug, error};

/// Success envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

/// Public view of a taxon node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonResponse {
    pub id: TaxonId,
    pub rank: Rank,
    pub name: String,
    pub url: String,
}

impl From<TaxonNode> for TaxonResponse {
    fn from(node: TaxonNode) -> Self {
        Self {
            id: node.id,
            rank: node.rank,
            name: node.name,
            url: node.url,
        }
    }
}

/// Any failure, rendered as `400 {"error": msg}`
#[derive(Debug)]
pub struct ApiError(String);

impl ApiError {
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError(err.to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError(format!("query task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(error = %self.0, "request failed");
        let body = Json(serde_json::json!({ "error": self.0 }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

/// Body for a handler that panicked; same envelope as every other failure
pub(super) fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    ApiError("internal error".to_string()).into_response()
}

/// `GET /api/v1/taxon/{rank}/{id}`
pub async fn get_taxon(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Data<TaxonResponse>>, ApiError> {
    let Path((rank, id)) = path?;
    let (rank, id) = parse_address(&rank, &id)?;
    let query = state.query.clone();
    let node = tokio::task::spawn_blocking(move || query.get(rank, id)).await??;
    Ok(Json(Data { data: node.into() }))
}

/// `GET /api/v1/taxon/{rank}/{id}/children`
pub async fn get_children(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Data<Vec<TaxonResponse>>>, ApiError> {
    let Path((rank, id)) = path?;
    let (rank, id) = parse_address(&rank, &id)?;
    let query = state.query.clone();
    let children = tokio::task::spawn_blocking(move || query.children(rank, id)).await??;
    Ok(Json(Data {
        data: children.into_iter().map(TaxonResponse::from).collect(),
    }))
}

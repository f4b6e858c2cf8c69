//! HTTP surface for label queries
//!
//! - `GET /api/labels/{type}?label=&page=&page_size=` lists matching labels
//!   for one entity kind or `all`
//! - `GET /healthz` liveness probe

pub mod error;
pub mod health;
pub mod labels;

pub use error::{ApiError, ApiResult};

use axum::{Router, routing::get};
use std::sync::Arc;

use labelscope_labels::LabelQuery;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub query: Arc<LabelQuery>,
}

impl AppState {
    pub fn new(query: LabelQuery) -> Self {
        Self {
            query: Arc::new(query),
        }
    }
}

/// Create the API router with label query state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/labels/{type}", get(labels::list_labels))
        .route("/healthz", get(health::healthz))
        .with_state(state)
}

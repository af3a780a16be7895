//! HTTP API
//!
//! Maps the four key operations onto URL routes and translates store
//! outcomes into status codes:
//!
//! - `POST /set/{key}`: body is the value; 201, or 400/409/413/422/507
//! - `GET /retrieve/{key}`: 200 with the value, or 404
//! - `GET /exists/{key}`: 200 with `true` or `false`
//! - `DELETE /remove/{key}`: 204, or 404
//!
//! Every other method/path pair is 404.

pub mod handlers;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::store::Store;
use handlers::{handle_exists, handle_remove, handle_retrieve, handle_set, not_found};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

/// Build the HTTP router over a store. Request bodies larger than
/// `max_body_bytes` are refused with 413 before reaching the store.
pub fn router(store: Arc<dyn Store>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/set/{key}", post(handle_set))
        .route("/retrieve/{key}", get(handle_retrieve))
        .route("/exists/{key}", get(handle_exists))
        .route("/remove/{key}", delete(handle_remove))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}

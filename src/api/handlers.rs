use axum::{
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::AppState;
use crate::store::StoreError;

/// Whether a path segment can name a key: one or more ASCII letters,
/// digits or underscores. Anything else is left unrouted; key format
/// proper is the store's business.
pub fn is_key_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn set_error_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::StoreFull => StatusCode::INSUFFICIENT_STORAGE,
        StoreError::KeyExists => StatusCode::CONFLICT,
        StoreError::DataExceedsLimit => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// POST /set/{key}
pub async fn handle_set(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    if !is_key_segment(&key) {
        return StatusCode::NOT_FOUND;
    }

    let value = match body {
        Ok(value) => value,
        Err(rejection) => {
            debug!("Unreadable body for key {}: {}", key, rejection);
            // 413 past the body limit, 400 otherwise
            return rejection.status();
        }
    };

    match state.store.set(key, value) {
        Ok(()) => StatusCode::CREATED,
        Err(e) => {
            debug!("Set rejected: {}", e);
            set_error_status(e)
        }
    }
}

/// GET /retrieve/{key}
pub async fn handle_retrieve(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    if !is_key_segment(&key) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.store.get(&key) {
        Some(value) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            value,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /exists/{key}
pub async fn handle_exists(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    if !is_key_segment(&key) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let found = state.store.get(&key).is_some();
    (StatusCode::OK, if found { "true" } else { "false" }).into_response()
}

/// DELETE /remove/{key}
pub async fn handle_remove(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    if !is_key_segment(&key) {
        return StatusCode::NOT_FOUND;
    }

    // the only removal failure is an absent key
    match state.store.remove(&key) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            debug!("Remove rejected: {}", e);
            StatusCode::NOT_FOUND
        }
    }
}

/// Any method/path pair without a route
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::backend::BackendError;

fn status_or_internal(err: &BackendError) -> StatusCode {
    err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(crate) fn relay(body: Value) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) fn relay_serialized<T: serde::Serialize>(body: &T) -> Response {
    match serde_json::to_value(body) {
        Ok(body) => relay(body),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": err.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) fn relay_file(content_type: &str, bytes: Vec<u8>) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type.to_string())], bytes).into_response()
}

pub(crate) fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Method not allowed" })),
    )
        .into_response()
}

pub(crate) fn tutorial_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

pub(crate) fn bad_request(key: &str, message: &str) -> Response {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), Value::String(message.to_string()));
    (StatusCode::BAD_REQUEST, Json(Value::Object(body))).into_response()
}

/// Backend status with `{message}` from the backend's `detail`, or the
/// fallback. Transport failures become 500.
pub(crate) fn message_failure(err: &BackendError, fallback: &str) -> Response {
    let message = err.body_field("detail").unwrap_or(fallback);
    (status_or_internal(err), Json(json!({ "message": message }))).into_response()
}

/// Like [`message_failure`], but a transport failure reports its own cause.
pub(crate) fn message_failure_with_cause(err: &BackendError, fallback: &str) -> Response {
    match err.status() {
        Some(_) => message_failure(err, fallback),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": err.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) fn detail_failure(err: &BackendError, fallback: &str) -> Response {
    let detail = match err.status() {
        Some(_) => err.body_field("detail").unwrap_or(fallback).to_string(),
        None => err.to_string(),
    };
    (status_or_internal(err), Json(json!({ "detail": detail }))).into_response()
}

pub(crate) fn history_failure(err: &BackendError, fallback: &str) -> Response {
    let message = err.body_field("detail").unwrap_or(fallback);
    (
        status_or_internal(err),
        Json(json!({ "message": message, "evaluations": [] })),
    )
        .into_response()
}

/// 404 becomes a descriptive "not found" envelope; anything else is a 500
/// carrying the underlying cause.
pub(crate) fn not_found_or_failure(
    err: &BackendError,
    not_found: (&str, &str),
    failure: &str,
) -> Response {
    if err.is_not_found() {
        let (message, details) = not_found;
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": message, "details": details })),
        )
            .into_response();
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": failure, "details": err.to_string() })),
    )
        .into_response()
}

pub(crate) fn tutorial_failure(err: &BackendError, message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message, "details": err.to_string() })),
    )
        .into_response()
}

pub(crate) fn token_failure(err: &BackendError) -> Response {
    let message = match err.status() {
        Some(_) => err
            .body_field("message")
            .unwrap_or("Failed to validate GitHub token")
            .to_string(),
        None => err.to_string(),
    };
    (
        status_or_internal(err),
        Json(json!({ "valid": false, "message": message })),
    )
        .into_response()
}

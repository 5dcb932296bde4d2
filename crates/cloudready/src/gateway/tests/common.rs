use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query},
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use crate::backend::BackendClient;
use crate::config::BackendConfig;
use crate::gateway::gateway_router;

pub(super) fn inflated_evaluation() -> Value {
    json!({
        "id": "eval-1",
        "project_name": "storefront",
        "timestamp": "2025-03-01T10:00:00",
        "overall_score": 90,
        "readiness_level": "Cloud-Native",
        "job_id": "7",
        "data": {
            "scores": {
                "overall": 90,
                "containerization": 40,
                "configuration": 50,
                "ci_cd": 30,
                "testing": 60
            },
            "recommendations": []
        }
    })
}

pub(super) fn steady_evaluation() -> Value {
    json!({
        "id": "eval-2",
        "project_name": "storefront",
        "timestamp": "2025-02-01T08:30:00",
        "overall_score": 80,
        "readiness_level": "Cloud-Ready",
        "data": {
            "scores": {
                "overall": 80,
                "containerization": 80,
                "configuration": 80,
                "ci_cd": 80,
                "testing": 80
            },
            "recommendations": []
        }
    })
}

fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
}

async fn analyze(Json(body): Json<Value>) -> Response {
    if body.get("repo_url").is_none() && body.get("local_dir").is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Either repo_url or local_dir must be provided" })),
        )
            .into_response();
    }
    Json(json!({
        "id": "99",
        "status": "running",
        "start_time": "2025-03-02T09:30:00",
        "received": body
    }))
    .into_response()
}

async fn status(Path(job_id): Path<String>) -> Response {
    if job_id != "42" {
        return not_found("Job not found");
    }
    Json(json!({
        "id": "42",
        "status": "running",
        "start_time": "2025-03-02T09:00:00",
        "project_name": "storefront"
    }))
    .into_response()
}

async fn jobs() -> Json<Value> {
    Json(json!([
        {
            "id": "42",
            "status": "running",
            "start_time": "2025-03-02T09:00:00",
            "project_name": "storefront"
        },
        {
            "id": "7",
            "status": "completed",
            "start_time": "2025-03-01T09:55:00",
            "end_time": "2025-03-01T10:00:00",
            "project_name": "storefront"
        }
    ]))
}

async fn latest(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "evaluations": [steady_evaluation(), inflated_evaluation()],
        "limit": query.get("limit")
    }))
}

async fn evaluation(Path(evaluation_id): Path<String>) -> Response {
    match evaluation_id.as_str() {
        "eval-1" => Json(inflated_evaluation()).into_response(),
        "eval-2" => Json(steady_evaluation()).into_response(),
        _ => not_found("Evaluation not found"),
    }
}

async fn file(Path((_project, filename)): Path<(String, String)>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        format!("# {filename}\n"),
    )
        .into_response()
}

async fn test_token(Json(body): Json<Value>) -> Response {
    if body["token"] == "ghp_good" {
        return Json(json!({
            "valid": true,
            "rate_limit": 5000,
            "rate_remaining": 4999,
            "rate_reset": 1_700_000_000
        }))
        .into_response();
    }
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "valid": false, "message": "Bad credentials" })),
    )
        .into_response()
}

/// In-process stand-in for the analysis backend.
pub(super) fn fake_backend() -> Router {
    Router::new()
        .route("/analyze-cloud", post(analyze))
        .route("/status/:job_id", get(status))
        .route("/jobs", get(jobs))
        .route(
            "/jobs/:job_id",
            delete(|| async { Json(json!({ "status": "deleted" })) }),
        )
        .route("/latest-evaluations", get(latest))
        .route(
            "/cloud-history/:project",
            get(|Path(project): Path<String>| async move {
                Json(json!({ "project_name": project, "evaluations": [] }))
            }),
        )
        .route("/cloud-evaluation/:evaluation_id", get(evaluation))
        .route(
            "/output/:project",
            get(|| async { not_found("Project output not found") }),
        )
        .route(
            "/output/:project/cloud-data",
            get(|Path(project): Path<String>| async move {
                Json(json!({ "project_name": project, "scores": { "testing": 60 } }))
            }),
        )
        .route(
            "/output/:project/cloud-dashboard",
            get(|| async { not_found("Not found") }),
        )
        .route(
            "/output/:project/cloud-readiness",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "report renderer crashed") }),
        )
        .route("/file/:project/:filename", get(file))
        .route(
            "/tutorials",
            get(|| async {
                Json(json!({ "tutorials": [{
                    "project_name": "storefront",
                    "title": "Storefront",
                    "description": "Shop backend",
                    "created_at": "2025-03-01T10:00:00",
                    "file_count": 4
                }] }))
            }),
        )
        .route(
            "/tutorials/:project",
            delete(|| async { Json(json!({ "status": "deleted" })) }),
        )
        .route("/test-github-token", post(test_token))
}

pub(super) async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake backend serves");
    });
    format!("http://{addr}")
}

/// Address nothing listens on.
pub(super) async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway address");
    drop(listener);
    format!("http://{addr}")
}

pub(super) fn gateway_for(base_url: &str) -> Router {
    let client = BackendClient::new(&BackendConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    })
    .expect("backend client builds");
    gateway_router(Arc::new(client))
}

pub(super) async fn live_gateway() -> Router {
    let url = spawn_backend(fake_backend()).await;
    gateway_for(&url)
}

pub(super) async fn dead_gateway() -> Router {
    let url = unreachable_url().await;
    gateway_for(&url)
}

pub(super) async fn call(
    router: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = router.oneshot(request).await.expect("route executes");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, payload)
}

pub(super) async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    call(router, Method::GET, uri, None).await
}

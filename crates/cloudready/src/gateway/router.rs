use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::envelope::{
    bad_request, detail_failure, history_failure, message_failure, message_failure_with_cause,
    method_not_allowed, not_found_or_failure, relay, relay_file, relay_serialized,
    token_failure, tutorial_failure, tutorial_method_not_allowed,
};
use crate::analysis::normalize_pattern_fields;
use crate::backend::{BackendClient, ReportKind};
use crate::readiness::{compare_evaluations, summarize};
use crate::settings::TokenCheck;

const DEFAULT_LATEST_LIMIT: u32 = 10;
const DEFAULT_HISTORY_LIMIT: u32 = 20;

type Backend = State<Arc<BackendClient>>;

/// Router exposing the `/api/...` proxy surface.
pub fn gateway_router(client: Arc<BackendClient>) -> Router {
    Router::new()
        .route(
            "/api/analyze-cloud",
            post(analyze_cloud).fallback(reject_method),
        )
        .route("/api/status/:job_id", get(job_status).fallback(reject_method))
        .route("/api/jobs", get(list_jobs).fallback(reject_method))
        .route("/api/jobs/:job_id", delete(delete_job).fallback(reject_method))
        .route(
            "/api/latest-evaluations",
            get(latest_evaluations).fallback(reject_method),
        )
        .route(
            "/api/cloud-history",
            get(history_index).fallback(reject_method),
        )
        .route(
            "/api/cloud-history/:project_name",
            get(project_history).fallback(reject_method),
        )
        .route(
            "/api/cloud-evaluation/:evaluation_id",
            get(cloud_evaluation).fallback(reject_method),
        )
        .route(
            "/api/cloud-evaluation/:evaluation_id/summary",
            get(evaluation_summary).fallback(reject_method),
        )
        .route("/api/compare", get(compare).fallback(reject_method))
        .route(
            "/api/output/:project_name",
            get(project_output).fallback(reject_method),
        )
        .route(
            "/api/output/:project_name/cloud-data",
            get(cloud_data).fallback(reject_method),
        )
        .route(
            "/api/output/:project_name/cloud-dashboard",
            get(cloud_dashboard).fallback(reject_method),
        )
        .route(
            "/api/output/:project_name/cloud-readiness",
            get(cloud_readiness).fallback(reject_method),
        )
        .route(
            "/api/file/:project_name/:filename",
            get(project_file).fallback(reject_method),
        )
        .route(
            "/api/tutorials",
            get(tutorials).fallback(reject_tutorial_method),
        )
        .route(
            "/api/delete-tutorial",
            delete(delete_tutorial).fallback(reject_tutorial_method),
        )
        .route(
            "/api/test-github-token",
            post(test_github_token).fallback(reject_method),
        )
        .with_state(client)
}

async fn reject_method() -> Response {
    method_not_allowed()
}

async fn reject_tutorial_method() -> Response {
    tutorial_method_not_allowed()
}

fn present(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn limit_or(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(default)
}

#[derive(Debug, Default, Deserialize)]
struct LimitQuery {
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CompareQuery {
    base_id: Option<String>,
    compare_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TutorialQuery {
    project_name: Option<String>,
}

pub(crate) async fn analyze_cloud(State(client): Backend, body: Bytes) -> Response {
    let mut request = match serde_json::from_slice::<Value>(&body) {
        Ok(value @ Value::Object(_)) => value,
        _ => return bad_request("detail", "Request body must be a JSON object"),
    };
    normalize_pattern_fields(&mut request);

    match client.post(&["analyze-cloud"], &request).await {
        Ok(job) => {
            let job_id = job.get("id").and_then(Value::as_str).unwrap_or_default();
            info!(job_id, "cloud analysis started");
            relay(job)
        }
        Err(err) => {
            warn!(error = %err, "failed to start cloud analysis");
            detail_failure(&err, "Failed to start cloud analysis")
        }
    }
}

pub(crate) async fn job_status(State(client): Backend, Path(job_id): Path<String>) -> Response {
    let Some(job_id) = present(&job_id) else {
        return bad_request("message", "Job ID is required");
    };
    match client.get(&["status", job_id]).await {
        Ok(job) => relay(job),
        Err(err) => {
            warn!(error = %err, job_id, "failed to fetch job status");
            message_failure(&err, "Failed to fetch job status")
        }
    }
}

async fn list_jobs(State(client): Backend) -> Response {
    match client.get(&["jobs"]).await {
        Ok(jobs) => relay(jobs),
        Err(err) => {
            warn!(error = %err, "failed to list jobs");
            message_failure(&err, "Failed to fetch jobs")
        }
    }
}

async fn delete_job(State(client): Backend, Path(job_id): Path<String>) -> Response {
    let Some(job_id) = present(&job_id) else {
        return bad_request("message", "Job ID is required");
    };
    match client.delete_job(job_id).await {
        Ok(body) => {
            info!(job_id, "job deleted");
            relay(body)
        }
        Err(err) => {
            warn!(error = %err, job_id, "failed to delete job");
            message_failure(&err, "Failed to delete job")
        }
    }
}

async fn latest_evaluations(State(client): Backend, Query(query): Query<LimitQuery>) -> Response {
    let limit = limit_or(query.limit.as_deref(), DEFAULT_LATEST_LIMIT);
    match client
        .get_query(&["latest-evaluations"], &[("limit", limit)])
        .await
    {
        Ok(body) => relay(body),
        Err(err) => {
            warn!(error = %err, limit, "failed to fetch latest evaluations");
            message_failure(&err, "Failed to fetch latest evaluations")
        }
    }
}

pub(crate) async fn history_index(
    State(client): Backend,
    Query(query): Query<LimitQuery>,
) -> Response {
    let limit = limit_or(query.limit.as_deref(), DEFAULT_HISTORY_LIMIT);
    match client.merged_history(limit).await {
        Ok(page) => relay_serialized(&page),
        Err(err) => {
            warn!(error = %err, limit, "failed to fetch cloud history");
            history_failure(&err, "Failed to fetch cloud history")
        }
    }
}

async fn project_history(State(client): Backend, Path(project_name): Path<String>) -> Response {
    let Some(project_name) = present(&project_name) else {
        return bad_request("message", "Project name is required");
    };
    match client.cloud_history(project_name).await {
        Ok(body) => relay(body),
        Err(err) => {
            warn!(error = %err, project_name, "failed to fetch project history");
            message_failure(&err, "Failed to fetch cloud history")
        }
    }
}

async fn cloud_evaluation(State(client): Backend, Path(evaluation_id): Path<String>) -> Response {
    let Some(evaluation_id) = present(&evaluation_id) else {
        return bad_request("message", "Evaluation ID is required");
    };
    match client.get(&["cloud-evaluation", evaluation_id]).await {
        Ok(body) => relay(body),
        Err(err) => {
            warn!(error = %err, evaluation_id, "failed to fetch cloud evaluation");
            message_failure(&err, "Failed to fetch cloud evaluation")
        }
    }
}

async fn evaluation_summary(State(client): Backend, Path(evaluation_id): Path<String>) -> Response {
    let Some(evaluation_id) = present(&evaluation_id) else {
        return bad_request("message", "Evaluation ID is required");
    };
    match client.cloud_evaluation(evaluation_id).await {
        Ok(evaluation) => relay_serialized(&summarize(&evaluation)),
        Err(err) => {
            warn!(error = %err, evaluation_id, "failed to summarize cloud evaluation");
            message_failure(&err, "Failed to fetch cloud evaluation")
        }
    }
}

async fn compare(State(client): Backend, Query(query): Query<CompareQuery>) -> Response {
    let base_id = query.base_id.as_deref().and_then(present);
    let compare_id = query.compare_id.as_deref().and_then(present);
    let (Some(base_id), Some(compare_id)) = (base_id, compare_id) else {
        return bad_request("message", "Both base_id and compare_id are required");
    };

    match tokio::try_join!(
        client.cloud_evaluation(base_id),
        client.cloud_evaluation(compare_id)
    ) {
        Ok((base, other)) => relay_serialized(&compare_evaluations(&base, &other)),
        Err(err) => {
            warn!(error = %err, base_id, compare_id, "failed to compare evaluations");
            message_failure(&err, "Failed to compare evaluations")
        }
    }
}

async fn project_output(State(client): Backend, Path(project_name): Path<String>) -> Response {
    let Some(project_name) = present(&project_name) else {
        return bad_request("message", "Project name is required");
    };
    match client.get(&["output", project_name]).await {
        Ok(body) => relay(body),
        Err(err) => {
            warn!(error = %err, project_name, "failed to fetch project output");
            not_found_or_failure(
                &err,
                (
                    "Tutorial not found",
                    "The analysis for this project may not have completed yet",
                ),
                "Failed to fetch tutorial content",
            )
        }
    }
}

async fn fetch_report(client: &BackendClient, project_name: &str, kind: ReportKind) -> Response {
    let Some(project_name) = present(project_name) else {
        return bad_request("message", "Project name is required");
    };
    let result = client.report(project_name, kind).await;
    let err = match result {
        Ok(body) => return relay(body),
        Err(err) => err,
    };
    warn!(error = %err, project_name, report = kind.segment(), "failed to fetch report");

    match kind {
        ReportKind::CloudData => {
            message_failure_with_cause(&err, "Failed to fetch cloud readiness data")
        }
        ReportKind::CloudDashboard => not_found_or_failure(
            &err,
            (
                "Cloud dashboard not found",
                "The dashboard may not have been generated for this project",
            ),
            "Failed to fetch cloud dashboard",
        ),
        ReportKind::CloudReadiness => not_found_or_failure(
            &err,
            (
                "Cloud readiness report not found",
                "The report may not have been generated for this project",
            ),
            "Failed to fetch cloud readiness report",
        ),
    }
}

async fn cloud_data(State(client): Backend, Path(project_name): Path<String>) -> Response {
    fetch_report(&client, &project_name, ReportKind::CloudData).await
}

async fn cloud_dashboard(State(client): Backend, Path(project_name): Path<String>) -> Response {
    fetch_report(&client, &project_name, ReportKind::CloudDashboard).await
}

async fn cloud_readiness(State(client): Backend, Path(project_name): Path<String>) -> Response {
    fetch_report(&client, &project_name, ReportKind::CloudReadiness).await
}

async fn project_file(
    State(client): Backend,
    Path((project_name, filename)): Path<(String, String)>,
) -> Response {
    let (Some(project_name), Some(filename)) = (present(&project_name), present(&filename)) else {
        return bad_request("message", "Project name and file name are required");
    };
    match client.project_file(project_name, filename).await {
        Ok(file) => {
            let content_type = mime_guess::from_path(filename)
                .first_raw()
                .map(str::to_string)
                .or(file.content_type)
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
            relay_file(&content_type, file.bytes)
        }
        Err(err) => {
            warn!(error = %err, project_name, filename, "failed to fetch project file");
            message_failure(&err, "Failed to fetch file")
        }
    }
}

async fn tutorials(State(client): Backend) -> Response {
    match client.get(&["tutorials"]).await {
        Ok(body) => relay(body),
        Err(err) => {
            warn!(error = %err, "failed to list tutorials");
            tutorial_failure(&err, "Failed to fetch tutorials from backend")
        }
    }
}

async fn delete_tutorial(State(client): Backend, Query(query): Query<TutorialQuery>) -> Response {
    let Some(project_name) = query.project_name.as_deref().and_then(present) else {
        return bad_request("error", "Project name is required");
    };
    match client.delete_tutorial(project_name).await {
        Ok(body) => {
            info!(project_name, "tutorial deleted");
            relay(body)
        }
        Err(err) => {
            warn!(error = %err, project_name, "failed to delete tutorial");
            tutorial_failure(&err, "Failed to delete tutorial from backend")
        }
    }
}

async fn test_github_token(State(client): Backend, body: Bytes) -> Response {
    let token = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|body| body.get("token").and_then(Value::as_str).map(str::to_string));
    let Some(token) = token.as_deref().and_then(present) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(TokenCheck::invalid("GitHub token is required")),
        )
            .into_response();
    };

    match client
        .post(&["test-github-token"], &json!({ "token": token }))
        .await
    {
        Ok(check) => relay(check),
        Err(err) => {
            warn!(error = %err, "failed to validate github token");
            token_failure(&err)
        }
    }
}

//! Integration specifications for submitting an analysis and following it
//! through to reconciled history.
//!
//! A stateful in-process backend plays the external analysis service so the
//! public client, pollers and reconciliation run end to end.

mod common {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use cloudready::backend::BackendClient;
    use cloudready::config::BackendConfig;

    /// Job "1" reports `running` for the first two status checks, then completes.
    #[derive(Default)]
    pub(super) struct BackendState {
        pub(super) status_checks: AtomicUsize,
        pub(super) submissions: Mutex<Vec<Value>>,
    }

    impl BackendState {
        fn finished(&self) -> bool {
            self.status_checks.load(Ordering::SeqCst) >= 3
        }
    }

    fn job(state: &BackendState) -> Value {
        let status = if state.finished() { "completed" } else { "running" };
        json!({
            "id": "1",
            "status": status,
            "start_time": "2025-04-01T12:00:00",
            "project_name": "storefront"
        })
    }

    /// Submission answers with nothing but the new job's id.
    async fn submit(
        State(state): State<Arc<BackendState>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        state.submissions.lock().unwrap().push(body);
        Json(json!({ "id": "1" }))
    }

    async fn status(
        State(state): State<Arc<BackendState>>,
        Path(job_id): Path<String>,
    ) -> Response {
        if job_id != "1" {
            let body = Json(json!({ "detail": "Job not found" }));
            return (StatusCode::NOT_FOUND, body).into_response();
        }
        state.status_checks.fetch_add(1, Ordering::SeqCst);
        Json(job(&state)).into_response()
    }

    async fn jobs(State(state): State<Arc<BackendState>>) -> Json<Value> {
        Json(json!([job(&state)]))
    }

    async fn latest(State(state): State<Arc<BackendState>>) -> Json<Value> {
        if !state.finished() {
            return Json(json!({ "evaluations": [] }));
        }
        Json(json!({ "evaluations": [evaluation()] }))
    }

    pub(super) fn evaluation() -> Value {
        json!({
            "id": "eval-9",
            "project_name": "storefront",
            "timestamp": "2025-04-01T12:05:00",
            "overall_score": 88,
            "readiness_level": "Cloud-Native",
            "job_id": "1",
            "data": {
                "scores": {
                    "containerization": 10,
                    "configuration": 30,
                    "cloud_integration": 50,
                    "ci_cd": 70,
                    "testing": 60
                },
                "recommendations": [
                    {
                        "category": "containerization",
                        "priority": "critical",
                        "description": "Add a Dockerfile"
                    }
                ]
            }
        })
    }

    pub(super) async fn spawn_backend() -> (String, Arc<BackendState>) {
        let state = Arc::new(BackendState::default());
        let router = Router::new()
            .route("/analyze-cloud", post(submit))
            .route("/status/:job_id", get(status))
            .route("/jobs", get(jobs))
            .route("/latest-evaluations", get(latest))
            .route(
                "/cloud-history/:project",
                get(|| async { Json(json!([evaluation()])) }),
            )
            .route(
                "/cloud-evaluation/eval-9",
                get(|| async { Json(evaluation()) }),
            )
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind backend");
        let addr = listener.local_addr().expect("backend address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("backend serves");
        });
        (format!("http://{addr}"), state)
    }

    pub(super) fn client(base_url: &str) -> Arc<BackendClient> {
        Arc::new(
            BackendClient::new(&BackendConfig {
                base_url: base_url.to_string(),
                timeout: Duration::from_secs(5),
            })
            .expect("client builds"),
        )
    }
}

use std::sync::atomic::Ordering;
use std::time::Duration;

use cloudready::analysis::AnalysisForm;
use cloudready::jobs::{watch_history, watch_job, PollEvent};
use cloudready::readiness::{
    accurate_score, correct_detail, explain_readiness, JobState, Priority, ReadinessLevel,
};
use common::*;

const FAST: Duration = Duration::from_millis(20);

#[tokio::test]
async fn submitted_job_is_followed_to_completion() {
    let (url, state) = spawn_backend().await;
    let client = client(&url);

    let request = AnalysisForm {
        repo_url: Some("https://github.com/acme/storefront.git".to_string()),
        include_patterns: vec!["*.py".to_string()],
        ..Default::default()
    }
    .validate()
    .expect("valid request");
    let job = client.start_analysis(&request).await.expect("job starts");
    assert_eq!(job.id, "1");

    let submitted = state.submissions.lock().unwrap()[0].clone();
    assert_eq!(submitted["project_name"], "storefront");
    assert_eq!(submitted["max_file_size"], 100_000);
    assert_eq!(submitted["use_llm_cloud_analysis"], true);

    let mut subscription = watch_job(client, job.id, FAST);
    let mut seen = Vec::new();
    while let Some(event) = subscription.next().await {
        match event {
            PollEvent::Update(job) => seen.push(job.status),
            PollEvent::Error(err) => panic!("unexpected poll error: {err}"),
        }
    }
    assert_eq!(
        seen,
        [JobState::Running, JobState::Running, JobState::Completed]
    );
    assert_eq!(state.status_checks.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unknown_job_reports_errors_until_stopped() {
    let (url, _state) = spawn_backend().await;
    let mut subscription = watch_job(client(&url), "404", FAST);

    for _ in 0..2 {
        match subscription.next().await {
            Some(PollEvent::Error(err)) => assert!(err.is_not_found()),
            other => panic!("expected not-found error, got {other:?}"),
        }
    }
    subscription.stop();
    assert!(subscription.next().await.is_none());
}

#[tokio::test]
async fn history_refresh_stops_once_the_job_lands() {
    let (url, state) = spawn_backend().await;
    let client = client(&url);

    let page = client.merged_history(20).await.expect("history loads");
    assert_eq!(page.count, 1);
    assert_eq!(page.evaluations[0].id, "job_1");
    assert!(page.job_running("1"));

    let mut subscription = watch_history(client.clone(), "1", 20, FAST);
    let mut last = None;
    while let Some(event) = subscription.next().await {
        if let PollEvent::Update(page) = event {
            if page.job_running("1") {
                state.status_checks.fetch_add(1, Ordering::SeqCst);
            }
            last = Some(page);
        }
    }

    let last = last.expect("at least one refresh");
    assert_eq!(last.count, 1);
    let row = &last.evaluations[0];
    assert_eq!(row.id, "eval-9");
    assert_eq!(row.formatted_date.as_deref(), Some("2025-04-01"));
    assert_eq!(row.overall_score, 44.0);
    assert!(row.was_corrected());
}

#[tokio::test]
async fn evaluation_detail_is_reconciled() {
    let (url, _state) = spawn_backend().await;
    let client = client(&url);

    let mut evaluation = client.cloud_evaluation("eval-9").await.expect("detail loads");
    assert_eq!(
        evaluation.data.as_ref().unwrap().recommendations[0].priority,
        Priority::Critical
    );

    assert!(correct_detail(&mut evaluation));
    assert_eq!(evaluation.overall_score, 44.0);
    assert_eq!(accurate_score(&evaluation).value, 44.0);
    assert_eq!(
        evaluation.scores().and_then(|scores| scores.get("overall")).copied(),
        Some(44.0)
    );

    let explanation = explain_readiness(&evaluation);
    assert!(explanation.contains("Containerization"));
    assert_eq!(
        cloudready::readiness::derive_readiness_level(evaluation.scores().unwrap()),
        Some(ReadinessLevel::CloudFriendly)
    );

    let listed = client
        .project_evaluations("storefront")
        .await
        .expect("project history loads");
    assert_eq!(listed.len(), 1);
}

use serde_json::json;

use crate::readiness::domain::{Evaluation, EvaluationDetail, Job, JobState, ScoreMap};

pub(super) fn scores(entries: &[(&str, f64)]) -> ScoreMap {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}

pub(super) fn evaluation(
    id: &str,
    overall: f64,
    level: &str,
    scores: Option<ScoreMap>,
) -> Evaluation {
    Evaluation {
        id: id.to_string(),
        project_name: "storefront".to_string(),
        timestamp: "2025-03-01T10:00:00".to_string(),
        overall_score: overall,
        readiness_level: level.to_string(),
        job_id: None,
        status: None,
        recommendations_count: None,
        formatted_date: None,
        formatted_time: None,
        data: scores.map(|scores| EvaluationDetail {
            scores: Some(scores),
            ..Default::default()
        }),
        extra: Default::default(),
    }
}

/// The end-to-end scenario: inflated overall, weak critical components.
pub(super) fn inflated_evaluation() -> Evaluation {
    evaluation(
        "eval-inflated",
        95.0,
        "Cloud-Native",
        Some(scores(&[
            ("overall", 95.0),
            ("containerization", 40.0),
            ("configuration", 35.0),
            ("ci_cd", 30.0),
            ("cloud_integration", 20.0),
            ("other_x", 50.0),
        ])),
    )
}

pub(super) fn strong_scores() -> ScoreMap {
    scores(&[
        ("overall", 82.0),
        ("containerization", 85.0),
        ("configuration", 80.0),
        ("cloud_integration", 78.0),
        ("state_management", 76.0),
        ("infrastructure_as_code", 90.0),
        ("ci_cd", 88.0),
        ("testing", 80.0),
    ])
}

pub(super) fn job(id: &str, status: JobState, project: Option<&str>, start: &str) -> Job {
    serde_json::from_value(json!({
        "id": id,
        "status": String::from(status),
        "start_time": start,
        "project_name": project,
    }))
    .expect("job fixture parses")
}

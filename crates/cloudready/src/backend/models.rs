use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::readiness::{Evaluation, JobState};

/// Body of `GET /latest-evaluations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationList {
    #[serde(default, deserialize_with = "lenient_evaluations")]
    pub evaluations: Vec<Evaluation>,
}

/// Decode each row on its own, skipping rows that do not parse so one
/// malformed evaluation cannot hide the rest of the list.
pub(crate) fn evaluation_rows(rows: Vec<Value>) -> Vec<Evaluation> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(row) {
                Ok(evaluation) => Some(evaluation),
                Err(err) => {
                    warn!(%id, error = %err, "skipping undecodable evaluation");
                    None
                }
            }
        })
        .collect()
}

fn lenient_evaluations<'de, D>(deserializer: D) -> Result<Vec<Evaluation>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(evaluation_rows(rows))
}

/// Body of `POST /analyze-cloud`. The backend only promises the job id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartedJob {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobState>,
}

/// A generated tutorial as listed by `GET /tutorials`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutorial {
    pub project_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub file_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorialIndex {
    #[serde(default)]
    pub tutorials: Vec<Tutorial>,
}

/// Markdown files of a finished tutorial, keyed by file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOutput {
    pub project_name: String,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

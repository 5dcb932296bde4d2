use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Component name to score. The `"overall"` entry, when present, is the
/// backend's own aggregate and is never treated as a component.
pub type ScoreMap = BTreeMap<String, f64>;

/// Key under which the backend reports its aggregate score.
pub const OVERALL_KEY: &str = "overall";

/// One completed (or in-flight) analysis as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: String,
    pub project_name: String,
    pub timestamp: String,
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub readiness_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EvaluationDetail>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Evaluation {
    /// Component scores, if the backend attached any.
    pub fn scores(&self) -> Option<&ScoreMap> {
        self.data.as_ref().and_then(|detail| detail.scores.as_ref())
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn was_corrected(&self) -> bool {
        self.data
            .as_ref()
            .map(|detail| detail.corrected_score)
            .unwrap_or(false)
    }
}

/// Id prefix for history rows synthesized from jobs that have no evaluation yet.
pub const PLACEHOLDER_PREFIX: &str = "job_";

/// Full evaluation payload: scores, advice, and detected technology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreMap>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology_stack: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_analysis: Option<Value>,
    #[serde(
        rename = "correctedScore",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub corrected_score: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    /// Model-written advice may arrive as a list of lines; it is flattened
    /// to text.
    #[serde(default, deserialize_with = "text_or_lines")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn text_or_lines<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    fn flatten(value: Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(text) => text,
            Value::Array(items) => items
                .into_iter()
                .map(flatten)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        }
    }

    Ok(flatten(Value::deserialize(deserializer)?))
}

impl Recommendation {
    pub fn is_llm_generated(&self) -> bool {
        self.source.as_deref() == Some("llm")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub fn label(&self) -> &str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Other(value) => value,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Other(String::new())
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Other(value),
        }
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.label().to_string()
    }
}

/// Backend job as reported by `/status/{id}` and `/jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobState,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Job lifecycle state. Unrecognized states are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    Running,
    Completed,
    Failed,
    Other(String),
}

impl JobState {
    pub fn label(&self) -> &str {
        match self {
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Other(value) => value,
        }
    }

    /// Completed and failed jobs never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for JobState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "running" => JobState::Running,
            "completed" => JobState::Completed,
            "failed" => JobState::Failed,
            _ => JobState::Other(value),
        }
    }
}

impl From<JobState> for String {
    fn from(value: JobState) -> Self {
        value.label().to_string()
    }
}

/// Qualitative cloud-readiness tier derived from component scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    #[serde(rename = "Cloud-Native")]
    CloudNative,
    #[serde(rename = "Cloud-Ready")]
    CloudReady,
    #[serde(rename = "Cloud-Friendly")]
    CloudFriendly,
    #[serde(rename = "Cloud-Challenged")]
    CloudChallenged,
}

impl ReadinessLevel {
    pub const ALL: [ReadinessLevel; 4] = [
        ReadinessLevel::CloudNative,
        ReadinessLevel::CloudReady,
        ReadinessLevel::CloudFriendly,
        ReadinessLevel::CloudChallenged,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReadinessLevel::CloudNative => "Cloud-Native",
            ReadinessLevel::CloudReady => "Cloud-Ready",
            ReadinessLevel::CloudFriendly => "Cloud-Friendly",
            ReadinessLevel::CloudChallenged => "Cloud-Challenged",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(label.trim()))
    }

    /// One-line criterion used in reports and briefs.
    pub fn criterion(self) -> &'static str {
        match self {
            ReadinessLevel::CloudNative => {
                "75+ score in critical components and overall. \
                 Fully optimized for cloud environments."
            }
            ReadinessLevel::CloudReady => {
                "60+ score in critical components and overall. \
                 Ready for cloud with minimal changes."
            }
            ReadinessLevel::CloudFriendly => {
                "40+ score. Can work in cloud environments but requires moderate modifications."
            }
            ReadinessLevel::CloudChallenged => {
                "Below 40 score. Significant architectural changes needed for cloud deployment."
            }
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluation_keeps_unknown_fields() {
        let raw = json!({
            "id": "eval-1",
            "project_name": "shop",
            "timestamp": "2025-03-01T10:00:00",
            "overall_score": 61.5,
            "readiness_level": "Cloud-Ready",
            "summary_path": "output/shop/cloud.md",
            "data": {
                "scores": { "overall": 61.5, "ci_cd": 70.0 },
                "recommendations": [
                    {
                        "category": "ci_cd",
                        "priority": "high",
                        "description": "Add a pipeline",
                        "source": "llm"
                    }
                ],
                "analysis_version": 3
            }
        });

        let evaluation: Evaluation = serde_json::from_value(raw).expect("evaluation parses");
        assert_eq!(
            evaluation.extra.get("summary_path"),
            Some(&json!("output/shop/cloud.md"))
        );
        let detail = evaluation.data.as_ref().expect("detail present");
        assert_eq!(detail.extra.get("analysis_version"), Some(&json!(3)));
        assert!(detail.recommendations[0].is_llm_generated());
        assert_eq!(detail.recommendations[0].priority, Priority::High);

        let round = serde_json::to_value(&evaluation).expect("serializes");
        assert_eq!(round["summary_path"], json!("output/shop/cloud.md"));
        assert!(round["data"].get("correctedScore").is_none());
    }

    #[test]
    fn recommendation_descriptions_accept_any_shape() {
        let detail: EvaluationDetail = serde_json::from_value(json!({
            "recommendations": [
                { "category": "ci_cd", "priority": "high", "description": ["Add CI", "Add CD"] },
                {
                    "category": "testing",
                    "priority": "low",
                    "description": { "text": "More tests" }
                },
                { "priority": "medium" }
            ]
        }))
        .expect("detail parses");

        assert_eq!(detail.recommendations[0].description, "Add CI\nAdd CD");
        assert_eq!(detail.recommendations[1].description, r#"{"text":"More tests"}"#);
        assert_eq!(detail.recommendations[2].description, "");
        assert_eq!(detail.recommendations[2].category, "");
        assert_eq!(detail.recommendations[2].priority, Priority::Medium);
    }

    #[test]
    fn job_state_preserves_unknown_values() {
        let job: Job = serde_json::from_value(json!({
            "id": "42",
            "status": "queued",
            "start_time": "2025-03-01T10:00:00"
        }))
        .expect("job parses");
        assert_eq!(job.status, JobState::Other("queued".to_string()));
        assert!(!job.status.is_terminal());
        assert_eq!(serde_json::to_value(&job.status).unwrap(), json!("queued"));
        assert!(JobState::Failed.is_terminal());
    }

    #[test]
    fn readiness_level_labels_round_trip() {
        for level in ReadinessLevel::ALL {
            assert_eq!(ReadinessLevel::from_label(level.label()), Some(level));
        }
        assert_eq!(ReadinessLevel::from_label("Processing..."), None);
        assert_eq!(
            serde_json::to_value(ReadinessLevel::CloudFriendly).unwrap(),
            json!("Cloud-Friendly")
        );
    }
}

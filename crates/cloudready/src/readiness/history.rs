use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::domain::{Evaluation, Job, JobState, PLACEHOLDER_PREFIX};
use super::summary::readiness_label;

/// Readiness label shown for jobs that have not produced an evaluation yet.
pub const PROCESSING_LABEL: &str = "Processing...";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Merged history payload returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub evaluations: Vec<Evaluation>,
    pub count: usize,
}

impl HistoryPage {
    pub fn new(evaluations: Vec<Evaluation>) -> Self {
        Self {
            count: evaluations.len(),
            evaluations,
        }
    }

    /// Whether the row linked to `job_id` is still being analysed.
    pub fn job_running(&self, job_id: &str) -> bool {
        self.evaluations.iter().any(|evaluation| {
            evaluation.job_id.as_deref() == Some(job_id)
                && evaluation.status == Some(JobState::Running)
        })
    }
}

/// Parse backend timestamps into local wall-clock time. Offset-less values
/// are already local.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn formatted(raw: &str) -> (Option<String>, Option<String>) {
    match parse_timestamp(raw) {
        Some(at) => (
            Some(at.format(DATE_FORMAT).to_string()),
            Some(at.format(TIME_FORMAT).to_string()),
        ),
        None => (None, None),
    }
}

fn placeholder(job: &Job, project_name: &str) -> Evaluation {
    let (formatted_date, formatted_time) = formatted(&job.start_time);
    Evaluation {
        id: format!("{PLACEHOLDER_PREFIX}{}", job.id),
        project_name: project_name.to_string(),
        timestamp: job.start_time.clone(),
        overall_score: 0.0,
        readiness_level: PROCESSING_LABEL.to_string(),
        job_id: Some(job.id.clone()),
        status: Some(job.status.clone()),
        recommendations_count: None,
        formatted_date,
        formatted_time,
        data: None,
        extra: Default::default(),
    }
}

fn newest_first(a: &Evaluation, b: &Evaluation) -> Ordering {
    match (parse_timestamp(&a.timestamp), parse_timestamp(&b.timestamp)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fold the backend's job list into its evaluation list.
///
/// Running or failed jobs that name a project and are not yet linked to an
/// evaluation become placeholder rows. Rows lacking display fields receive a
/// status (their own, else `completed`, overridden by the matching job) and
/// formatted date and time. The result is ordered newest first.
pub fn merge_jobs(mut evaluations: Vec<Evaluation>, jobs: &[Job]) -> Vec<Evaluation> {
    let linked: HashSet<String> = evaluations
        .iter()
        .filter_map(|evaluation| evaluation.job_id.clone())
        .collect();

    for job in jobs
        .iter()
        .filter(|job| matches!(job.status, JobState::Running | JobState::Failed))
    {
        if let Some(project_name) = job.project_name.as_deref() {
            if !linked.contains(&job.id) {
                evaluations.push(placeholder(job, project_name));
            }
        }
    }

    for evaluation in &mut evaluations {
        if evaluation.formatted_date.is_some() && evaluation.formatted_time.is_some() {
            continue;
        }

        let mut status = evaluation.status.clone().unwrap_or(JobState::Completed);
        if let Some(job_id) = evaluation.job_id.as_deref() {
            if let Some(job) = jobs.iter().find(|job| job.id == job_id) {
                status = job.status.clone();
            }
        }
        evaluation.status = Some(status);

        let (date, time) = formatted(&evaluation.timestamp);
        evaluation.formatted_date = date;
        evaluation.formatted_time = time;
    }

    evaluations.sort_by(newest_first);
    evaluations
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    id: &'a str,
    project_name: &'a str,
    timestamp: &'a str,
    status: &'a str,
    overall_score: String,
    readiness_level: String,
    corrected: bool,
}

/// Export reconciled history rows as CSV.
pub fn write_history_csv<W: Write>(
    evaluations: &[Evaluation],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for evaluation in evaluations {
        csv.serialize(HistoryRow {
            id: &evaluation.id,
            project_name: &evaluation.project_name,
            timestamp: &evaluation.timestamp,
            status: evaluation
                .status
                .as_ref()
                .map(JobState::label)
                .unwrap_or("completed"),
            overall_score: format!("{:.1}", evaluation.overall_score),
            readiness_level: readiness_label(evaluation),
            corrected: evaluation.was_corrected(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

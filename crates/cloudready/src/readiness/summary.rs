use serde::Serialize;
use tracing::debug;

use super::components::{display_name, is_critical};
use super::domain::{Evaluation, ReadinessLevel, OVERALL_KEY};
use super::explain::explain_readiness;
use super::reconcile::{
    averages, component_scores, compute_accurate_score, derive_readiness_level,
    lowest_components, AccurateScore,
};

/// Listed evaluations are only rewritten when the accurate score moves by
/// more than this many points.
pub const HISTORY_CORRECTION_TOLERANCE: f64 = 5.0;

/// Critical components scoring below this are called out for attention.
pub const ATTENTION_THRESHOLD: f64 = 60.0;

/// The overall score an evaluation should be displayed with.
///
/// A previously corrected `scores.overall` is trusted as-is. Otherwise the
/// reported figure is `scores.overall` (when non-zero) or the stored
/// `overall_score`, checked against the component mean. Evaluations without
/// scores keep their stored `overall_score`.
pub fn accurate_score(evaluation: &Evaluation) -> AccurateScore {
    let stored = AccurateScore {
        value: evaluation.overall_score,
        corrected: false,
    };
    let Some(detail) = evaluation.data.as_ref() else {
        return stored;
    };
    let Some(scores) = detail.scores.as_ref() else {
        return stored;
    };

    let detail_overall = scores.get(OVERALL_KEY).copied().filter(|value| *value != 0.0);
    if detail.corrected_score {
        if let Some(value) = detail_overall {
            return AccurateScore {
                value,
                corrected: true,
            };
        }
    }

    let reported = detail_overall.unwrap_or(evaluation.overall_score);
    let result = compute_accurate_score(scores, reported);
    if result.corrected {
        return result;
    }

    AccurateScore {
        value: reported,
        corrected: false,
    }
}

/// Tier derived from component scores, if the evaluation carries any.
pub fn derived_readiness(evaluation: &Evaluation) -> Option<ReadinessLevel> {
    evaluation.scores().and_then(derive_readiness_level)
}

/// Derived tier label, falling back to whatever the backend stored.
pub fn readiness_label(evaluation: &Evaluation) -> String {
    derived_readiness(evaluation)
        .map(|level| level.label().to_string())
        .unwrap_or_else(|| evaluation.readiness_level.clone())
}

/// Rewrite a listed evaluation whose overall score is off by more than the
/// history tolerance. Returns whether anything changed.
pub fn correct_listed(evaluation: &mut Evaluation) -> bool {
    if evaluation.scores().is_none() {
        return false;
    }

    let accurate = accurate_score(evaluation);
    if (accurate.value - evaluation.overall_score).abs() <= HISTORY_CORRECTION_TOLERANCE {
        return false;
    }

    debug!(
        project = %evaluation.project_name,
        from = evaluation.overall_score,
        to = accurate.value,
        "correcting listed overall score"
    );
    evaluation.overall_score = accurate.value;
    if let Some(detail) = evaluation.data.as_mut() {
        detail.corrected_score = true;
    }
    true
}

/// Apply [`correct_listed`] to every row, returning how many were rewritten.
pub fn correct_history(evaluations: &mut [Evaluation]) -> usize {
    evaluations
        .iter_mut()
        .map(correct_listed)
        .filter(|changed| *changed)
        .count()
}

/// Reconcile a freshly fetched evaluation detail in place.
///
/// A discrepant `scores.overall` (treated as 0 when absent) is replaced by
/// the component mean and flagged; `overall_score` then follows
/// `scores.overall` whenever that is corrected or non-zero.
pub fn correct_detail(evaluation: &mut Evaluation) -> bool {
    let Some(detail) = evaluation.data.as_mut() else {
        return false;
    };
    let Some(scores) = detail.scores.as_mut() else {
        return false;
    };

    let reported = scores.get(OVERALL_KEY).copied().unwrap_or(0.0);
    let result = compute_accurate_score(scores, reported);
    if result.corrected {
        debug!(reported, calculated = result.value, "correcting discrepant detail score");
        scores.insert(OVERALL_KEY.to_string(), result.value);
        detail.corrected_score = true;
    }

    let overall = scores.get(OVERALL_KEY).copied().unwrap_or(0.0);
    if detail.corrected_score || overall != 0.0 {
        evaluation.overall_score = overall;
    }
    result.corrected
}

/// A single component and its score, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentScore {
    pub component: String,
    pub display_name: String,
    pub score: f64,
    pub critical: bool,
}

impl ComponentScore {
    fn new(component: &str, score: f64) -> Self {
        Self {
            component: component.to_string(),
            display_name: display_name(component),
            score,
            critical: is_critical(component),
        }
    }
}

/// Everything a dashboard needs to present one evaluation honestly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledSummary {
    pub evaluation_id: String,
    pub project_name: String,
    pub reported_overall: f64,
    pub overall_score: f64,
    pub score_corrected: bool,
    pub stored_readiness_level: String,
    pub readiness_level: String,
    pub readiness_recalculated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_average: Option<f64>,
    pub explanation: String,
    pub lowest_components: Vec<ComponentScore>,
    pub critical_attention: Vec<ComponentScore>,
}

pub fn summarize(evaluation: &Evaluation) -> ReconciledSummary {
    let accurate = accurate_score(evaluation);
    let readiness_level = readiness_label(evaluation);

    let (component_average, critical_average, lowest_components, critical_attention) =
        match evaluation.scores() {
            Some(scores) => {
                let averages = averages(scores);
                let lowest = lowest_components(scores, 3)
                    .into_iter()
                    .map(|(key, value)| ComponentScore::new(&key, value))
                    .collect();
                let mut attention: Vec<ComponentScore> = component_scores(scores)
                    .filter(|(key, value)| is_critical(key) && *value < ATTENTION_THRESHOLD)
                    .map(|(key, value)| ComponentScore::new(key, value))
                    .collect();
                attention.sort_by(|a, b| a.score.total_cmp(&b.score));
                let critical = (averages.critical_count > 0).then_some(averages.critical);
                (averages.overall, critical, lowest, attention)
            }
            None => (None, None, Vec::new(), Vec::new()),
        };

    ReconciledSummary {
        evaluation_id: evaluation.id.clone(),
        project_name: evaluation.project_name.clone(),
        reported_overall: evaluation.overall_score,
        overall_score: accurate.value,
        score_corrected: accurate.corrected,
        stored_readiness_level: evaluation.readiness_level.clone(),
        readiness_recalculated: readiness_level != evaluation.readiness_level,
        readiness_level,
        component_average,
        critical_average,
        explanation: explain_readiness(evaluation),
        lowest_components,
        critical_attention,
    }
}

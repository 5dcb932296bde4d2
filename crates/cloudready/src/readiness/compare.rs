use serde::Serialize;

use super::components::{display_name, max_score_or_default};
use super::domain::Evaluation;
use super::reconcile::component_scores;
use super::summary::{accurate_score, readiness_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improved,
    Declined,
    Unchanged,
}

impl Trend {
    fn of(diff: f64) -> Self {
        if diff > 0.0 {
            Trend::Improved
        } else if diff < 0.0 {
            Trend::Declined
        } else {
            Trend::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorDelta {
    pub factor: String,
    pub display_name: String,
    pub base: f64,
    pub compare: f64,
    pub diff: f64,
    pub max_score: u8,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSide {
    pub id: String,
    pub timestamp: String,
    pub overall_score: f64,
    pub readiness_level: String,
}

impl EvaluationSide {
    fn of(evaluation: &Evaluation) -> Self {
        Self {
            id: evaluation.id.clone(),
            timestamp: evaluation.timestamp.clone(),
            overall_score: accurate_score(evaluation).value,
            readiness_level: readiness_label(evaluation),
        }
    }
}

/// Side-by-side view of two evaluations of (usually) the same project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationComparison {
    pub project_name: String,
    pub base: EvaluationSide,
    pub compare: EvaluationSide,
    pub overall_diff: f64,
    pub overall_trend: Trend,
    pub factors: Vec<FactorDelta>,
}

/// Compare `compare` against `base`. Factors come from the base evaluation;
/// a factor the other side lacks counts as 0.
pub fn compare_evaluations(base: &Evaluation, compare: &Evaluation) -> EvaluationComparison {
    let base_side = EvaluationSide::of(base);
    let compare_side = EvaluationSide::of(compare);
    let overall_diff = compare_side.overall_score - base_side.overall_score;

    let factors = match base.scores() {
        Some(scores) => component_scores(scores)
            .map(|(factor, base_score)| {
                let compare_score = compare
                    .scores()
                    .and_then(|other| other.get(factor).copied())
                    .unwrap_or(0.0);
                let diff = compare_score - base_score;
                FactorDelta {
                    factor: factor.to_string(),
                    display_name: display_name(factor),
                    base: base_score,
                    compare: compare_score,
                    diff,
                    max_score: max_score_or_default(factor),
                    trend: Trend::of(diff),
                }
            })
            .collect(),
        None => Vec::new(),
    };

    EvaluationComparison {
        project_name: base.project_name.clone(),
        base: base_side,
        compare: compare_side,
        overall_diff,
        overall_trend: Trend::of(overall_diff),
        factors,
    }
}

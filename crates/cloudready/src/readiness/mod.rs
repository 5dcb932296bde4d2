//! Score reconciliation and readiness derivation.
//!
//! The backend's reported overall score is not trusted blindly: it is
//! checked against the plain mean of its own component scores, and the
//! readiness tier is re-derived from the critical components. Everything
//! here is pure and shared by the gateway and the command-line client.

pub mod compare;
pub mod components;
pub mod domain;
pub mod explain;
pub mod history;
pub mod reconcile;
pub mod summary;

#[cfg(test)]
mod tests;

pub use compare::{compare_evaluations, EvaluationComparison, FactorDelta, Trend};
pub use components::{display_name, is_critical, max_score, CRITICAL_COMPONENTS, MAX_SCORES};
pub use domain::{
    Evaluation, EvaluationDetail, Job, JobState, Priority, ReadinessLevel, Recommendation,
    ScoreMap,
};
pub use explain::{analysis_brief, explain_readiness};
pub use history::{merge_jobs, write_history_csv, HistoryPage};
pub use reconcile::{compute_accurate_score, derive_readiness_level, AccurateScore, ScoreAverages};
pub use summary::{
    accurate_score, correct_detail, correct_history, readiness_label, summarize, ComponentScore,
    ReconciledSummary,
};

use std::fmt::Write as _;

use super::components::{display_name, is_critical};
use super::domain::{Evaluation, ReadinessLevel};
use super::reconcile::{averages, component_scores, lowest_components};
use super::summary::{derived_readiness, ATTENTION_THRESHOLD};

/// Technology entries listed per category in the analysis brief.
const STACK_ENTRIES_PER_CATEGORY: usize = 5;

fn lowest_names(evaluation: &Evaluation, count: usize) -> String {
    evaluation
        .scores()
        .map(|scores| {
            lowest_components(scores, count)
                .iter()
                .map(|(key, _)| display_name(key))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

/// Plain-language justification of an evaluation's readiness tier.
///
/// The tier is the one derived from component scores; the stored tier is
/// used only when no components are present.
pub fn explain_readiness(evaluation: &Evaluation) -> String {
    let Some(scores) = evaluation.scores() else {
        return "The readiness level is based on the overall evaluation score.".to_string();
    };

    let averages = averages(scores);
    let overall = averages.overall.unwrap_or(evaluation.overall_score).round();
    let critical = averages.critical.round();

    let level = derived_readiness(evaluation)
        .or_else(|| ReadinessLevel::from_label(&evaluation.readiness_level));

    match level {
        Some(ReadinessLevel::CloudNative) => format!(
            "This project demonstrates excellent cloud-native practices with an overall \
             score of {overall}. Critical cloud components scored an average of {critical}, \
             indicating strong containerization, configuration management, and cloud \
             integration capabilities."
        ),
        Some(ReadinessLevel::CloudReady) => format!(
            "This project is well-prepared for cloud deployment with an overall score of \
             {overall}. Critical cloud components scored an average of {critical}, showing \
             good practices in key areas, though there's still room for improvement."
        ),
        Some(ReadinessLevel::CloudFriendly) => format!(
            "This project can run in the cloud with some adjustments. The overall score of \
             {overall} and critical components score of {critical} suggest that while basic \
             cloud compatibility exists, improvements are needed in key areas like {}.",
            lowest_names(evaluation, 2)
        ),
        Some(ReadinessLevel::CloudChallenged) => format!(
            "This project needs significant work before being cloud-ready. The overall score \
             of {overall} and critical components score of {critical} indicate substantial \
             challenges in cloud adoption, particularly in {}.",
            lowest_names(evaluation, 3)
        ),
        None => format!(
            "This project has a readiness level of \"{}\" with an overall score of {overall}.",
            evaluation.readiness_level
        ),
    }
}

fn technology_summary(evaluation: &Evaluation) -> String {
    let Some(stack) = evaluation
        .data
        .as_ref()
        .and_then(|detail| detail.technology_stack.as_ref())
    else {
        return "No technology stack information available".to_string();
    };

    let categories: Vec<String> = stack
        .iter()
        .filter(|(category, _)| category.as_str() != "files")
        .filter_map(|(category, items)| {
            let entries = items.as_object()?;
            if entries.is_empty() {
                return None;
            }
            let names = entries
                .keys()
                .take(STACK_ENTRIES_PER_CATEGORY)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!("{category}: {names}"))
        })
        .collect();

    if categories.is_empty() {
        "No technology stack information available".to_string()
    } else {
        categories.join(" | ")
    }
}

/// Structured plain-text digest of an evaluation, suitable for handing to
/// a reviewer or a language model.
pub fn analysis_brief(evaluation: &Evaluation) -> String {
    let Some(scores) = evaluation.scores() else {
        return "Insufficient data available for comprehensive analysis".to_string();
    };

    let averages = averages(scores);
    let calculated_overall = averages.overall.unwrap_or(evaluation.overall_score);
    let original_level = evaluation.readiness_level.as_str();
    let calculated_level = derived_readiness(evaluation)
        .map(ReadinessLevel::label)
        .unwrap_or(original_level);

    let mut out = String::new();
    let _ = writeln!(out, "PROJECT ANALYSIS DATA:");
    let _ = writeln!(out, "Project: {}", evaluation.project_name);
    let _ = writeln!(
        out,
        "Original Overall Score: {}/100",
        evaluation.overall_score.round()
    );
    let _ = writeln!(
        out,
        "Calculated Overall Score: {}/100",
        calculated_overall.round()
    );
    if evaluation.was_corrected() {
        let _ = writeln!(
            out,
            "Note: Overall score was recalculated due to significant discrepancy with \
             component scores."
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Original Readiness Level: {original_level}");
    let _ = writeln!(out, "Calculated Readiness Level: {calculated_level}");
    if calculated_level != original_level {
        let _ = writeln!(
            out,
            "Note: Readiness level was recalculated based on component scores."
        );
    }
    let _ = writeln!(out);
    let date = evaluation
        .formatted_date
        .as_deref()
        .unwrap_or(&evaluation.timestamp);
    let _ = writeln!(out, "Date: {date}");
    let _ = writeln!(out);

    let _ = writeln!(out, "READINESS EXPLANATION:");
    let _ = writeln!(out, "{}", explain_readiness(evaluation));
    let _ = writeln!(out);

    let _ = writeln!(out, "ALL COMPONENT SCORES:");
    for (key, value) in component_scores(scores) {
        let _ = writeln!(out, "- {}: {}/100", display_name(key), value.round());
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "CRITICAL CLOUD COMPONENTS AVG: {}/100",
        averages.critical.round()
    );
    let mut attention: Vec<(&str, f64)> = component_scores(scores)
        .filter(|(key, value)| is_critical(key) && *value < ATTENTION_THRESHOLD)
        .collect();
    attention.sort_by(|a, b| a.1.total_cmp(&b.1));
    if attention.is_empty() {
        let _ = writeln!(out, "All critical components have acceptable scores.");
    } else {
        let listed = attention
            .iter()
            .map(|(key, value)| format!("{} ({}/100)", display_name(key), value.round()))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "Critical components needing attention: {listed}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "TECHNOLOGY STACK:");
    let _ = writeln!(out, "{}", technology_summary(evaluation));
    let _ = writeln!(out);

    let _ = writeln!(out, "TOP 3 LOWEST SCORING COMPONENTS:");
    for (key, value) in lowest_components(scores, 3) {
        let _ = writeln!(out, "{}: {}/100", display_name(&key), value.round());
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "READINESS CRITERIA SUMMARY:");
    for level in ReadinessLevel::ALL {
        let _ = writeln!(out, "- {}: {}", level.label(), level.criterion());
    }

    out
}

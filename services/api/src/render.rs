use cloudready::backend::{ProjectOutput, TutorialIndex};
use cloudready::readiness::{
    readiness_label, ComponentScore, Evaluation, EvaluationComparison, Job, JobState,
    ReconciledSummary, Trend,
};
use serde_json::Value;
use std::fmt::Write as _;

const BAR_WIDTH: usize = 20;

pub(crate) fn job_line(job: &Job) -> String {
    let mut line = format!("Job {} [{}]", job.id, job.status);
    if let Some(project) = job.project_name.as_deref() {
        let _ = write!(line, " {project}");
    }
    let _ = write!(line, " started {}", job.start_time);
    if let Some(end) = job.end_time.as_deref() {
        let _ = write!(line, ", ended {end}");
    }
    if job.status == JobState::Failed {
        if let Some(error) = job.error.as_deref() {
            let _ = write!(line, "\n  error: {error}");
        }
    }
    line
}

pub(crate) fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Evaluation history as an aligned table; corrected scores are starred.
pub(crate) fn history_table(rows: &[Evaluation]) -> String {
    if rows.is_empty() {
        return "No evaluations found.\n".to_string();
    }

    let mut out = format!(
        "{:<10}  {:<8}  {:<24}  {:>6}  {:<16}  {:<9}  {}\n",
        "DATE", "TIME", "PROJECT", "SCORE", "READINESS", "STATUS", "ID"
    );
    for row in rows {
        let score = if row.is_placeholder() {
            "-".to_string()
        } else if row.was_corrected() {
            format!("{:.0}*", row.overall_score)
        } else {
            format!("{:.0}", row.overall_score)
        };
        let status = row
            .status
            .as_ref()
            .map(|status| status.label().to_string())
            .unwrap_or_else(|| "completed".to_string());
        let _ = writeln!(
            out,
            "{:<10}  {:<8}  {:<24}  {:>6}  {:<16}  {:<9}  {}",
            row.formatted_date.as_deref().unwrap_or("-"),
            row.formatted_time.as_deref().unwrap_or("-"),
            row.project_name,
            score,
            readiness_label(row),
            status,
            row.id
        );
    }
    if rows.iter().any(Evaluation::was_corrected) {
        out.push_str("* recalculated from component scores\n");
    }
    out
}

fn component_rows(out: &mut String, title: &str, components: &[ComponentScore]) {
    if components.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}:");
    for component in components {
        let marker = if component.critical { " (critical)" } else { "" };
        let _ = writeln!(
            out,
            "  {:<24} {} {:>3}{marker}",
            component.display_name,
            score_bar(component.score),
            component.score.round()
        );
    }
}

pub(crate) fn summary_text(summary: &ReconciledSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", summary.project_name, summary.evaluation_id);
    let _ = writeln!(
        out,
        "Overall score: {} {}",
        summary.overall_score.round(),
        score_bar(summary.overall_score)
    );
    if summary.score_corrected {
        let _ = writeln!(
            out,
            "  reported {} by the backend, recalculated from component scores",
            summary.reported_overall.round()
        );
    }
    let _ = writeln!(out, "Readiness: {}", summary.readiness_level);
    if summary.readiness_recalculated {
        let _ = writeln!(out, "  stored as {}", summary.stored_readiness_level);
    }
    if let Some(critical) = summary.critical_average {
        let _ = writeln!(out, "Critical components average: {}", critical.round());
    }
    let _ = writeln!(out, "\n{}", summary.explanation);
    component_rows(&mut out, "Lowest components", &summary.lowest_components);
    component_rows(
        &mut out,
        "Critical components needing attention",
        &summary.critical_attention,
    );
    out
}

fn trend_symbol(trend: Trend) -> &'static str {
    match trend {
        Trend::Improved => "+",
        Trend::Declined => "-",
        Trend::Unchanged => "=",
    }
}

pub(crate) fn comparison_table(comparison: &EvaluationComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Project: {}", comparison.project_name);
    let _ = writeln!(
        out,
        "Base    {}  {}  score {}  {}",
        comparison.base.id,
        comparison.base.timestamp,
        comparison.base.overall_score.round(),
        comparison.base.readiness_level
    );
    let _ = writeln!(
        out,
        "Compare {}  {}  score {}  {}",
        comparison.compare.id,
        comparison.compare.timestamp,
        comparison.compare.overall_score.round(),
        comparison.compare.readiness_level
    );
    let _ = writeln!(
        out,
        "Overall change: {:+} {}\n",
        comparison.overall_diff.round(),
        trend_symbol(comparison.overall_trend)
    );

    let _ = writeln!(
        out,
        "{:<24}  {:>5}  {:>7}  {:>6}  {:>4}",
        "FACTOR", "BASE", "COMPARE", "DIFF", "MAX"
    );
    for factor in &comparison.factors {
        let _ = writeln!(
            out,
            "{:<24}  {:>5}  {:>7}  {:>+6}  {:>4} {}",
            factor.display_name,
            factor.base.round(),
            factor.compare.round(),
            factor.diff.round(),
            factor.max_score,
            trend_symbol(factor.trend)
        );
    }
    out
}

pub(crate) fn tutorial_list(index: &TutorialIndex) -> String {
    if index.tutorials.is_empty() {
        return "No tutorials generated yet.\n".to_string();
    }
    let mut out = String::new();
    for tutorial in &index.tutorials {
        let _ = writeln!(
            out,
            "{} - {} ({} files, created {})",
            tutorial.project_name, tutorial.title, tutorial.file_count, tutorial.created_at
        );
        if !tutorial.description.is_empty() {
            let _ = writeln!(out, "  {}", tutorial.description);
        }
    }
    out
}

pub(crate) fn tutorial_files(output: &ProjectOutput) -> String {
    if output.files.is_empty() {
        return format!("{} has no tutorial files.\n", output.project_name);
    }
    let mut out = format!("{}:\n", output.project_name);
    for (name, content) in &output.files {
        let _ = writeln!(out, "  {name} ({} lines)", content.lines().count());
    }
    out
}

/// Report bodies are usually `{content: "..."}` markdown; anything else is
/// pretty-printed.
pub(crate) fn report_text(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Object(fields) => match fields.get("content").and_then(Value::as_str) {
            Some(content) => content.to_string(),
            None => serde_json::to_string_pretty(body).unwrap_or_default(),
        },
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

pub(crate) fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudready::readiness::{compare_evaluations, summarize};
    use serde_json::json;

    fn evaluation(id: &str, overall: f64, scores: Value) -> Evaluation {
        serde_json::from_value(json!({
            "id": id,
            "project_name": "storefront",
            "timestamp": "2025-03-01T10:00:00",
            "overall_score": overall,
            "readiness_level": "Cloud-Native",
            "formatted_date": "2025-03-01",
            "formatted_time": "10:00:00",
            "data": { "scores": scores, "recommendations": [] }
        }))
        .expect("evaluation fixture")
    }

    #[test]
    fn score_bar_is_proportional() {
        assert_eq!(score_bar(50.0), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(score_bar(140.0), format!("[{}]", "#".repeat(20)));
        assert_eq!(score_bar(-3.0), format!("[{}]", "-".repeat(20)));
    }

    #[test]
    fn history_table_marks_corrections() {
        let mut row = evaluation("eval-1", 45.0, json!({ "containerization": 40, "ci_cd": 50 }));
        if let Some(detail) = row.data.as_mut() {
            detail.corrected_score = true;
        }
        let table = history_table(&[row]);
        assert!(table.contains("45*"));
        assert!(table.contains("storefront"));
        assert!(table.contains("* recalculated from component scores"));
        assert_eq!(history_table(&[]), "No evaluations found.\n");
    }

    #[test]
    fn summary_mentions_recalculation() {
        let evaluation = evaluation(
            "eval-1",
            90.0,
            json!({
                "overall": 90,
                "containerization": 40,
                "configuration": 50,
                "ci_cd": 30,
                "testing": 60
            }),
        );
        let text = summary_text(&summarize(&evaluation));
        assert!(text.contains("Overall score: 45"));
        assert!(text.contains("reported 90 by the backend"));
        assert!(text.contains("Readiness: Cloud-Friendly"));
        assert!(text.contains("stored as Cloud-Native"));
        assert!(text.contains("Ci Cd"));
    }

    #[test]
    fn comparison_lists_factors() {
        let base = evaluation("a", 60.0, json!({ "testing": 40, "ci_cd": 60 }));
        let other = evaluation("b", 70.0, json!({ "testing": 60, "ci_cd": 60 }));
        let table = comparison_table(&compare_evaluations(&base, &other));
        assert!(table.contains("Testing"));
        assert!(table.contains("+20"));
        assert!(table.contains("Overall change:"));
    }

    #[test]
    fn report_text_prefers_content() {
        assert_eq!(report_text(&json!({ "content": "# Report" })), "# Report");
        assert_eq!(report_text(&json!("plain")), "plain");
        assert!(report_text(&json!({ "scores": {} })).contains("\"scores\""));
    }

    #[test]
    fn tutorial_files_are_listed_with_line_counts() {
        let output: ProjectOutput = serde_json::from_value(json!({
            "project_name": "storefront",
            "files": { "index.md": "# Storefront\n\nIntro\n", "01_api.md": "# API\n" }
        }))
        .unwrap();
        assert_eq!(
            tutorial_files(&output),
            "storefront:\n  01_api.md (1 lines)\n  index.md (3 lines)\n"
        );

        let empty: ProjectOutput =
            serde_json::from_value(json!({ "project_name": "billing" })).unwrap();
        assert_eq!(tutorial_files(&empty), "billing has no tutorial files.\n");
    }

    #[test]
    fn tokens_are_masked() {
        assert_eq!(mask_token("ghp_1234567890"), "ghp_******7890");
        assert_eq!(mask_token("short"), "*****");
    }

    #[test]
    fn failed_jobs_show_error() {
        let job: Job = serde_json::from_value(json!({
            "id": "42",
            "status": "failed",
            "start_time": "2025-03-02T09:00:00",
            "project_name": "storefront",
            "error": "clone failed"
        }))
        .unwrap();
        let line = job_line(&job);
        assert!(line.starts_with("Job 42 [failed] storefront"));
        assert!(line.contains("error: clone failed"));
    }
}

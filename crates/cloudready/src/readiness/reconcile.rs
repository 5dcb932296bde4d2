use serde::Serialize;

use super::components::is_critical;
use super::domain::{ReadinessLevel, ScoreMap, OVERALL_KEY};

/// Absolute gap above which the reported overall is discarded.
pub const DISCREPANCY_THRESHOLD: f64 = 20.0;
/// Reported overall above `calculated * INFLATION_RATIO` is discarded.
pub const INFLATION_RATIO: f64 = 1.5;
/// Any critical component under this value blocks the Cloud-Ready tier.
pub const LOW_CRITICAL_THRESHOLD: f64 = 20.0;

const NATIVE_FLOOR: f64 = 75.0;
const READY_FLOOR: f64 = 60.0;
const FRIENDLY_FLOOR: f64 = 40.0;

/// Result of checking a reported overall score against its components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccurateScore {
    pub value: f64,
    pub corrected: bool,
}

impl AccurateScore {
    fn reported(value: f64) -> Self {
        Self {
            value,
            corrected: false,
        }
    }
}

/// Averages over the component entries of a score map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreAverages {
    /// Mean of every component; `None` when there are no components.
    pub overall: Option<f64>,
    /// Mean of the critical components present; 0 when none are.
    pub critical: f64,
    pub has_low_critical: bool,
    pub component_count: usize,
    pub critical_count: usize,
}

/// Component entries, skipping the backend's own aggregate.
pub fn component_scores(scores: &ScoreMap) -> impl Iterator<Item = (&str, f64)> + '_ {
    scores
        .iter()
        .filter(|(key, _)| key.as_str() != OVERALL_KEY)
        .map(|(key, value)| (key.as_str(), *value))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    (count > 0).then(|| sum / count as f64)
}

pub fn averages(scores: &ScoreMap) -> ScoreAverages {
    let overall = mean(component_scores(scores).map(|(_, value)| value));
    let component_count = component_scores(scores).count();

    let critical: Vec<f64> = component_scores(scores)
        .filter(|(key, _)| is_critical(key))
        .map(|(_, value)| value)
        .collect();
    let has_low_critical = critical
        .iter()
        .any(|value| *value < LOW_CRITICAL_THRESHOLD);

    ScoreAverages {
        overall,
        critical: mean(critical.iter().copied()).unwrap_or(0.0),
        has_low_critical,
        component_count,
        critical_count: critical.len(),
    }
}

/// Replace `reported_overall` with the plain component mean when the two
/// disagree sharply, either by absolute gap or by relative inflation.
pub fn compute_accurate_score(scores: &ScoreMap, reported_overall: f64) -> AccurateScore {
    let Some(calculated) = averages(scores).overall else {
        return AccurateScore::reported(reported_overall);
    };

    let discrepancy = (reported_overall - calculated).abs();
    if discrepancy > DISCREPANCY_THRESHOLD || reported_overall > calculated * INFLATION_RATIO {
        AccurateScore {
            value: calculated,
            corrected: true,
        }
    } else {
        AccurateScore::reported(reported_overall)
    }
}

/// Tier for a score map, or `None` when it has no component entries.
pub fn derive_readiness_level(scores: &ScoreMap) -> Option<ReadinessLevel> {
    let averages = averages(scores);
    let overall = averages.overall?;
    Some(classify(averages.critical, overall, averages.has_low_critical))
}

pub(crate) fn classify(
    critical_avg: f64,
    overall_avg: f64,
    has_low_critical: bool,
) -> ReadinessLevel {
    if critical_avg >= NATIVE_FLOOR && overall_avg >= NATIVE_FLOOR {
        ReadinessLevel::CloudNative
    } else if critical_avg >= READY_FLOOR && overall_avg >= READY_FLOOR && !has_low_critical {
        ReadinessLevel::CloudReady
    } else if critical_avg >= FRIENDLY_FLOOR && overall_avg >= FRIENDLY_FLOOR {
        ReadinessLevel::CloudFriendly
    } else {
        ReadinessLevel::CloudChallenged
    }
}

/// The `count` lowest-scoring components, ascending. Ties keep key order.
pub fn lowest_components(scores: &ScoreMap, count: usize) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = component_scores(scores)
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));
    entries.truncate(count);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(entries: &[(&str, f64)]) -> ScoreMap {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn calculated_mean_ignores_overall() {
        let map = scores(&[
            ("overall", 99.0),
            ("testing", 40.0),
            ("ci_cd", 70.0),
            ("health_checks", 55.0),
        ]);
        let averages = averages(&map);
        let expected = (40.0 + 70.0 + 55.0) / 3.0;
        assert!((averages.overall.unwrap() - expected).abs() < 1e-9);
        assert_eq!(averages.component_count, 3);
    }

    #[test]
    fn trustworthy_report_is_kept() {
        let map = scores(&[("overall", 58.0), ("testing", 50.0), ("ci_cd", 50.0)]);
        let result = compute_accurate_score(&map, 58.0);
        assert_eq!(result, AccurateScore { value: 58.0, corrected: false });
    }

    #[test]
    fn large_gap_is_corrected() {
        let map = scores(&[("testing", 40.0), ("ci_cd", 60.0)]);
        let result = compute_accurate_score(&map, 90.0);
        assert!(result.corrected);
        assert!((result.value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn inflation_alone_triggers_correction() {
        // gap of 15 stays under the absolute threshold, but 25 > 10 * 1.5
        let map = scores(&[("testing", 10.0), ("ci_cd", 10.0)]);
        let result = compute_accurate_score(&map, 25.0);
        assert!(result.corrected);
        assert!((result.value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn underreported_overall_within_gap_is_kept() {
        let map = scores(&[("testing", 70.0), ("ci_cd", 70.0)]);
        let result = compute_accurate_score(&map, 55.0);
        assert!(!result.corrected);
        assert_eq!(result.value, 55.0);
    }

    #[test]
    fn empty_components_return_reported() {
        let map = scores(&[("overall", 80.0)]);
        assert_eq!(
            compute_accurate_score(&map, 80.0),
            AccurateScore { value: 80.0, corrected: false }
        );
        assert_eq!(derive_readiness_level(&map), None);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(classify(75.0, 75.0, false), ReadinessLevel::CloudNative);
        assert_eq!(classify(75.0, 74.9, false), ReadinessLevel::CloudReady);
        assert_eq!(classify(60.0, 60.0, true), ReadinessLevel::CloudFriendly);
        assert_eq!(classify(40.0, 40.0, false), ReadinessLevel::CloudFriendly);
        assert_eq!(classify(39.9, 90.0, false), ReadinessLevel::CloudChallenged);
    }

    #[test]
    fn lowest_components_sorted_ascending() {
        let map = scores(&[("overall", 10.0), ("a", 30.0), ("b", 10.0), ("c", 20.0)]);
        let lowest = lowest_components(&map, 2);
        assert_eq!(lowest, vec![("b".to_string(), 10.0), ("c".to_string(), 20.0)]);
    }
}

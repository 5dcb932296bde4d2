//! Static knowledge about the scored components.

/// Components whose scores weigh on the readiness tier.
pub const CRITICAL_COMPONENTS: [&str; 6] = [
    "containerization",
    "configuration",
    "cloud_integration",
    "state_management",
    "infrastructure_as_code",
    "ci_cd",
];

/// Maximum attainable score per component. The weights total 105.
pub const MAX_SCORES: [(&str, u8); 14] = [
    ("language_compatibility", 15),
    ("containerization", 15),
    ("ci_cd", 10),
    ("configuration", 10),
    ("cloud_integration", 10),
    ("service_coupling", 5),
    ("logging_practices", 5),
    ("state_management", 5),
    ("code_modularity", 5),
    ("dependency_management", 5),
    ("health_checks", 5),
    ("testing", 5),
    ("instrumentation", 5),
    ("infrastructure_as_code", 5),
];

/// Used when a component is missing from [`MAX_SCORES`].
pub const DEFAULT_MAX_SCORE: u8 = 10;

pub fn is_critical(component: &str) -> bool {
    CRITICAL_COMPONENTS.contains(&component)
}

pub fn max_score(component: &str) -> Option<u8> {
    MAX_SCORES
        .iter()
        .find(|(name, _)| *name == component)
        .map(|(_, max)| *max)
}

pub fn max_score_or_default(component: &str) -> u8 {
    max_score(component).unwrap_or(DEFAULT_MAX_SCORE)
}

/// `cloud_integration` -> `Cloud Integration`.
pub fn display_name(component: &str) -> String {
    component
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Result of `POST /test-github-token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_remaining: Option<u64>,
    /// Unix seconds at which the rate limit window resets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_reset: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<String>,
}

impl TokenCheck {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            rate_limit: None,
            rate_remaining: None,
            rate_reset: None,
            reset_time: None,
        }
    }

    /// Human-readable reset time; falls back to formatting `rate_reset`.
    pub fn reset_display(&self) -> Option<String> {
        if let Some(reset_time) = self.reset_time.as_ref().filter(|s| !s.is_empty()) {
            return Some(reset_time.clone());
        }
        let seconds = self.rate_reset?;
        Local
            .timestamp_opt(seconds, 0)
            .single()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
    }

    pub fn summary(&self) -> String {
        if !self.valid {
            return format!(
                "Token is invalid: {}",
                self.message.as_deref().unwrap_or("rejected by GitHub")
            );
        }
        let mut summary = "Token is valid".to_string();
        if let (Some(remaining), Some(limit)) = (self.rate_remaining, self.rate_limit) {
            summary.push_str(&format!(" ({remaining}/{limit} requests remaining"));
            if let Some(reset) = self.reset_display() {
                summary.push_str(&format!(", resets at {reset}"));
            }
            summary.push(')');
        }
        summary
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 100_000;

/// Raw, unvalidated job parameters as a user supplies them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisForm {
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub local_dir: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub use_llm_cloud_analysis: Option<bool>,
}

/// Validated body for `POST /analyze-cloud`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_dir: Option<String>,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_file_size: u64,
    pub use_llm_cloud_analysis: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisRequestError {
    #[error("provide either a repository URL or a local directory path")]
    MissingSource,
    #[error("provide a repository URL or a local directory path, not both")]
    ConflictingSources,
    #[error("'{0}' is not a GitHub repository URL (https://github.com/<owner>/<repo>)")]
    InvalidRepositoryUrl(String),
    #[error("could not derive a project name from '{0}'; pass one explicitly")]
    MissingProjectName(String),
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn is_github_repository(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if url.scheme() != "https" || url.host_str() != Some("github.com") {
        return false;
    }
    url.path_segments()
        .map(|segments| segments.take(2).filter(|s| !s.is_empty()).count() == 2)
        .unwrap_or(false)
}

fn name_from_url(raw: &str) -> Option<String> {
    let last = raw.trim_end_matches('/').rsplit('/').next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty()).then(|| name.to_string())
}

fn name_from_dir(raw: &str) -> Option<String> {
    Path::new(raw.trim_end_matches(&['/', '\\'][..]))
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

impl AnalysisForm {
    /// Validate the form, deriving the project name when none was given.
    pub fn validate(self) -> Result<AnalysisRequest, AnalysisRequestError> {
        let repo_url = non_blank(self.repo_url);
        let local_dir = non_blank(self.local_dir);

        let derived_name = match (&repo_url, &local_dir) {
            (None, None) => return Err(AnalysisRequestError::MissingSource),
            (Some(_), Some(_)) => return Err(AnalysisRequestError::ConflictingSources),
            (Some(url), None) => {
                if !is_github_repository(url) {
                    return Err(AnalysisRequestError::InvalidRepositoryUrl(url.clone()));
                }
                name_from_url(url)
                    .ok_or_else(|| AnalysisRequestError::MissingProjectName(url.clone()))
            }
            (None, Some(dir)) => {
                name_from_dir(dir)
                    .ok_or_else(|| AnalysisRequestError::MissingProjectName(dir.clone()))
            }
        };

        let project_name = match non_blank(self.project_name) {
            Some(name) => name,
            None => derived_name?,
        };

        Ok(AnalysisRequest {
            repo_url,
            local_dir,
            project_name,
            github_token: non_blank(self.github_token),
            include_patterns: self.include_patterns,
            exclude_patterns: self.exclude_patterns,
            max_file_size: self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
            use_llm_cloud_analysis: self.use_llm_cloud_analysis.unwrap_or(true),
        })
    }
}

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::error::BackendError;
use super::models::{evaluation_rows, EvaluationList, ProjectOutput, StartedJob, TutorialIndex};
use crate::analysis::AnalysisRequest;
use crate::config::BackendConfig;
use crate::readiness::{correct_history, merge_jobs, Evaluation, HistoryPage, Job};
use crate::settings::TokenCheck;

/// Generated report artifacts the backend serves per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    CloudData,
    CloudDashboard,
    CloudReadiness,
}

impl ReportKind {
    pub fn segment(self) -> &'static str {
        match self {
            ReportKind::CloudData => "cloud-data",
            ReportKind::CloudDashboard => "cloud-dashboard",
            ReportKind::CloudReadiness => "cloud-readiness",
        }
    }
}

/// A file relayed byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Thin JSON client over the backend's REST surface.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn typed<T: DeserializeOwned>(value: Value) -> Result<T, BackendError> {
    Ok(serde_json::from_value(value)?)
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let invalid = |reason: String| BackendError::InvalidUrl {
            url: config.base_url.clone(),
            reason,
        };

        let base_url = Url::parse(&config.base_url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(invalid("expected an http(s) base url".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| invalid(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(BackendError::Unreachable)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let bytes = response.bytes().await.map_err(BackendError::Unreachable)?;
        debug!(%status, "backend returned an error status");
        Err(BackendError::Status {
            status,
            body: decode_body(&bytes),
        })
    }

    async fn read_json(response: Response) -> Result<Value, BackendError> {
        let bytes = response.bytes().await.map_err(BackendError::Unreachable)?;
        Ok(decode_body(&bytes))
    }

    pub async fn get(&self, segments: &[&str]) -> Result<Value, BackendError> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let response = self.send(self.http.get(url)).await?;
        Self::read_json(response).await
    }

    pub async fn get_query<Q>(&self, segments: &[&str], query: &Q) -> Result<Value, BackendError>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let response = self.send(self.http.get(url).query(query)).await?;
        Self::read_json(response).await
    }

    pub async fn post<B>(&self, segments: &[&str], body: &B) -> Result<Value, BackendError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments);
        debug!(%url, "POST");
        let response = self.send(self.http.post(url).json(body)).await?;
        Self::read_json(response).await
    }

    pub async fn delete(&self, segments: &[&str]) -> Result<Value, BackendError> {
        let url = self.endpoint(segments);
        debug!(%url, "DELETE");
        let response = self.send(self.http.delete(url)).await?;
        Self::read_json(response).await
    }

    pub async fn get_raw(&self, segments: &[&str]) -> Result<RawFile, BackendError> {
        let url = self.endpoint(segments);
        debug!(%url, "GET raw");
        let response = self.send(self.http.get(url)).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(BackendError::Unreachable)?;
        Ok(RawFile {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    pub async fn start_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<StartedJob, BackendError> {
        typed(self.post(&["analyze-cloud"], request).await?)
    }

    pub async fn job_status(&self, job_id: &str) -> Result<Job, BackendError> {
        typed(self.get(&["status", job_id]).await?)
    }

    pub async fn jobs(&self) -> Result<Vec<Job>, BackendError> {
        match self.get(&["jobs"]).await? {
            Value::Null => Ok(Vec::new()),
            value => typed(value),
        }
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<Value, BackendError> {
        self.delete(&["jobs", job_id]).await
    }

    pub async fn latest_evaluations(&self, limit: u32) -> Result<Vec<Evaluation>, BackendError> {
        let list: EvaluationList =
            typed(self.get_query(&["latest-evaluations"], &[("limit", limit)]).await?)?;
        Ok(list.evaluations)
    }

    /// Latest evaluations merged with in-flight jobs, newest first, with
    /// discrepant scores corrected.
    pub async fn merged_history(&self, limit: u32) -> Result<HistoryPage, BackendError> {
        let (evaluations, jobs) = tokio::try_join!(self.latest_evaluations(limit), self.jobs())?;
        let mut evaluations = merge_jobs(evaluations, &jobs);
        let corrected = correct_history(&mut evaluations);
        debug!(rows = evaluations.len(), corrected, "merged evaluation history");
        Ok(HistoryPage::new(evaluations))
    }

    pub async fn cloud_history(&self, project_name: &str) -> Result<Value, BackendError> {
        self.get(&["cloud-history", project_name]).await
    }

    /// A project's evaluations, typed. Accepts either a bare list or an
    /// `{evaluations}` wrapper.
    pub async fn project_evaluations(
        &self,
        project_name: &str,
    ) -> Result<Vec<Evaluation>, BackendError> {
        match self.cloud_history(project_name).await? {
            Value::Array(items) => Ok(evaluation_rows(items)),
            value => Ok(typed::<EvaluationList>(value)?.evaluations),
        }
    }

    pub async fn cloud_evaluation(&self, evaluation_id: &str) -> Result<Evaluation, BackendError> {
        typed(self.get(&["cloud-evaluation", evaluation_id]).await?)
    }

    pub async fn report(
        &self,
        project_name: &str,
        kind: ReportKind,
    ) -> Result<Value, BackendError> {
        self.get(&["output", project_name, kind.segment()]).await
    }

    pub async fn project_output(&self, project_name: &str) -> Result<ProjectOutput, BackendError> {
        typed(self.get(&["output", project_name]).await?)
    }

    pub async fn project_file(
        &self,
        project_name: &str,
        filename: &str,
    ) -> Result<RawFile, BackendError> {
        self.get_raw(&["file", project_name, filename]).await
    }

    pub async fn tutorials(&self) -> Result<TutorialIndex, BackendError> {
        typed(self.get(&["tutorials"]).await?)
    }

    pub async fn delete_tutorial(&self, project_name: &str) -> Result<Value, BackendError> {
        self.delete(&["tutorials", project_name]).await
    }

    pub async fn test_github_token(&self, token: &str) -> Result<TokenCheck, BackendError> {
        typed(self.post(&["test-github-token"], &json!({ "token": token })).await?)
    }
}

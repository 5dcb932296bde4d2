use std::future::Future;

use crate::backend::{BackendClient, BackendError};
use crate::readiness::{HistoryPage, Job};

/// Source of job and history snapshots for the pollers.
pub trait StatusFeed: Send + Sync + 'static {
    fn job_status(&self, job_id: &str) -> impl Future<Output = Result<Job, BackendError>> + Send;

    fn history(&self, limit: u32) -> impl Future<Output = Result<HistoryPage, BackendError>> + Send;
}

impl StatusFeed for BackendClient {
    fn job_status(&self, job_id: &str) -> impl Future<Output = Result<Job, BackendError>> + Send {
        BackendClient::job_status(self, job_id)
    }

    fn history(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<HistoryPage, BackendError>> + Send {
        self.merged_history(limit)
    }
}

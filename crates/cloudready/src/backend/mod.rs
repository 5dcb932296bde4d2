//! HTTP client for the external analysis backend.

mod client;
mod error;
mod models;

pub use client::{BackendClient, RawFile, ReportKind};
pub use error::BackendError;
pub use models::{EvaluationList, ProjectOutput, StartedJob, Tutorial, TutorialIndex};

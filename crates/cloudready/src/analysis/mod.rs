//! Analysis job submission: the contract behind the "analyze" form.

mod patterns;
mod request;

pub use patterns::{normalize_pattern_fields, split_patterns, PATTERN_FIELDS};
pub use request::{AnalysisForm, AnalysisRequest, AnalysisRequestError, DEFAULT_MAX_FILE_SIZE};

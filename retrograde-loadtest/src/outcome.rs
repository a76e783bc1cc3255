//! Success/failure classification of issued requests

use retrograde_http::{HttpError, HttpResponse};
use serde::Serialize;

/// How a task wants its response status judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// 2xx is success, anything else is failure
    Default,
    /// Like `Default`, but 404 also counts as success. Used where another
    /// virtual user may already have removed the card.
    NotFoundIsSuccess,
}

/// Result of one request as reported to the metrics collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Classify a response status under `policy`
pub fn classify(status: u16, policy: StatusPolicy) -> Outcome {
    match (status, policy) {
        (200..=299, _) => Outcome::Success,
        (404, StatusPolicy::NotFoundIsSuccess) => Outcome::Success,
        (status, _) => Outcome::Failure(format!("HTTP {}", status)),
    }
}

/// Classify the result of a send, transport errors included
pub fn classify_result(result: &Result<HttpResponse, HttpError>, policy: StatusPolicy) -> Outcome {
    match result {
        Ok(response) => classify(response.status, policy),
        Err(error) => Outcome::Failure(error.to_string()),
    }
}

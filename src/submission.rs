//! Remote lead submission.
//!
//! Submissions are best-effort telemetry. A sink dispatches the payload
//! without blocking the caller and later reports the outcome over a channel;
//! the funnel moves on identically whichever outcome arrives.

use std::{sync::mpsc::Sender, thread, time::Duration};

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::finance::Term;

/// Snapshot of the quote the user accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    /// Local wall-clock time of the click, `dd.mm.yyyy, HH:MM:SS`.
    pub date: String,
    pub variant: String,
    pub sum: i64,
    /// Term in months, as text.
    pub period: String,
    pub payment: f64,
}

impl Submission {
    pub fn new(at: DateTime<Local>, variant: &str, sum: i64, term: Term, payment: f64) -> Self {
        Self {
            date: at.format("%d.%m.%Y, %H:%M:%S").to_string(),
            variant: variant.to_string(),
            sum,
            period: term.months().to_string(),
            payment,
        }
    }

    pub fn to_json(&self) -> Result<String, SubmitError> {
        serde_json::to_string(self).map_err(SubmitError::Encode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Delivered,
    Failed(String),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("failed to encode submission: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("collector answered with status {0}")]
    Status(u16),

    #[error("failed to start submission worker: {0}")]
    Spawn(#[source] std::io::Error),
}

pub trait SubmissionSink {
    /// Starts delivering `submission` and returns immediately. Exactly one
    /// outcome must eventually be sent on `done`.
    fn submit(&self, submission: Submission, done: Sender<SubmissionOutcome>);
}

/// Posts submissions as a JSON text body from a worker thread.
#[derive(Debug, Clone)]
pub struct HttpSubmission {
    endpoint: String,
    timeout: Duration,
}

impl HttpSubmission {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(endpoint: &str, timeout: Duration, submission: &Submission) -> Result<(), SubmitError> {
        let body = submission.to_json()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SubmitError::Client)?;
        let response = client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(body)
            .send()
            .map_err(SubmitError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status(status.as_u16()));
        }
        Ok(())
    }
}

impl SubmissionSink for HttpSubmission {
    fn submit(&self, submission: Submission, done: Sender<SubmissionOutcome>) {
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        let worker_done = done.clone();

        let spawned = thread::Builder::new()
            .name("submission".to_string())
            .spawn(move || {
                let outcome = match Self::post(&endpoint, timeout, &submission) {
                    Ok(()) => {
                        debug!(%endpoint, "submission delivered");
                        SubmissionOutcome::Delivered
                    }
                    Err(err) => {
                        warn!(%endpoint, error = %err, "submission failed");
                        SubmissionOutcome::Failed(err.to_string())
                    }
                };
                // The receiver is gone only when the session has already ended.
                let _ = worker_done.send(outcome);
            });

        if let Err(err) = spawned {
            let err = SubmitError::Spawn(err);
            warn!(error = %err, "submission not dispatched");
            let _ = done.send(SubmissionOutcome::Failed(err.to_string()));
        }
    }
}

//! Asynchronous job handling for payment requests.
//!
//! A caller submits free text and receives a [`JobId`] immediately; the
//! pipeline runs on the tokio runtime and the caller polls for the outcome.
//!
//! ```text
//! processing ──▶ completed   (removed `retention` after completion)
//!            └─▶ failed      (retained, or removed per FailedJobPolicy)
//! ```
//!
//! Terminal states are final. Nothing survives a process restart.

mod orchestrator;
mod store;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use orchestrator::{FailedJobPolicy, JobConfig, JobOrchestrator};
pub use store::JobStore;

use crate::pipeline::PaymentQr;
use crate::timestamp::UnixMillis;

/// Opaque job identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Externally visible job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Submitted; the pipeline has not finished.
    Processing,
    /// The pipeline produced a [`PaymentQr`].
    Completed,
    /// The pipeline returned an error.
    Failed,
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) enum JobState {
    Processing,
    Completed(Arc<PaymentQr>),
    Failed(String),
}

/// A job record as held by the [`JobStore`].
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    input: String,
    state: JobState,
    start_time: UnixMillis,
    completion_time: Option<UnixMillis>,
}

impl Job {
    pub(crate) fn new(input: String) -> Self {
        Self {
            id: JobId::new(),
            input,
            state: JobState::Processing,
            start_time: UnixMillis::now(),
            completion_time: None,
        }
    }

    /// The job's identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// The submitted text.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        match self.state {
            JobState::Processing => JobStatus::Processing,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Failed(_) => JobStatus::Failed,
        }
    }

    /// Submission time.
    #[must_use]
    pub const fn start_time(&self) -> UnixMillis {
        self.start_time
    }

    /// Time the job reached a terminal state, if it has.
    #[must_use]
    pub const fn completion_time(&self) -> Option<UnixMillis> {
        self.completion_time
    }

    /// Error message of a failed job.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            JobState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub(crate) const fn is_processing(&self) -> bool {
        matches!(self.state, JobState::Processing)
    }

    pub(crate) fn finish(&mut self, state: JobState) {
        self.state = state;
        self.completion_time = Some(UnixMillis::now());
    }

    pub(crate) fn outcome(&self) -> JobOutcome {
        match &self.state {
            JobState::Processing => JobOutcome::Pending,
            JobState::Completed(qr) => JobOutcome::Completed(Arc::clone(qr)),
            JobState::Failed(message) => JobOutcome::Failed(message.clone()),
        }
    }
}

/// Response of a status poll: `{"status": ..., "error"?: ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatusView {
    /// Current status.
    pub status: JobStatus,
    /// Failure message, present only for failed jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for JobStatusView {
    fn from(job: &Job) -> Self {
        Self {
            status: job.status(),
            error: job.error().map(str::to_owned),
        }
    }
}

/// Result of a result poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Still running.
    Pending,
    /// Finished successfully.
    Completed(Arc<PaymentQr>),
    /// Finished with the stored error message.
    Failed(String),
}

/// Advisory load snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capacity {
    /// `true` while `current_jobs < max_jobs`.
    pub available: bool,
    /// Jobs currently held in the store, in any state.
    pub current_jobs: usize,
    /// Configured ceiling.
    pub max_jobs: usize,
}

/// Errors from job lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The id was never issued or its record has been removed.
    #[error("Job not found")]
    NotFound,
}

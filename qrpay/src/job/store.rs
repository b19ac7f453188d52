use std::sync::Arc;

use dashmap::DashMap;

use super::{Job, JobError, JobId, JobOutcome, JobState, JobStatusView};
use crate::pipeline::PaymentQr;

/// In-memory job table.
///
/// Owned by a [`JobOrchestrator`](super::JobOrchestrator) and shared with its
/// worker tasks through an `Arc`. Each entry is locked independently, so
/// concurrent polls never block one another on unrelated jobs.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<JobId, Job>,
}

impl JobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new `processing` job for `input` and returns its id.
    pub fn insert(&self, input: String) -> JobId {
        let job = Job::new(input);
        let id = job.id();
        self.jobs.insert(id, job);
        id
    }

    /// Returns a snapshot of the job.
    #[must_use]
    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.get(id).map(|entry| entry.value().clone())
    }

    /// Status view of the job.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] for unknown or removed ids.
    pub fn status(&self, id: &JobId) -> Result<JobStatusView, JobError> {
        self.jobs
            .get(id)
            .map(|entry| JobStatusView::from(entry.value()))
            .ok_or(JobError::NotFound)
    }

    /// Outcome of the job.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] for unknown or removed ids.
    pub fn outcome(&self, id: &JobId) -> Result<JobOutcome, JobError> {
        self.jobs
            .get(id)
            .map(|entry| entry.value().outcome())
            .ok_or(JobError::NotFound)
    }

    /// Moves a `processing` job to `completed`. Returns `false` if the job is
    /// gone or already terminal.
    pub fn complete(&self, id: &JobId, result: PaymentQr) -> bool {
        self.finish(id, JobState::Completed(Arc::new(result)))
    }

    /// Moves a `processing` job to `failed`. Returns `false` if the job is
    /// gone or already terminal.
    pub fn fail(&self, id: &JobId, message: String) -> bool {
        self.finish(id, JobState::Failed(message))
    }

    fn finish(&self, id: &JobId, state: JobState) -> bool {
        match self.jobs.get_mut(id) {
            Some(mut entry) if entry.is_processing() => {
                entry.finish(state);
                true
            }
            _ => false,
        }
    }

    /// Deletes the job.
    pub fn remove(&self, id: &JobId) -> Option<Job> {
        self.jobs.remove(id).map(|(_, job)| job)
    }

    /// Number of jobs held, in any state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns `true` if no jobs are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

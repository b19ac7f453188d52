use std::sync::Arc;
use std::time::Duration;

use super::{Capacity, JobError, JobId, JobOutcome, JobStatusView, JobStore};
use crate::error::{Error, Result};
use crate::pipeline::{PaymentQr, PaymentRequestPipeline};

/// What happens to a failed job's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailedJobPolicy {
    /// Keep failed jobs until the process exits. Long-running services
    /// accumulate them, and they count toward [`Capacity::current_jobs`].
    #[default]
    Retain,
    /// Remove failed jobs after the same retention as completed ones.
    Expire,
}

/// Orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobConfig {
    /// Advisory ceiling reported by [`JobOrchestrator::capacity`].
    pub max_jobs: usize,
    /// How long a terminal job stays pollable.
    pub retention: Duration,
    /// Treatment of failed jobs.
    pub failed_policy: FailedJobPolicy,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            max_jobs: 10,
            retention: Duration::from_secs(30),
            failed_policy: FailedJobPolicy::default(),
        }
    }
}

/// Accepts payment requests and runs them in the background.
///
/// Cloning is cheap; clones share the same [`JobStore`].
///
/// # Example
///
/// ```
/// use qrpay::chain::ChainRegistry;
/// use qrpay::job::{JobConfig, JobOrchestrator, JobOutcome};
/// use qrpay::pipeline::PaymentRequestPipeline;
/// use qrpay::render::PassthroughRenderer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pipeline = PaymentRequestPipeline::new(ChainRegistry::builtin(), PassthroughRenderer);
/// let jobs = JobOrchestrator::new(pipeline, JobConfig::default());
///
/// let id = jobs.submit("send 1 BTC on bitcoin to 1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
/// while jobs.result(&id).unwrap() == JobOutcome::Pending {
///     tokio::task::yield_now().await;
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JobOrchestrator {
    pipeline: PaymentRequestPipeline,
    store: Arc<JobStore>,
    config: JobConfig,
}

impl JobOrchestrator {
    /// Creates an orchestrator with an empty store.
    #[must_use]
    pub fn new(pipeline: PaymentRequestPipeline, config: JobConfig) -> Self {
        Self::with_store(pipeline, Arc::new(JobStore::new()), config)
    }

    /// Creates an orchestrator over an existing store.
    #[must_use]
    pub const fn with_store(
        pipeline: PaymentRequestPipeline,
        store: Arc<JobStore>,
        config: JobConfig,
    ) -> Self {
        Self {
            pipeline,
            store,
            config,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Returns the job table.
    #[must_use]
    pub const fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Records a `processing` job and starts it in the background.
    ///
    /// Returns immediately; identical inputs yield independent jobs.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn submit(&self, input: impl Into<String>) -> JobId {
        let input = input.into();
        let id = self.store.insert(input.clone());

        #[cfg(feature = "telemetry")]
        tracing::info!(job_id = %id, "Job submitted");

        let worker = self.clone();
        tokio::spawn(async move { worker.run(id, input).await });
        id
    }

    async fn run(self, id: JobId, input: String) {
        let expire = match self.execute(input).await {
            Ok(result) => {
                #[cfg(feature = "telemetry")]
                tracing::info!(job_id = %id, uri = %result.uri, "Job completed");
                self.store.complete(&id, result);
                true
            }
            Err(err) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(job_id = %id, error = %err, "Job failed");
                self.store.fail(&id, format!("Processing failed: {err}"));
                self.config.failed_policy == FailedJobPolicy::Expire
            }
        };

        if expire {
            tokio::time::sleep(self.config.retention).await;
            self.store.remove(&id);
            #[cfg(feature = "telemetry")]
            tracing::debug!(job_id = %id, "Job expired");
        }
    }

    async fn execute(&self, input: String) -> Result<PaymentQr> {
        let prepared = self.pipeline.prepare(&input)?;
        let pipeline = self.pipeline.clone();
        tokio::task::spawn_blocking(move || pipeline.render(prepared))
            .await
            .map_err(|e| Error::Render(e.to_string()))?
    }

    /// Current status of a job.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] for unknown or expired ids.
    pub fn status(&self, id: &JobId) -> Result<JobStatusView, JobError> {
        self.store.status(id)
    }

    /// Outcome of a job.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] for unknown or expired ids.
    pub fn result(&self, id: &JobId) -> Result<JobOutcome, JobError> {
        self.store.outcome(id)
    }

    /// Advisory load snapshot. Submissions are never refused on its basis.
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        let current_jobs = self.store.len();
        Capacity {
            available: current_jobs < self.config.max_jobs,
            current_jobs,
            max_jobs: self.config.max_jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainRegistry;
    use crate::job::JobStatus;
    use crate::render::{PassthroughRenderer, RenderError, Renderer};

    const VALID: &str =
        r#"send 0.05 ETH to 0x1111111111111111111111111111111111111111 on ethereum labeled "Test""#;

    struct PanickingRenderer;

    impl Renderer for PanickingRenderer {
        fn render(&self, _text: &str) -> Result<String, RenderError> {
            panic!("renderer crashed");
        }
    }

    fn orchestrator(config: JobConfig) -> JobOrchestrator {
        let pipeline = PaymentRequestPipeline::new(ChainRegistry::builtin(), PassthroughRenderer);
        JobOrchestrator::new(pipeline, config)
    }

    async fn settle(jobs: &JobOrchestrator, id: &JobId) -> JobOutcome {
        for _ in 0..200 {
            match jobs.result(id).unwrap() {
                JobOutcome::Pending => tokio::time::sleep(Duration::from_millis(5)).await,
                outcome => return outcome,
            }
        }
        panic!("job {id} did not finish");
    }

    #[tokio::test]
    async fn test_submit_returns_processing_job() {
        let jobs = orchestrator(JobConfig::default());
        let id = jobs.submit(VALID);
        let job = jobs.store().get(&id).unwrap();
        assert_eq!(job.input(), VALID);
        assert!(matches!(
            jobs.status(&id).unwrap().status,
            JobStatus::Processing | JobStatus::Completed
        ));
    }

    #[tokio::test]
    async fn test_valid_request_completes() {
        let jobs = orchestrator(JobConfig::default());
        let id = jobs.submit(VALID);

        let JobOutcome::Completed(qr) = settle(&jobs, &id).await else {
            panic!("expected completion");
        };
        assert_eq!(
            qr.uri,
            "ethereum:0x1111111111111111111111111111111111111111?value=50000000000000000&label=Test"
        );
        let view = jobs.status(&id).unwrap();
        assert_eq!(view.status, JobStatus::Completed);
        assert_eq!(view.error, None);
    }

    #[tokio::test]
    async fn test_invalid_request_fails_with_message() {
        let jobs = orchestrator(JobConfig::default());
        let id = jobs.submit("send 5 USDC on dogecoin");

        assert_eq!(
            settle(&jobs, &id).await,
            JobOutcome::Failed(
                "Processing failed: Invalid input format. Please specify chain, amount, token, and address."
                    .into()
            )
        );
        assert_eq!(jobs.status(&id).unwrap().status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_renderer_panic_fails_only_that_job() {
        let pipeline = PaymentRequestPipeline::new(ChainRegistry::builtin(), PanickingRenderer);
        let jobs = JobOrchestrator::new(pipeline, JobConfig::default());
        let id = jobs.submit(VALID);

        let JobOutcome::Failed(message) = settle(&jobs, &id).await else {
            panic!("expected failure");
        };
        assert!(message.starts_with("Processing failed: Rendering failed:"), "{message}");
        assert_eq!(jobs.status(&id).unwrap().status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_same_input_twice_yields_independent_jobs() {
        let jobs = orchestrator(JobConfig::default());
        let a = jobs.submit(VALID);
        let b = jobs.submit(VALID);
        assert_ne!(a, b);
        assert!(matches!(settle(&jobs, &a).await, JobOutcome::Completed(_)));
        assert!(matches!(settle(&jobs, &b).await, JobOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let jobs = orchestrator(JobConfig::default());
        let id = JobId::new();
        assert_eq!(jobs.status(&id).unwrap_err(), JobError::NotFound);
        assert_eq!(jobs.result(&id).unwrap_err(), JobError::NotFound);
    }

    #[tokio::test]
    async fn test_completed_jobs_expire_after_retention() {
        let jobs = orchestrator(JobConfig {
            retention: Duration::from_millis(50),
            ..JobConfig::default()
        });
        let id = jobs.submit(VALID);
        assert!(matches!(settle(&jobs, &id).await, JobOutcome::Completed(_)));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(jobs.status(&id).unwrap_err(), JobError::NotFound);
    }

    #[tokio::test]
    async fn test_failed_jobs_follow_policy() {
        let config = JobConfig {
            retention: Duration::from_millis(50),
            ..JobConfig::default()
        };
        let retained = orchestrator(config);
        let expired = orchestrator(JobConfig {
            failed_policy: FailedJobPolicy::Expire,
            ..config
        });

        let kept = retained.submit("garbage");
        let dropped = expired.submit("garbage");
        assert!(matches!(settle(&retained, &kept).await, JobOutcome::Failed(_)));
        assert!(matches!(settle(&expired, &dropped).await, JobOutcome::Failed(_)));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(retained.status(&kept).unwrap().status, JobStatus::Failed);
        assert_eq!(expired.status(&dropped).unwrap_err(), JobError::NotFound);
    }

    #[tokio::test]
    async fn test_capacity_is_advisory() {
        let jobs = orchestrator(JobConfig {
            max_jobs: 1,
            ..JobConfig::default()
        });
        assert_eq!(
            jobs.capacity(),
            Capacity {
                available: true,
                current_jobs: 0,
                max_jobs: 1
            }
        );

        let a = jobs.submit("garbage");
        let b = jobs.submit("garbage");
        let capacity = jobs.capacity();
        assert!(!capacity.available);
        assert_eq!(capacity.current_jobs, 2);
        assert!(jobs.status(&a).is_ok());
        assert!(jobs.status(&b).is_ok());
    }
}

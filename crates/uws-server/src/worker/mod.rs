//! Job execution seam.
//!
//! The service dispatches jobs through the [`JobWorker`] trait. Deployments
//! plug in an implementation that actually runs work and reports completion
//! back through the store (results, error summary, terminal phase). The
//! bundled [`NoopWorker`] accepts every dispatch and does nothing, which is
//! enough for driving the phase machine in tests and demos.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::JobSummary;

/// Executes and cancels UWS jobs.
#[async_trait]
pub trait JobWorker: Send + Sync {
    /// Start executing the given job.
    ///
    /// Called after the job has moved to EXECUTING. Implementations write
    /// results or an error summary back through the store when done.
    async fn run(&self, job: &JobSummary) -> AppResult<()>;

    /// Cancel any execution in flight for the given job.
    async fn cancel(&self, job_id: &str) -> AppResult<()>;
}

/// Worker that accepts every job and never produces results.
#[derive(Debug, Clone, Default)]
pub struct NoopWorker;

#[async_trait]
impl JobWorker for NoopWorker {
    async fn run(&self, job: &JobSummary) -> AppResult<()> {
        tracing::debug!(job_id = %job.job_id, "Noop worker accepted job");
        Ok(())
    }

    async fn cancel(&self, job_id: &str) -> AppResult<()> {
        tracing::debug!(job_id = %job_id, "Noop worker cancelled job");
        Ok(())
    }
}

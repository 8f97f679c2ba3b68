//! Job storage for the UWS server.
//!
//! Storage sits behind the [`JobStore`] trait so a persistent backend can
//! replace the bundled in-memory store without touching the service layer.

mod memory;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{JobSummary, Parameters};

pub use memory::MemoryStore;

/// Storage backend for UWS jobs and their results.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Get a job by its ID. Returns `None` for unknown or destroyed jobs.
    async fn get_job(&self, job_id: &str) -> AppResult<Option<JobSummary>>;

    /// Get all live jobs, optionally filtered by owner.
    async fn list_jobs(&self, owner_id: Option<&str>) -> AppResult<Vec<JobSummary>>;

    /// Create a new job from the given parameters and return its summary.
    async fn add_job(
        &self,
        parameters: Parameters,
        owner_id: Option<String>,
        run_id: Option<String>,
    ) -> AppResult<JobSummary>;

    /// Persist an updated job.
    async fn save_job(&self, job: JobSummary) -> AppResult<()>;

    /// Delete a job by its ID. Deleting an unknown job is not an error.
    async fn delete_job(&self, job_id: &str) -> AppResult<()>;
}

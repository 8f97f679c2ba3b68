//! In-memory job store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ExecutionPhase, JobSummary, Parameters, Results, UwsVersion};

use super::JobStore;

/// Job store backed by a process-local map.
///
/// Jobs whose destruction time has passed are evicted lazily on access.
#[derive(Clone)]
pub struct MemoryStore {
    jobs: Arc<RwLock<HashMap<String, JobSummary>>>,
    /// Seconds after creation at which a new job is destroyed.
    default_expiry: u64,
    /// Ceiling in seconds past creation a destruction time may be pushed to.
    max_expiry: u64,
}

impl MemoryStore {
    /// Create an empty store with the given expiry policy.
    pub fn new(default_expiry: u64, max_expiry: u64) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            default_expiry,
            max_expiry,
        }
    }

    /// Clamp a job's destruction time to the maximum expiry window.
    fn clamp_destruction(&self, job: &mut JobSummary) {
        let ceiling = job.creation_time + Duration::seconds(self.max_expiry as i64);
        match job.destruction_time {
            Some(destruction) if destruction > ceiling => {
                tracing::debug!(
                    job_id = %job.job_id,
                    requested = %destruction,
                    clamped = %ceiling,
                    "Destruction time clamped to maximum expiry"
                );
                job.destruction_time = Some(ceiling);
            }
            _ => {}
        }
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn get_job(&self, job_id: &str) -> AppResult<Option<JobSummary>> {
        let now = Utc::now();

        let expired = {
            let jobs = self.jobs.read().await;
            match jobs.get(job_id) {
                Some(job) => matches!(job.destruction_time, Some(t) if t < now),
                None => return Ok(None),
            }
        };

        if expired {
            let mut jobs = self.jobs.write().await;
            // re-check under the write lock
            if matches!(
                jobs.get(job_id).and_then(|j| j.destruction_time),
                Some(t) if t < now
            ) {
                jobs.remove(job_id);
                tracing::debug!(job_id = %job_id, "Evicted job past its destruction time");
                return Ok(None);
            }
        }

        Ok(self.jobs.read().await.get(job_id).cloned())
    }

    async fn list_jobs(&self, owner_id: Option<&str>) -> AppResult<Vec<JobSummary>> {
        let now = Utc::now();
        let jobs = self.jobs.read().await;

        Ok(jobs
            .values()
            .filter(|job| !matches!(job.destruction_time, Some(t) if t < now))
            .filter(|job| match owner_id {
                Some(owner) => job.owner_id.as_deref() == Some(owner),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn add_job(
        &self,
        parameters: Parameters,
        owner_id: Option<String>,
        run_id: Option<String>,
    ) -> AppResult<JobSummary> {
        let now = Utc::now();
        let job = JobSummary {
            job_id: Uuid::new_v4().to_string(),
            run_id,
            owner_id,
            phase: ExecutionPhase::Pending,
            quote: None,
            creation_time: now,
            start_time: None,
            end_time: None,
            execution_duration: 0,
            destruction_time: Some(now + Duration::seconds(self.default_expiry as i64)),
            parameters,
            results: Results::default(),
            error_summary: None,
            job_info: None,
            version: Some(UwsVersion::V1_1),
        };

        self.jobs
            .write()
            .await
            .insert(job.job_id.clone(), job.clone());

        Ok(job)
    }

    async fn save_job(&self, mut job: JobSummary) -> AppResult<()> {
        self.clamp_destruction(&mut job);
        self.jobs.write().await.insert(job.job_id.clone(), job);
        Ok(())
    }

    async fn delete_job(&self, job_id: &str) -> AppResult<()> {
        self.jobs.write().await.remove(job_id);
        Ok(())
    }
}

//! UWS service layer.
//!
//! Encapsulates the business logic between the HTTP handlers and the
//! store/worker seams: job lifecycle, the phase action machine, blocking
//! phase polls, and job-list filtering.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::{sleep, Duration, Instant};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::requests::{UpdateAction, UpdateJobRequest};
use crate::models::{
    ExecutionPhase, JobSummary, Jobs, Parameter, Parameters, PhaseAction, UwsVersion,
};
use crate::store::JobStore;
use crate::worker::JobWorker;

/// How often a blocking GET re-reads the store while waiting for a phase change.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a POST to the job resource, used to pick the redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The job still exists; redirect to the job resource.
    Updated,
    /// The job was deleted via `ACTION=DELETE`; redirect to the job list.
    Deleted,
}

/// Service implementing the UWS job lifecycle.
#[derive(Clone)]
pub struct UwsService {
    store: Arc<dyn JobStore>,
    worker: Arc<dyn JobWorker>,
    max_wait: u64,
}

impl UwsService {
    /// Create a new service over the given store and worker.
    pub fn new(store: Arc<dyn JobStore>, worker: Arc<dyn JobWorker>, config: &AppConfig) -> Self {
        Self {
            store,
            worker,
            max_wait: config.max_wait_time,
        }
    }

    /// Create a new job in the PENDING phase.
    pub async fn create_job(
        &self,
        parameter: Vec<Parameter>,
        owner_id: Option<String>,
        run_id: Option<String>,
    ) -> AppResult<JobSummary> {
        let job = self
            .store
            .add_job(Parameters { parameter }, owner_id, run_id)
            .await?;

        tracing::info!(job_id = %job.job_id, "Job created");
        Ok(job)
    }

    /// Get a job by its ID, or 404.
    pub async fn get_job(&self, job_id: &str) -> AppResult<JobSummary> {
        self.store
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", job_id)))
    }

    /// Get a job summary, optionally blocking until its phase changes.
    ///
    /// `wait` is the maximum seconds to block; negative means the server
    /// maximum. Blocking only applies while the job is in an active phase,
    /// and, when `phase` is given, only while the job is still in that phase.
    pub async fn get_job_summary(
        &self,
        job_id: &str,
        phase: Option<ExecutionPhase>,
        wait: Option<i64>,
    ) -> AppResult<JobSummary> {
        let summary = self.get_job(job_id).await?;

        let wait = match wait {
            Some(w) => w,
            None => return Ok(summary),
        };

        if !summary.phase.is_active() {
            return Ok(summary);
        }

        // A phase filter that no longer matches means the change the client
        // is waiting for already happened.
        if let Some(phase) = phase {
            if summary.phase != phase {
                return Ok(summary);
            }
        }

        let wait_secs = if wait < 0 {
            self.max_wait
        } else {
            (wait as u64).min(self.max_wait)
        };

        let initial_phase = summary.phase;
        let deadline = Instant::now() + Duration::from_secs(wait_secs);

        while Instant::now() < deadline {
            let current = self.store.get_job(job_id).await?.ok_or_else(|| {
                AppError::NotFound(format!(
                    "Job disappeared while polling for phase change: {}",
                    job_id
                ))
            })?;

            if current.phase != initial_phase {
                return Ok(current);
            }

            sleep(POLL_INTERVAL).await;
        }

        // Wait exhausted without a phase change.
        self.get_job(job_id).await
    }

    /// Get the filtered job list, newest first.
    ///
    /// `phases` match with OR semantics and combine with `after` using AND.
    /// ARCHIVED jobs are omitted unless explicitly asked for. `last`
    /// truncates after filtering and sorting.
    pub async fn get_job_list(
        &self,
        phases: &[ExecutionPhase],
        after: Option<DateTime<Utc>>,
        last: Option<usize>,
    ) -> AppResult<Jobs> {
        let mut all_jobs = self.store.list_jobs(None).await?;
        all_jobs.sort_by(|a, b| b.creation_time.cmp(&a.creation_time));

        let mut jobref = Vec::new();

        for job in all_jobs {
            if let Some(after) = after {
                if job.creation_time < after {
                    continue;
                }
            }
            if !phases.is_empty() {
                if !phases.contains(&job.phase) {
                    continue;
                }
            } else if job.phase == ExecutionPhase::Archived {
                // ARCHIVED jobs are only listed when asked for by phase
                continue;
            }

            let href = Some(format!("/uws/{}", job.job_id));
            jobref.push(job.short_description(href));
        }

        if let Some(last) = last {
            jobref.truncate(last);
        }

        Ok(Jobs {
            jobref,
            version: UwsVersion::V1_1,
        })
    }

    /// Delete a job and cancel any execution in flight for it.
    pub async fn delete_job(&self, job_id: &str) -> AppResult<()> {
        // 404 for unknown jobs before the idempotent store delete
        self.get_job(job_id).await?;

        self.store.delete_job(job_id).await?;
        self.worker.cancel(job_id).await?;

        tracing::info!(job_id = %job_id, "Job deleted");
        Ok(())
    }

    /// Apply a RUN or ABORT action to a job.
    pub async fn apply_phase_action(
        &self,
        job_id: &str,
        action: PhaseAction,
    ) -> AppResult<JobSummary> {
        let mut job = self.get_job(job_id).await?;

        if job.phase.is_terminal() {
            return Err(AppError::BadRequest(format!(
                "Cannot apply {:?} to job in {} phase",
                action, job.phase
            )));
        }

        match action {
            PhaseAction::Run => {
                if !matches!(
                    job.phase,
                    ExecutionPhase::Pending | ExecutionPhase::Queued | ExecutionPhase::Held
                ) {
                    return Err(AppError::BadRequest(format!(
                        "Cannot start job in {} phase",
                        job.phase
                    )));
                }

                job.phase = ExecutionPhase::Executing;
                job.start_time = Some(Utc::now());
                self.store.save_job(job.clone()).await?;
                self.worker.run(&job).await?;

                tracing::info!(job_id = %job_id, "Job started");
            }
            PhaseAction::Abort => {
                self.worker.cancel(job_id).await?;

                job.phase = ExecutionPhase::Aborted;
                job.end_time = Some(Utc::now());
                self.store.save_job(job.clone()).await?;

                tracing::info!(job_id = %job_id, "Job aborted");
            }
        }

        self.get_job(job_id).await
    }

    /// Apply a combined update (`PHASE`, `DESTRUCTION`, `ACTION`) to a job.
    pub async fn update_job(
        &self,
        job_id: &str,
        request: UpdateJobRequest,
    ) -> AppResult<UpdateOutcome> {
        self.get_job(job_id).await?;

        if let Some(UpdateAction::Delete) = request.action {
            // Deleting leaves nothing else to update
            self.delete_job(job_id).await?;
            return Ok(UpdateOutcome::Deleted);
        }

        if let Some(destruction) = request.destruction {
            self.set_destruction(job_id, destruction).await?;
        }

        if let Some(action) = request.phase {
            self.apply_phase_action(job_id, action).await?;
        }

        Ok(UpdateOutcome::Updated)
    }

    /// Set the destruction time of a job. Must be in the future; the store
    /// clamps it to the maximum expiry window.
    pub async fn set_destruction(
        &self,
        job_id: &str,
        destruction: DateTime<Utc>,
    ) -> AppResult<()> {
        if destruction < Utc::now() {
            return Err(AppError::Validation(
                "Destruction time must be in the future".to_string(),
            ));
        }

        let mut job = self.get_job(job_id).await?;
        job.destruction_time = Some(destruction);
        self.store.save_job(job).await
    }

    /// Set the execution duration of a job, in seconds. 0 means unlimited.
    pub async fn set_execution_duration(&self, job_id: &str, seconds: u64) -> AppResult<()> {
        let mut job = self.get_job(job_id).await?;
        job.execution_duration = seconds;
        self.store.save_job(job).await
    }

    /// Replace the parameters of a job.
    pub async fn set_parameters(&self, job_id: &str, parameters: Parameters) -> AppResult<()> {
        let mut job = self.get_job(job_id).await?;
        job.parameters = parameters;
        self.store.save_job(job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::worker::NoopWorker;

    fn service() -> UwsService {
        let config = AppConfig {
            max_wait_time: 2,
            ..AppConfig::default()
        };
        UwsService::new(
            Arc::new(MemoryStore::new(config.default_expiry, config.max_expiry)),
            Arc::new(NoopWorker),
            &config,
        )
    }

    fn query_params() -> Vec<Parameter> {
        vec![
            Parameter {
                id: "QUERY".to_string(),
                by_reference: false,
                value: Some("SELECT * FROM TAP_SCHEMA.tables".to_string()),
            },
            Parameter {
                id: "LANG".to_string(),
                by_reference: false,
                value: Some("ADQL".to_string()),
            },
        ]
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let service = service();
        let job = service
            .create_job(query_params(), Some("anonuser".to_string()), None)
            .await
            .unwrap();

        let fetched = service.get_job(&job.job_id).await.unwrap();
        assert_eq!(fetched.phase, ExecutionPhase::Pending);
        assert_eq!(fetched.parameters.parameter.len(), 2);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let service = service();
        let err = service.get_job("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_run_action_moves_to_executing() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        let updated = service
            .apply_phase_action(&job.job_id, PhaseAction::Run)
            .await
            .unwrap();

        assert_eq!(updated.phase, ExecutionPhase::Executing);
        assert!(updated.start_time.is_some());
    }

    #[tokio::test]
    async fn test_run_action_rejected_while_executing() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        service
            .apply_phase_action(&job.job_id, PhaseAction::Run)
            .await
            .unwrap();
        let err = service
            .apply_phase_action(&job.job_id, PhaseAction::Run)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_abort_from_executing() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        service
            .apply_phase_action(&job.job_id, PhaseAction::Run)
            .await
            .unwrap();
        let aborted = service
            .apply_phase_action(&job.job_id, PhaseAction::Abort)
            .await
            .unwrap();

        assert_eq!(aborted.phase, ExecutionPhase::Aborted);
        assert!(aborted.end_time.is_some());
    }

    #[tokio::test]
    async fn test_action_rejected_in_terminal_phase() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        service
            .apply_phase_action(&job.job_id, PhaseAction::Abort)
            .await
            .unwrap();
        let err = service
            .apply_phase_action(&job.job_id, PhaseAction::Run)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_destruction_must_be_future() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        let err = service
            .set_destruction(&job.job_id, Utc::now() - chrono::Duration::minutes(5))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_job_delete_action() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        let outcome = service
            .update_job(
                &job.job_id,
                UpdateJobRequest {
                    action: Some(UpdateAction::Delete),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Deleted);
        assert!(service.get_job(&job.job_id).await.is_err());
    }

    #[tokio::test]
    async fn test_job_list_sorted_newest_first() {
        let service = service();
        for _ in 0..5 {
            service.create_job(query_params(), None, None).await.unwrap();
        }

        let jobs = service.get_job_list(&[], None, None).await.unwrap();
        assert_eq!(jobs.jobref.len(), 5);

        let times: Vec<_> = jobs.jobref.iter().map(|j| j.creation_time).collect();
        let mut sorted = times.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(times, sorted);
    }

    #[tokio::test]
    async fn test_job_list_phase_filter() {
        let service = service();
        let pending = service.create_job(query_params(), None, None).await.unwrap();
        let running = service.create_job(query_params(), None, None).await.unwrap();
        service
            .apply_phase_action(&running.job_id, PhaseAction::Run)
            .await
            .unwrap();

        let jobs = service
            .get_job_list(&[ExecutionPhase::Executing], None, None)
            .await
            .unwrap();
        assert_eq!(jobs.jobref.len(), 1);
        assert_eq!(jobs.jobref[0].job_id, running.job_id);

        let jobs = service
            .get_job_list(
                &[ExecutionPhase::Pending, ExecutionPhase::Executing],
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(jobs.jobref.len(), 2);
        let ids: Vec<_> = jobs.jobref.iter().map(|j| j.job_id.clone()).collect();
        assert!(ids.contains(&pending.job_id));
    }

    #[tokio::test]
    async fn test_job_list_last_applied_after_phase() {
        let service = service();

        // Three running jobs around one pending job. LAST must truncate
        // after the phase filter, so the pending job cannot mask a match.
        let running1 = service.create_job(query_params(), None, None).await.unwrap();
        let running2 = service.create_job(query_params(), None, None).await.unwrap();
        let _pending = service.create_job(query_params(), None, None).await.unwrap();
        let running3 = service.create_job(query_params(), None, None).await.unwrap();

        for id in [&running1.job_id, &running2.job_id, &running3.job_id] {
            service.apply_phase_action(id, PhaseAction::Run).await.unwrap();
        }

        let jobs = service
            .get_job_list(&[ExecutionPhase::Executing], None, Some(2))
            .await
            .unwrap();

        let ids: Vec<_> = jobs.jobref.iter().map(|j| j.job_id.clone()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&running2.job_id));
        assert!(ids.contains(&running3.job_id));
    }

    #[tokio::test]
    async fn test_job_list_archived_hidden_by_default() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        let mut archived = service.get_job(&job.job_id).await.unwrap();
        archived.phase = ExecutionPhase::Archived;
        service.store.save_job(archived).await.unwrap();

        let jobs = service.get_job_list(&[], None, None).await.unwrap();
        assert!(jobs.jobref.is_empty());

        let jobs = service
            .get_job_list(&[ExecutionPhase::Archived], None, None)
            .await
            .unwrap();
        assert_eq!(jobs.jobref.len(), 1);
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_for_settled_job() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();
        service
            .apply_phase_action(&job.job_id, PhaseAction::Abort)
            .await
            .unwrap();

        let start = Instant::now();
        let summary = service
            .get_job_summary(&job.job_id, None, Some(5))
            .await
            .unwrap();

        assert_eq!(summary.phase, ExecutionPhase::Aborted);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_wait_observes_phase_change() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        let waiter = service.clone();
        let job_id = job.job_id.clone();
        let handle =
            tokio::spawn(
                async move { waiter.get_job_summary(&job_id, None, Some(5)).await },
            );

        sleep(Duration::from_millis(200)).await;
        service
            .apply_phase_action(&job.job_id, PhaseAction::Run)
            .await
            .unwrap();

        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.phase, ExecutionPhase::Executing);
    }

    #[tokio::test]
    async fn test_wait_capped_by_max_wait() {
        let service = service(); // max_wait_time = 2

        let job = service.create_job(query_params(), None, None).await.unwrap();

        let start = Instant::now();
        let summary = service
            .get_job_summary(&job.job_id, None, Some(-1))
            .await
            .unwrap();

        assert_eq!(summary.phase, ExecutionPhase::Pending);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(4));
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl crate::store::JobStore for FailingStore {
        async fn get_job(&self, _job_id: &str) -> AppResult<Option<JobSummary>> {
            Err(AppError::Store("store unavailable".to_string()))
        }

        async fn list_jobs(&self, _owner_id: Option<&str>) -> AppResult<Vec<JobSummary>> {
            Err(AppError::Store("store unavailable".to_string()))
        }

        async fn add_job(
            &self,
            _parameters: Parameters,
            _owner_id: Option<String>,
            _run_id: Option<String>,
        ) -> AppResult<JobSummary> {
            Err(AppError::Store("store unavailable".to_string()))
        }

        async fn save_job(&self, _job: JobSummary) -> AppResult<()> {
            Err(AppError::Store("store unavailable".to_string()))
        }

        async fn delete_job(&self, _job_id: &str) -> AppResult<()> {
            Err(AppError::Store("store unavailable".to_string()))
        }
    }

    struct FailingWorker;

    #[async_trait::async_trait]
    impl JobWorker for FailingWorker {
        async fn run(&self, _job: &JobSummary) -> AppResult<()> {
            Err(AppError::Worker("dispatch failed".to_string()))
        }

        async fn cancel(&self, _job_id: &str) -> AppResult<()> {
            Err(AppError::Worker("dispatch failed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let config = AppConfig::default();
        let service = UwsService::new(Arc::new(FailingStore), Arc::new(NoopWorker), &config);

        let err = service.get_job("any").await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));

        let err = service.get_job_list(&[], None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[tokio::test]
    async fn test_worker_failure_propagates() {
        let config = AppConfig::default();
        let service = UwsService::new(
            Arc::new(MemoryStore::new(config.default_expiry, config.max_expiry)),
            Arc::new(FailingWorker),
            &config,
        );

        let job = service.create_job(query_params(), None, None).await.unwrap();
        let err = service
            .apply_phase_action(&job.job_id, PhaseAction::Run)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Worker(_)));
    }

    #[tokio::test]
    async fn test_wait_phase_mismatch_returns_immediately() {
        let service = service();
        let job = service.create_job(query_params(), None, None).await.unwrap();

        // waiting on EXECUTING while the job is PENDING: the transition the
        // client cares about already happened (or never will), return now
        let start = Instant::now();
        let summary = service
            .get_job_summary(&job.job_id, Some(ExecutionPhase::Executing), Some(5))
            .await
            .unwrap();

        assert_eq!(summary.phase, ExecutionPhase::Pending);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

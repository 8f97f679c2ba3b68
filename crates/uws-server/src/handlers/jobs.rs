//! UWS job endpoints.
//!
//! Implements the job list, job creation, and the per-job sub-resources
//! (`phase`, `destruction`, `executionduration`, `error`, `quote`, `owner`,
//! `parameters`, `results`). Mutating POSTs answer with a 303 redirect to
//! the affected resource, per the UWS interaction pattern.

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::requests::{
    CreateJobRequest, UpdateJobDestructionRequest, UpdateJobExecutionDurationRequest,
    UpdateJobPhaseRequest, UpdateJobRequest,
};
use crate::models::{ErrorSummary, ExecutionPhase, JobSummary, Jobs, Parameters, Results};
use crate::service::UpdateOutcome;
use crate::state::AppState;

/// Parsed query string of the job list endpoint.
///
/// `PHASE` may repeat, which plain `Query` deserialization cannot express,
/// so the raw query string is parsed by hand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobListQuery {
    pub phase: Vec<ExecutionPhase>,
    pub after: Option<DateTime<Utc>>,
    pub last: Option<usize>,
}

impl JobListQuery {
    /// Parse the raw query string of a job list request.
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        let mut query = JobListQuery::default();

        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(query),
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "PHASE" => {
                    let phase = serde_json::from_value(serde_json::Value::String(
                        value.to_string(),
                    ))
                    .map_err(|_| {
                        AppError::BadRequest(format!("Unknown execution phase: {}", value))
                    })?;
                    query.phase.push(phase);
                }
                "AFTER" => {
                    let after = DateTime::parse_from_rfc3339(&value).map_err(|_| {
                        AppError::BadRequest(format!("Invalid AFTER timestamp: {}", value))
                    })?;
                    query.after = Some(after.with_timezone(&Utc));
                }
                "LAST" => {
                    let last: usize = value.parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid LAST value: {}", value))
                    })?;
                    if last < 1 {
                        return Err(AppError::BadRequest(
                            "LAST must be at least 1".to_string(),
                        ));
                    }
                    query.last = Some(last);
                }
                _ => {}
            }
        }

        Ok(query)
    }
}

/// Query parameters of the job summary endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSummaryQuery {
    /// Phase to poll for a change away from.
    #[serde(rename = "PHASE")]
    pub phase: Option<ExecutionPhase>,

    /// Maximum seconds to block; -1 means the server maximum.
    #[serde(rename = "WAIT")]
    pub wait: Option<i64>,
}

/// List jobs.
///
/// `GET /uws`
pub async fn get_job_list(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<Jobs>> {
    let query = JobListQuery::parse(raw.as_deref())?;
    let jobs = state
        .service
        .get_job_list(&query.phase, query.after, query.last)
        .await?;
    Ok(Json(jobs))
}

/// Submit a job.
///
/// `POST /uws`
///
/// Answers 303 with a `Location` pointing at the new job; the created
/// summary rides along in the body for clients that do not follow it.
pub async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> AppResult<impl IntoResponse> {
    let job = state
        .service
        .create_job(request.parameter, request.owner_id, request.run_id)
        .await?;

    let location = format!("/uws/{}", job.job_id);
    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location)],
        Json(job),
    ))
}

/// Get the job summary, optionally blocking for a phase change.
///
/// `GET /uws/{job_id}`
pub async fn get_job_summary(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<JobSummaryQuery>,
) -> AppResult<Json<JobSummary>> {
    if matches!(query.wait, Some(wait) if wait < -1) {
        return Err(AppError::BadRequest(
            "WAIT must be -1 or a non-negative number of seconds".to_string(),
        ));
    }

    let summary = state
        .service
        .get_job_summary(&job_id, query.phase, query.wait)
        .await?;
    Ok(Json(summary))
}

/// Update job values (`PHASE`, `DESTRUCTION`, `ACTION`).
///
/// `POST /uws/{job_id}`
pub async fn update_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJobRequest>,
) -> AppResult<Redirect> {
    match state.service.update_job(&job_id, request).await? {
        UpdateOutcome::Deleted => Ok(Redirect::to("/uws")),
        UpdateOutcome::Updated => Ok(Redirect::to(&format!("/uws/{}", job_id))),
    }
}

/// Delete the job.
///
/// `DELETE /uws/{job_id}`
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Redirect> {
    state.service.delete_job(&job_id).await?;
    Ok(Redirect::to("/uws"))
}

/// Get the job phase as plain text.
///
/// `GET /uws/{job_id}/phase`
pub async fn get_phase(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<String> {
    let job = state.service.get_job(&job_id).await?;
    Ok(job.phase.to_string())
}

/// Apply a phase action (`RUN` / `ABORT`).
///
/// `POST /uws/{job_id}/phase`
pub async fn update_phase(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJobPhaseRequest>,
) -> AppResult<Redirect> {
    state
        .service
        .apply_phase_action(&job_id, request.phase)
        .await?;
    Ok(Redirect::to(&format!("/uws/{}", job_id)))
}

/// Get the job destruction time as plain text (RFC 3339).
///
/// `GET /uws/{job_id}/destruction`
pub async fn get_destruction(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<String> {
    let job = state.service.get_job(&job_id).await?;
    Ok(job
        .destruction_time
        .map(|t| t.to_rfc3339())
        .unwrap_or_default())
}

/// Update the job destruction time.
///
/// `POST /uws/{job_id}/destruction`
pub async fn update_destruction(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJobDestructionRequest>,
) -> AppResult<Redirect> {
    state
        .service
        .set_destruction(&job_id, request.destruction)
        .await?;
    Ok(Redirect::to(&format!("/uws/{}", job_id)))
}

/// Get the job execution duration in seconds as plain text.
///
/// `GET /uws/{job_id}/executionduration`
pub async fn get_execution_duration(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<String> {
    let job = state.service.get_job(&job_id).await?;
    Ok(job.execution_duration.to_string())
}

/// Update the job execution duration.
///
/// `POST /uws/{job_id}/executionduration`
pub async fn update_execution_duration(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJobExecutionDurationRequest>,
) -> AppResult<Redirect> {
    state
        .service
        .set_execution_duration(&job_id, request.execution_duration)
        .await?;
    Ok(Redirect::to(&format!("/uws/{}", job_id)))
}

/// Get the job error summary.
///
/// `GET /uws/{job_id}/error`
pub async fn get_error_summary(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<Option<ErrorSummary>>> {
    let job = state.service.get_job(&job_id).await?;
    Ok(Json(job.error_summary))
}

/// Get the job quote as plain text (RFC 3339), empty when unset.
///
/// `GET /uws/{job_id}/quote`
pub async fn get_quote(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<String> {
    let job = state.service.get_job(&job_id).await?;
    Ok(job.quote.map(|t| t.to_rfc3339()).unwrap_or_default())
}

/// Get the job owner as plain text.
///
/// `GET /uws/{job_id}/owner`
pub async fn get_owner(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<String> {
    let job = state.service.get_job(&job_id).await?;
    Ok(job.owner_id.unwrap_or_default())
}

/// Get the job parameters.
///
/// `GET /uws/{job_id}/parameters`
pub async fn get_parameters(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<Parameters>> {
    let job = state.service.get_job(&job_id).await?;
    Ok(Json(job.parameters))
}

/// Replace the job parameters.
///
/// `POST /uws/{job_id}/parameters`
pub async fn update_parameters(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(parameters): Json<Parameters>,
) -> AppResult<Redirect> {
    state.service.set_parameters(&job_id, parameters).await?;
    Ok(Redirect::to(&format!("/uws/{}", job_id)))
}

/// Get the job results.
///
/// `GET /uws/{job_id}/results`
pub async fn get_results(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<Results>> {
    let job = state.service.get_job(&job_id).await?;
    Ok(Json(job.results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_query() {
        let query = JobListQuery::parse(None).unwrap();
        assert!(query.phase.is_empty());
        assert!(query.after.is_none());
        assert!(query.last.is_none());
    }

    #[test]
    fn test_parse_repeated_phase() {
        let query = JobListQuery::parse(Some("PHASE=EXECUTING&PHASE=COMPLETED")).unwrap();
        assert_eq!(
            query.phase,
            vec![ExecutionPhase::Executing, ExecutionPhase::Completed]
        );
    }

    #[test]
    fn test_parse_after_and_last() {
        let query =
            JobListQuery::parse(Some("AFTER=2026-08-28T12%3A00%3A00%2B00%3A00&LAST=5")).unwrap();
        assert_eq!(query.last, Some(5));
        assert_eq!(
            query.after.unwrap(),
            "2026-08-28T12:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_unknown_phase() {
        let err = JobListQuery::parse(Some("PHASE=SLEEPING")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_parse_rejects_zero_last() {
        let err = JobListQuery::parse(Some("LAST=0")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let query = JobListQuery::parse(Some("VERBOSE=1&LAST=3")).unwrap();
        assert_eq!(query.last, Some(3));
    }
}

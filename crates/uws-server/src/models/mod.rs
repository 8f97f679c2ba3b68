//! UWS data model.
//!
//! Wire field names follow the UWS JSON rendering used by the original
//! service: aliased fields are camelCase (`jobId`, `creationTime`, ...),
//! everything else keeps its plain name.

pub mod requests;
pub mod types;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use types::{ErrorType, ExecutionPhase, PhaseAction, UwsVersion};

/// A single parameter of a UWS job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Identifier of the parameter.
    pub id: String,

    /// Whether the value is a URL to dereference for the actual value.
    #[serde(default)]
    pub by_reference: bool,

    /// The parameter value.
    #[serde(default)]
    pub value: Option<String>,
}

/// The parameters of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// The list of parameters.
    #[serde(default)]
    pub parameter: Vec<Parameter>,
}

/// A reference to a single job result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultReference {
    /// Identifier of the result.
    pub id: String,

    /// URL where the result can be retrieved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// MIME type of the result.
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Size of the result in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The results of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
    /// The list of result references.
    #[serde(default)]
    pub result: Vec<ResultReference>,
}

/// A short summary of a job error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Whether a detailed error document is available.
    #[serde(default, rename = "hasDetail")]
    pub has_detail: bool,

    /// Human-readable message describing the error.
    #[serde(default)]
    pub message: Option<String>,

    /// Characterization of the error.
    #[serde(rename = "type")]
    pub error_type: ErrorType,
}

/// A short description of a job, as returned in the job list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortJobDescription {
    /// The instant at which the job was created.
    #[serde(rename = "creationTime")]
    pub creation_time: DateTime<Utc>,

    /// URL of the job resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Identifier of the job.
    #[serde(rename = "jobId")]
    pub job_id: String,

    /// Owner (creator) of the job.
    #[serde(default, rename = "ownerId")]
    pub owner_id: Option<String>,

    /// Current execution phase.
    pub phase: ExecutionPhase,

    /// Client-supplied identifier for the job.
    #[serde(default, rename = "runId")]
    pub run_id: Option<String>,
}

/// The complete representation of the state of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    /// Identifier of the job, assigned by the service.
    #[serde(rename = "jobId")]
    pub job_id: String,

    /// Client-supplied identifier for the job.
    #[serde(default, rename = "runId")]
    pub run_id: Option<String>,

    /// Owner (creator) of the job.
    #[serde(default, rename = "ownerId")]
    pub owner_id: Option<String>,

    /// Current execution phase.
    pub phase: ExecutionPhase,

    /// When the job is likely to complete.
    #[serde(default)]
    pub quote: Option<DateTime<Utc>>,

    /// The instant at which the job was created.
    #[serde(rename = "creationTime")]
    pub creation_time: DateTime<Utc>,

    /// The instant at which the job started executing.
    #[serde(default, rename = "startTime")]
    pub start_time: Option<DateTime<Utc>>,

    /// The instant at which the job finished.
    #[serde(default, rename = "endTime")]
    pub end_time: Option<DateTime<Utc>>,

    /// Seconds the job is allowed to run. 0 means unlimited.
    #[serde(default, rename = "executionDuration")]
    pub execution_duration: u64,

    /// The instant at which the job, its records, and results are destroyed.
    #[serde(default, rename = "destructionTime")]
    pub destruction_time: Option<DateTime<Utc>>,

    /// The parameters of the job.
    pub parameters: Parameters,

    /// The results of the job.
    #[serde(default)]
    pub results: Results,

    /// Summary of any error that occurred.
    #[serde(default, rename = "errorSummary")]
    pub error_summary: Option<ErrorSummary>,

    /// Additional service-specific information.
    #[serde(default, rename = "jobInfo", skip_serializing_if = "Option::is_none")]
    pub job_info: Option<Vec<String>>,

    /// Version of the UWS standard the job complies with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<UwsVersion>,
}

impl JobSummary {
    /// Short description for the job list rendering.
    pub fn short_description(&self, href: Option<String>) -> ShortJobDescription {
        ShortJobDescription {
            creation_time: self.creation_time,
            href,
            job_id: self.job_id.clone(),
            owner_id: self.owner_id.clone(),
            phase: self.phase,
            run_id: self.run_id.clone(),
        }
    }
}

/// The list of job references returned at `/uws`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jobs {
    /// The list of job references.
    pub jobref: Vec<ShortJobDescription>,

    /// Version of the UWS standard the list complies with.
    pub version: UwsVersion,
}

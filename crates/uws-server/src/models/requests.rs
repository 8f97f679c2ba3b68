//! Request bodies for the UWS POST endpoints.
//!
//! UWS request fields are upper case on the wire (`PHASE`, `DESTRUCTION`,
//! `ACTION`, ...), matching the form-parameter names of the standard.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Parameter, PhaseAction};

/// Body of the request to create a new job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateJobRequest {
    /// Service-specific parameters for the job.
    #[serde(default)]
    pub parameter: Vec<Parameter>,

    /// Owner (creator) of the job.
    #[serde(default, rename = "ownerId")]
    pub owner_id: Option<String>,

    /// Client-supplied identifier for the job.
    #[serde(default, rename = "runId")]
    pub run_id: Option<String>,
}

/// The only supported `ACTION` value on a job update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum UpdateAction {
    #[serde(rename = "DELETE")]
    Delete,
}

/// Body of the request to update a job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobRequest {
    #[serde(default, rename = "PHASE")]
    pub phase: Option<PhaseAction>,

    #[serde(default, rename = "DESTRUCTION")]
    pub destruction: Option<DateTime<Utc>>,

    #[serde(default, rename = "ACTION")]
    pub action: Option<UpdateAction>,
}

/// Body of the request to update the phase of a job.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobPhaseRequest {
    #[serde(rename = "PHASE")]
    pub phase: PhaseAction,
}

/// Body of the request to update the destruction time of a job.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobDestructionRequest {
    #[serde(rename = "DESTRUCTION")]
    pub destruction: DateTime<Utc>,
}

/// Body of the request to update the execution duration of a job.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobExecutionDurationRequest {
    #[serde(rename = "EXECUTIONDURATION", deserialize_with = "seconds")]
    pub execution_duration: u64,
}

/// Accept the duration both as a JSON number and as a decimal string,
/// as clients translating UWS form parameters tend to send either.
fn seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(D::Error::custom),
    }
}

//! Enumerated types of the UWS data model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution phase of a UWS job.
///
/// Phases are rendered in upper case on the wire (`PENDING`, `EXECUTING`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionPhase {
    /// Accepted but not yet sent for execution.
    Pending,
    /// Sent for execution, not yet running.
    Queued,
    /// Currently running.
    Executing,
    /// Finished with results available.
    Completed,
    /// Failed; an error summary is available.
    Error,
    /// Aborted by client or server.
    Aborted,
    /// State cannot be determined.
    Unknown,
    /// Held pending a RUN action.
    Held,
    /// Temporarily suspended by the service.
    Suspended,
    /// Destroyed records retained for reference.
    Archived,
}

impl ExecutionPhase {
    /// Whether the job is still in flight and can change phase on its own.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Queued | Self::Executing)
    }

    /// Whether the phase is final. Terminal jobs reject phase actions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Error | Self::Aborted | Self::Archived
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Queued => "QUEUED",
            Self::Executing => "EXECUTING",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
            Self::Aborted => "ABORTED",
            Self::Unknown => "UNKNOWN",
            Self::Held => "HELD",
            Self::Suspended => "SUSPENDED",
            Self::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action requested through the `PHASE` field of a job update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhaseAction {
    Run,
    Abort,
}

/// Characterization of a job error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    /// The job may succeed if resubmitted.
    Transient,
    /// The job cannot succeed.
    Fatal,
}

/// Version of the UWS standard a document complies with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UwsVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
}

impl fmt::Display for UwsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1_0 => f.write_str("1.0"),
            Self::V1_1 => f.write_str("1.1"),
        }
    }
}

//! Job-specific error types.

use thiserror::Error;

use super::JobStatus;
use crate::domain::foundation::{DomainError, ErrorCode, JobId, ValidationError};

/// Errors returned by job triggers and the job state machine.
#[derive(Debug, Clone, Error)]
pub enum JobError {
    /// Job was not found.
    #[error("Job not found: {0}")]
    NotFound(JobId),

    /// The requested transition is not in the lifecycle table.
    #[error("Cannot move job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// The job's status changed between read and write.
    #[error("Job {0} changed status concurrently")]
    Conflict(JobId),

    /// A pipeline run for this job is already in flight.
    #[error("Job {0} already has a pipeline run in flight")]
    Busy(JobId),

    /// No AI provider is configured, so no pipeline can make progress.
    #[error("No AI provider available")]
    NoProviderAvailable,

    /// Input failed validation.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Persistence or deploy collaborator failure.
    #[error("Error: {0}")]
    Infrastructure(String),
}

impl JobError {
    pub fn invalid_transition(from: JobStatus, to: JobStatus) -> Self {
        JobError::InvalidTransition { from, to }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        JobError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            JobError::NotFound(_) => ErrorCode::JobNotFound,
            JobError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            JobError::Conflict(_) => ErrorCode::StatusConflict,
            JobError::Busy(_) => ErrorCode::JobBusy,
            JobError::NoProviderAvailable => ErrorCode::NoProviderAvailable,
            JobError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            JobError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for JobError {
    fn from(err: DomainError) -> Self {
        JobError::Infrastructure(err.to_string())
    }
}

impl From<ValidationError> for JobError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { field } => JobError::ValidationFailed {
                field,
                message: "cannot be empty".to_string(),
            },
            ValidationError::InvalidFormat { field, reason } => JobError::ValidationFailed {
                field,
                message: reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = JobError::invalid_transition(JobStatus::Deployed, JobStatus::Processing);
        assert_eq!(err.to_string(), "Cannot move job from DEPLOYED to PROCESSING");
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn domain_error_maps_to_infrastructure() {
        let err: JobError = DomainError::new(ErrorCode::DatabaseError, "disk full").into();
        assert!(matches!(err, JobError::Infrastructure(msg) if msg.contains("disk full")));
    }

    #[test]
    fn empty_field_maps_to_validation_failure() {
        let err: JobError = ValidationError::empty_field("source_content").into();
        assert!(matches!(err, JobError::ValidationFailed { ref field, .. } if field == "source_content"));
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }
}

//! JobStatus enum and the job lifecycle transition table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a factory job.
///
/// `Processing` is the status every job is created in. `Deployed` and
/// `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[default]
    Processing,
    ReadyForReview,
    QaFailed,
    Deploying,
    Deployed,
    DeployFailed,
    Rejected,
    Escalated,
}

impl JobStatus {
    /// Every status, in declaration order.
    pub const ALL: [JobStatus; 8] = [
        JobStatus::Processing,
        JobStatus::ReadyForReview,
        JobStatus::QaFailed,
        JobStatus::Deploying,
        JobStatus::Deployed,
        JobStatus::DeployFailed,
        JobStatus::Rejected,
        JobStatus::Escalated,
    ];

    /// Statuses a pipeline run may be (re)started from.
    pub fn accepts_retry(&self) -> bool {
        matches!(self, JobStatus::QaFailed | JobStatus::DeployFailed)
    }

    /// Statuses a human may request a revision from.
    pub fn accepts_revision(&self) -> bool {
        matches!(self, JobStatus::ReadyForReview | JobStatus::QaFailed)
    }

    /// Statuses an explicit cancellation applies to.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, JobStatus::Processing | JobStatus::Deploying)
    }

    /// Stable uppercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "PROCESSING",
            JobStatus::ReadyForReview => "READY_FOR_REVIEW",
            JobStatus::QaFailed => "QA_FAILED",
            JobStatus::Deploying => "DEPLOYING",
            JobStatus::Deployed => "DEPLOYED",
            JobStatus::DeployFailed => "DEPLOY_FAILED",
            JobStatus::Rejected => "REJECTED",
            JobStatus::Escalated => "ESCALATED",
        }
    }
}

impl StateMachine for JobStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Legal transitions:
    /// - Processing -> ReadyForReview | QaFailed (pipeline outcome or cancellation)
    /// - ReadyForReview -> Deploying | Rejected | Processing | Escalated
    /// - QaFailed -> Processing | Rejected | Escalated
    /// - Deploying -> Deployed | ReadyForReview | DeployFailed | QaFailed
    /// - DeployFailed -> Processing | Rejected
    /// - Escalated -> Rejected
    fn valid_transitions(&self) -> Vec<Self> {
        use JobStatus::*;
        match self {
            Processing => vec![ReadyForReview, QaFailed],
            ReadyForReview => vec![Deploying, Rejected, Processing, Escalated],
            QaFailed => vec![Processing, Rejected, Escalated],
            Deploying => vec![Deployed, ReadyForReview, DeployFailed, QaFailed],
            DeployFailed => vec![Processing, Rejected],
            Escalated => vec![Rejected],
            Deployed | Rejected => vec![],
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

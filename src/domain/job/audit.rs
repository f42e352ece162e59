//! Audit trail entries for job status transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::JobStatus;
use crate::domain::foundation::{AuditEntryId, JobId, Timestamp};

/// Kind of actor that caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// The factory itself (pipeline completion, cancellation routing).
    System,
    /// A human reviewer or operator.
    Human,
    /// An automated subsystem acting on the job (deployer, scheduler).
    Automated,
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActorType::System => "system",
            ActorType::Human => "human",
            ActorType::Automated => "automated",
        };
        write!(f, "{}", s)
    }
}

/// Who performed an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub kind: ActorType,
    pub name: String,
}

impl Actor {
    pub fn system() -> Self {
        Self {
            kind: ActorType::System,
            name: "factory-pipeline".to_string(),
        }
    }

    pub fn human(name: impl Into<String>) -> Self {
        Self {
            kind: ActorType::Human,
            name: name.into(),
        }
    }

    pub fn automated(name: impl Into<String>) -> Self {
        Self {
            kind: ActorType::Automated,
            name: name.into(),
        }
    }
}

/// Immutable record of one status transition.
///
/// `from_status` is `None` only for the entry written when a job is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub job_id: JobId,
    pub from_status: Option<JobStatus>,
    pub to_status: JobStatus,
    pub actor: Actor,
    pub reason: Option<String>,
    pub recorded_at: Timestamp,
}

impl AuditEntry {
    pub fn transition(
        job_id: JobId,
        from_status: JobStatus,
        to_status: JobStatus,
        actor: Actor,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            job_id,
            from_status: Some(from_status),
            to_status,
            actor,
            reason,
            recorded_at: Timestamp::now(),
        }
    }

    pub fn creation(job_id: JobId, status: JobStatus, actor: Actor) -> Self {
        Self {
            id: AuditEntryId::new(),
            job_id,
            from_status: None,
            to_status: status,
            actor,
            reason: Some("job submitted".to_string()),
            recorded_at: Timestamp::now(),
        }
    }
}

//! Audit log port.
//!
//! Append-only record of job status transitions. Writes are best-effort from
//! the caller's point of view: a failed append is logged, never retried, and
//! never rolls back the transition it describes.

use crate::domain::foundation::{DomainError, JobId};
use crate::domain::job::AuditEntry;
use async_trait::async_trait;

#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one immutable entry.
    async fn append(&self, entry: AuditEntry) -> Result<(), DomainError>;

    /// All entries for a job, oldest first.
    async fn entries_for(&self, job_id: &JobId) -> Result<Vec<AuditEntry>, DomainError>;
}

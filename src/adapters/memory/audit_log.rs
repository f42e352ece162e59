//! In-Memory Audit Log

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, JobId};
use crate::domain::job::AuditEntry;
use crate::ports::AuditLog;

/// Append-only in-memory audit trail.
///
/// `failing()` builds a log whose appends always fail, for exercising the
/// best-effort audit path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
    fail_appends: Arc<AtomicBool>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let log = Self::default();
        log.set_failing(true);
        log
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_appends.store(failing, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn all(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), DomainError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "audit store unavailable",
            ));
        }
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn entries_for(&self, job_id: &JobId) -> Result<Vec<AuditEntry>, DomainError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.job_id == *job_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::{Actor, JobStatus};

    #[tokio::test]
    async fn entries_are_filtered_by_job_in_order() {
        let log = InMemoryAuditLog::new();
        let job_a = JobId::new();
        let job_b = JobId::new();

        log.append(AuditEntry::creation(job_a, JobStatus::Processing, Actor::system()))
            .await
            .unwrap();
        log.append(AuditEntry::creation(job_b, JobStatus::Processing, Actor::system()))
            .await
            .unwrap();
        log.append(AuditEntry::transition(
            job_a,
            JobStatus::Processing,
            JobStatus::QaFailed,
            Actor::system(),
            None,
        ))
        .await
        .unwrap();

        let entries = log.entries_for(&job_a).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].to_status, JobStatus::QaFailed);
        assert_eq!(log.len().await, 3);
    }

    #[tokio::test]
    async fn failing_log_rejects_appends() {
        let log = InMemoryAuditLog::failing();

        let result = log
            .append(AuditEntry::creation(JobId::new(), JobStatus::Processing, Actor::system()))
            .await;

        assert!(result.is_err());
        assert!(log.is_empty().await);

        log.set_failing(false);
        log.append(AuditEntry::creation(JobId::new(), JobStatus::Processing, Actor::system()))
            .await
            .unwrap();
        assert_eq!(log.len().await, 1);
    }
}

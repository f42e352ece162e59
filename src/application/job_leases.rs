//! Per-job leases marking "pipeline in flight".
//!
//! A trigger acquires the lease before its first transition and moves it
//! into the spawned pipeline task; the lease is released when the task drops
//! it. A second trigger for the same job meanwhile gets `JobError::Busy`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::foundation::JobId;
use crate::domain::job::JobError;

type Held = Arc<Mutex<HashSet<JobId>>>;

fn guard(held: &Mutex<HashSet<JobId>>) -> MutexGuard<'_, HashSet<JobId>> {
    held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registry of held leases, shared by every trigger handler.
#[derive(Debug, Clone, Default)]
pub struct JobLeases {
    held: Held,
}

impl JobLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lease for `job_id`, or fails with `Busy` if it is held.
    pub fn acquire(&self, job_id: JobId) -> Result<JobLease, JobError> {
        if !guard(&self.held).insert(job_id) {
            tracing::warn!(job_id = %job_id, "Pipeline already in flight");
            return Err(JobError::Busy(job_id));
        }
        Ok(JobLease {
            job_id,
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_held(&self, job_id: &JobId) -> bool {
        guard(&self.held).contains(job_id)
    }
}

/// Held lease; released on drop.
#[derive(Debug)]
pub struct JobLease {
    job_id: JobId,
    held: Held,
}

impl JobLease {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }
}

impl Drop for JobLease {
    fn drop(&mut self) {
        guard(&self.held).remove(&self.job_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_busy_until_release() {
        let leases = JobLeases::new();
        let id = JobId::new();

        let lease = leases.acquire(id).unwrap();
        assert!(leases.is_held(&id));
        assert!(matches!(leases.acquire(id), Err(JobError::Busy(busy)) if busy == id));

        drop(lease);
        assert!(!leases.is_held(&id));
        assert!(leases.acquire(id).is_ok());
    }

    #[test]
    fn leases_are_per_job() {
        let leases = JobLeases::new();
        let _a = leases.acquire(JobId::new()).unwrap();
        assert!(leases.acquire(JobId::new()).is_ok());
    }

    #[tokio::test]
    async fn lease_moved_into_task_is_released_when_task_ends() {
        let leases = JobLeases::new();
        let id = JobId::new();
        let lease = leases.acquire(id).unwrap();

        tokio::spawn(async move {
            let _lease = lease;
        })
        .await
        .unwrap();

        assert!(!leases.is_held(&id));
    }
}

//! Job repository port.
//!
//! The core treats persistence as a record store keyed by job id. Artifacts
//! are large text blobs stored beside the job record, one per kind.
//!
//! # Design
//!
//! - **Compare-and-set**: `update_job` honors `JobPatch::expected_status`, so
//!   a status write based on a stale read fails instead of overwriting.
//! - **Latest wins**: saving an artifact replaces any previous one of the
//!   same kind.

use crate::domain::foundation::{DomainError, JobId};
use crate::domain::job::{ArtifactKind, Job, JobPatch, NewJob};
use async_trait::async_trait;

/// Repository port for the Job record and its artifacts.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Find a job by id. Returns `None` if not found.
    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, DomainError>;

    /// Create a job from submission fields.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure or duplicate id
    async fn create_job(&self, job: NewJob) -> Result<Job, DomainError>;

    /// Apply a partial update and return the updated job.
    ///
    /// # Errors
    ///
    /// - `JobNotFound` if the job doesn't exist
    /// - `StatusConflict` if `expected_status` is set and does not match
    /// - `DatabaseError` on persistence failure
    async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<Job, DomainError>;

    /// Store an artifact, replacing any previous one of the same kind.
    async fn save_artifact(
        &self,
        id: &JobId,
        kind: ArtifactKind,
        content: String,
    ) -> Result<(), DomainError>;

    /// Load the current artifact of a kind. Returns `None` if absent.
    async fn get_artifact(&self, id: &JobId, kind: ArtifactKind)
        -> Result<Option<String>, DomainError>;
}

//! Job module - the lifecycle record of one submission.
//!
//! - `JobStatus` - lifecycle states and the legal transition table
//! - `Job` / `NewJob` / `JobPatch` - the record and how it is created and updated
//! - `AuditEntry` - immutable transition history
//! - `QaReport` - pass/fail summary of a pipeline run

mod aggregate;
mod audit;
mod errors;
mod qa_report;
mod slug;
mod status;

pub use aggregate::{ArtifactKind, Job, JobPatch, NewJob, MAX_TITLE_LENGTH};
pub use audit::{Actor, ActorType, AuditEntry};
pub use errors::JobError;
pub use qa_report::{QaFinding, QaReport, ERROR_PENALTY, WARNING_PENALTY};
pub use slug::{slugify, MAX_SLUG_LENGTH};
pub use status::JobStatus;

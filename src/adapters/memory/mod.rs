//! In-memory adapters for the persistence, audit and deploy ports.

mod audit_log;
mod deployer;
mod job_repository;

pub use audit_log::InMemoryAuditLog;
pub use deployer::InMemoryDeployer;
pub use job_repository::InMemoryJobRepository;

//! Job record and the partial-update patch applied by persistence.
//!
//! A job is never physically deleted: rejection is a terminal status.
//! Generated artifacts live outside the record (see [`ArtifactKind`]).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{slugify, JobStatus, QaReport};
use crate::domain::foundation::{JobId, Timestamp, ValidationError};

/// Maximum characters of a job title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Kinds of large artifacts stored beside a job. One of each at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Generated interactive tool markup.
    Html,
    /// Extraction result (CourseAnalysis JSON).
    Extraction,
    /// Tool design JSON.
    Design,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Html => "html",
            ArtifactKind::Extraction => "extraction",
            ArtifactKind::Design => "design",
        };
        write!(f, "{}", s)
    }
}

/// One submission's end-to-end lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub slug: String,
    pub title: String,
    pub status: JobStatus,
    pub source_content: String,
    pub qa_report: Option<QaReport>,
    /// Pipeline passes so far; the first run counts as one.
    pub revision_count: u32,
    /// Notes from the most recent revision request.
    pub revision_notes: Option<String>,
    pub last_error: Option<String>,
    pub deployment_location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Materializes a new record from creation fields.
    pub fn from_new(new: NewJob) -> Self {
        let now = Timestamp::now();
        Self {
            id: new.id,
            slug: new.slug,
            title: new.title,
            status: new.status,
            source_content: new.source_content,
            qa_report: None,
            revision_count: new.revision_count,
            revision_notes: None,
            last_error: None,
            deployment_location: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields for creating a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub id: JobId,
    pub slug: String,
    pub title: String,
    pub status: JobStatus,
    pub source_content: String,
    pub revision_count: u32,
}

impl NewJob {
    /// Builds creation fields for a submission.
    ///
    /// The title defaults to the first non-blank line of the content.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the source content is blank
    pub fn submission(
        source_content: impl Into<String>,
        title: Option<String>,
    ) -> Result<Self, ValidationError> {
        let source_content = source_content.into();
        if source_content.trim().is_empty() {
            return Err(ValidationError::empty_field("source_content"));
        }

        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| derive_title(&source_content));
        let title: String = title.trim().chars().take(MAX_TITLE_LENGTH).collect();

        let id = JobId::new();
        let base = slugify(&title);
        let slug = if base.is_empty() {
            format!("job-{}", id.short())
        } else {
            format!("{}-{}", base, id.short())
        };

        Ok(Self {
            id,
            slug,
            title,
            status: JobStatus::Processing,
            source_content,
            revision_count: 1,
        })
    }
}

fn derive_title(content: &str) -> String {
    content
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
        .unwrap_or("untitled")
        .to_string()
}

/// Partial update of a job record.
///
/// `expected_status` turns the update into a compare-and-set: persistence
/// must reject the whole patch if the stored status differs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub expected_status: Option<JobStatus>,
    pub status: Option<JobStatus>,
    pub qa_report: Option<QaReport>,
    pub revision_count: Option<u32>,
    pub revision_notes: Option<Option<String>>,
    pub last_error: Option<Option<String>>,
    pub deployment_location: Option<String>,
}

impl JobPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expecting(mut self, status: JobStatus) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn qa_report(mut self, report: QaReport) -> Self {
        self.qa_report = Some(report);
        self
    }

    pub fn revision_count(mut self, count: u32) -> Self {
        self.revision_count = Some(count);
        self
    }

    pub fn revision_notes(mut self, notes: Option<String>) -> Self {
        self.revision_notes = Some(notes);
        self
    }

    pub fn last_error(mut self, error: Option<String>) -> Self {
        self.last_error = Some(error);
        self
    }

    pub fn deployment_location(mut self, location: impl Into<String>) -> Self {
        self.deployment_location = Some(location.into());
        self
    }

    /// Applies every set field to the job and bumps `updated_at`.
    ///
    /// Does not check `expected_status`; that is the store's job.
    pub fn apply_to(self, job: &mut Job) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(report) = self.qa_report {
            job.qa_report = Some(report);
        }
        if let Some(count) = self.revision_count {
            job.revision_count = count;
        }
        if let Some(notes) = self.revision_notes {
            job.revision_notes = notes;
        }
        if let Some(error) = self.last_error {
            job.last_error = error;
        }
        if let Some(location) = self.deployment_location {
            job.deployment_location = Some(location);
        }
        job.updated_at = Timestamp::now();
    }
}

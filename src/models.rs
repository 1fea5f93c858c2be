//! Data models shared by the fetchers, the pipelines and the job manager.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceKind`]: Which of the three external sources a pipeline talks to
//! - [`PipelineOutcome`]: What one fetch-and-clean pipeline produced
//! - [`JobStatus`] and [`JobView`]: The polling surface of a job
//! - [`JobResult`]: The aggregated document attached to a succeeded job
//! - [`JobRecord`]: The archived JSON form of a succeeded job

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque job identifier handed out by [`crate::jobs::JobManager::submit`].
pub type JobId = Uuid;

/// One of the three external sources a job pulls text from.
///
/// The declaration order is the fixed aggregation order: encyclopedia text
/// always comes first, then news, then web search. `Ord` is derived so
/// ordered maps keyed by `SourceKind` iterate in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Encyclopedia,
    NewsSearch,
    WebSearch,
}

impl SourceKind {
    /// All sources in aggregation order.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Encyclopedia,
        SourceKind::NewsSearch,
        SourceKind::WebSearch,
    ];

    /// Display name of the upstream service.
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Encyclopedia => "Wikipedia",
            SourceKind::NewsSearch => "GNews",
            SourceKind::WebSearch => "SerpAPI",
        }
    }

    /// 1-based position in the fixed pipeline numbering.
    pub fn position(self) -> usize {
        match self {
            SourceKind::Encyclopedia => 1,
            SourceKind::NewsSearch => 2,
            SourceKind::WebSearch => 3,
        }
    }

    /// Progress label shown while this source is the next one outstanding.
    pub fn stage_label(self) -> String {
        let what = match self {
            SourceKind::Encyclopedia => "Wikipedia",
            SourceKind::NewsSearch => "GNews",
            SourceKind::WebSearch => "web search",
        };
        format!(
            "{}/{} - Fetching & cleaning {}...",
            self.position(),
            SourceKind::ALL.len(),
            what
        )
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a single per-source pipeline produced.
///
/// Failures never escape a pipeline; they show up here as
/// `contributed == false` with empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub kind: SourceKind,
    pub cleaned_text: String,
    pub contributed: bool,
}

impl PipelineOutcome {
    /// A pipeline that produced nothing usable.
    pub fn empty(kind: SourceKind) -> Self {
        Self {
            kind,
            cleaned_text: String::new(),
            contributed: false,
        }
    }

    /// Wrap cleaned text; an empty string counts as no contribution.
    pub fn from_cleaned(kind: SourceKind, cleaned_text: String) -> Self {
        let contributed = !cleaned_text.is_empty();
        Self {
            kind,
            cleaned_text,
            contributed,
        }
    }
}

/// Externally visible job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// The aggregated document attached to a succeeded job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    /// Cleaned text of every contributing source, blank-line separated.
    pub combined_text: String,
    /// Contributing sources, always in [`SourceKind::ALL`] order.
    pub contributing_sources: Vec<SourceKind>,
    /// Number of characters (Unicode scalar values) in `combined_text`.
    pub character_count: usize,
    pub timestamp_utc: DateTime<Utc>,
}

/// Snapshot of a job returned to pollers.
///
/// `result` is only present for [`JobStatus::Succeeded`] and `error` only for
/// [`JobStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobView {
    pub job_id: JobId,
    pub topic: String,
    pub status: JobStatus,
    pub progress_label: String,
    pub sources_completed: Vec<SourceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Archived form of a succeeded job, written as `{job_id}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub topic: String,
    pub timestamp_utc: DateTime<Utc>,
    pub sources_used: Vec<SourceKind>,
    pub character_count: usize,
    pub content: String,
}

impl JobRecord {
    pub fn new(job_id: JobId, topic: &str, result: &JobResult) -> Self {
        Self {
            job_id,
            topic: topic.to_string(),
            timestamp_utc: result.timestamp_utc,
            sources_used: result.contributing_sources.clone(),
            character_count: result.character_count,
            content: result.combined_text.clone(),
        }
    }
}

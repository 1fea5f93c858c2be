//! JSON archive of succeeded jobs.
//!
//! Each succeeded job is written to `{archive_dir}/{job_id}.json` as a
//! pretty-printed [`JobRecord`]. Archiving is a side effect only; job status
//! never depends on it.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::JobRecord;

/// Path of the archive file for a record.
pub fn record_path(record: &JobRecord, archive_dir: &Path) -> PathBuf {
    archive_dir.join(format!("{}.json", record.job_id))
}

/// Write a [`JobRecord`] into `archive_dir`, creating the directory if needed.
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(job_id = %record.job_id, archive_dir = %archive_dir.display()))]
pub async fn write_job_record(record: &JobRecord, archive_dir: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(record)?;

    if let Err(e) = fs::create_dir_all(archive_dir).await {
        error!(error = %e, "Failed to create archive dir");
        return Err(e.into());
    }

    let path = record_path(record, archive_dir);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote job archive");

    Ok(path)
}

//! In-memory job store.
//!
//! A sharded map from id to a per-job mutex: inserting or reading one job
//! never waits on another job's lock. Guards are never held across `.await`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use super::state::Job;
use crate::models::{JobId, JobStatus, JobView};

pub type JobHandle = Arc<Mutex<Job>>;

#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<JobId, JobHandle>,
}

/// Lock a job, recovering the data if a previous holder panicked.
pub fn lock(handle: &JobHandle) -> MutexGuard<'_, Job> {
    handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) -> JobHandle {
        let id = job.id;
        let handle = Arc::new(Mutex::new(job));
        self.jobs.insert(id, Arc::clone(&handle));
        handle
    }

    pub fn handle(&self, id: &JobId) -> Option<JobHandle> {
        self.jobs.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn view(&self, id: &JobId) -> Option<JobView> {
        // Clone the handle first so the shard lock is released before the job lock is taken.
        let handle = self.handle(id)?;
        let view = lock(&handle).view();
        Some(view)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn count_with_status(&self, status: JobStatus) -> usize {
        let handles: Vec<JobHandle> = self.jobs.iter().map(|e| Arc::clone(e.value())).collect();
        handles
            .iter()
            .filter(|handle| lock(handle).status() == status)
            .count()
    }

    /// Drop terminal jobs that finished at least `retention` ago.
    pub fn evict_finished(&self, retention: Duration) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, handle| {
            let job = lock(handle);
            !job.is_terminal()
                || job
                    .finished_at
                    .map(|t| t.elapsed() < retention)
                    .unwrap_or(true)
        });
        let evicted = before.saturating_sub(self.jobs.len());
        if evicted > 0 {
            debug!(evicted, "Evicted finished jobs");
        }
        evicted
    }
}

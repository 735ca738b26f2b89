use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::resume::ResumeRecord;

/// The most recent successful rewrite, kept for re-download.
#[derive(Debug, Clone, Serialize)]
pub struct LatestResume {
    pub attempt: u64,
    pub request_id: Uuid,
    pub file_name: String,
    pub generated_at: DateTime<Utc>,
    pub record: ResumeRecord,
}

/// Single-slot store shared through `AppState`.
///
/// Attempts are numbered when they start; a result only replaces the slot if its attempt
/// is newer than the stored one, so overlapping requests settle on the latest submission.
#[derive(Clone, Default)]
pub struct LatestResumeStore {
    next_attempt: Arc<AtomicU64>,
    slot: Arc<RwLock<Option<LatestResume>>>,
}

impl LatestResumeStore {
    pub fn begin_attempt(&self) -> u64 {
        self.next_attempt.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns false when a newer attempt already occupies the slot.
    pub async fn store(&self, entry: LatestResume) -> bool {
        let mut slot = self.slot.write().await;
        if slot.as_ref().is_some_and(|current| current.attempt > entry.attempt) {
            return false;
        }
        *slot = Some(entry);
        true
    }

    pub async fn get(&self) -> Option<LatestResume> {
        self.slot.read().await.clone()
    }
}

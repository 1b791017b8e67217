//! In-memory record cache used by watch-mode re-renders.

use jiralog_api::WorklogRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How long a fetched record list stays valid before watch mode refetches.
pub const DEFAULT_TTL_SECS: u64 = 300;

struct CacheEntry {
    stored_at: Instant,
    records: Vec<WorklogRecord>,
}

/// Thread-safe time-bounded store of extraction results, keyed by the query
/// that produced them. Entries expire after the configured TTL; invalidation
/// drops an entry immediately.
#[derive(Clone)]
pub struct RecordStore {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl RecordStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached records for `key` when still fresh. Stale entries
    /// are dropped on access.
    pub fn get(&self, key: &str) -> Option<Vec<WorklogRecord>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.records.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, records: Vec<WorklogRecord>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.into(),
            CacheEntry {
                stored_at: Instant::now(),
                records,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

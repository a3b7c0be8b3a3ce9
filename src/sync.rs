//! Fire-and-forget delivery of reading records to the log store.
//!
//! Local state is authoritative. A write that fails or times out is logged and
//! counted, never retried.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::error::{Result, TrackerError};
use crate::store::{LogRecord, LogStore};
use crate::util::format_day;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum SyncEvent {
    #[serde(rename_all = "camelCase")]
    Synced { book: String, date: String },
    #[serde(rename_all = "camelCase")]
    Failed { book: String, message: String },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub pending: usize,
    pub synced: u64,
    pub failed: u64,
    pub last_error: Option<String>,
}

struct Counters {
    pending: AtomicUsize,
    synced: AtomicU64,
    failed: AtomicU64,
    last_error: Mutex<Option<String>>,
}

/// Decrements the pending count however the write task ends, abort included.
struct PendingGuard(Arc<Counters>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct SyncQueue<S> {
    store: Arc<S>,
    timeout: Duration,
    counters: Arc<Counters>,
}

impl<S> Clone for SyncQueue<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
            counters: self.counters.clone(),
        }
    }
}

impl<S: LogStore> SyncQueue<S> {
    pub fn new(store: S, timeout: Duration) -> Self {
        Self {
            store: Arc::new(store),
            timeout,
            counters: Arc::new(Counters {
                pending: AtomicUsize::new(0),
                synced: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                last_error: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Startup load, bounded by the same timeout as writes.
    pub async fn load_all(&self) -> Result<Vec<LogRecord>> {
        tokio::time::timeout(self.timeout, self.store.list_all())
            .await
            .map_err(|_| TrackerError::Timeout(self.timeout))?
    }

    /// Spawns the append and returns immediately. The handle resolves to the
    /// outcome; dropping it leaves the write running.
    pub fn submit(&self, record: LogRecord) -> JoinHandle<SyncEvent> {
        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        let guard = PendingGuard(self.counters.clone());
        let store = self.store.clone();
        let counters = self.counters.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let _guard = guard;
            let result = tokio::time::timeout(timeout, store.append(&record))
                .await
                .unwrap_or(Err(TrackerError::Timeout(timeout)));

            match result {
                Ok(()) => {
                    counters.synced.fetch_add(1, Ordering::SeqCst);
                    SyncEvent::Synced {
                        book: record.book,
                        date: format_day(record.date),
                    }
                }
                Err(e) => {
                    log::warn!(
                        "Failed to sync {:?} on {}: {e}",
                        record.book,
                        format_day(record.date)
                    );
                    counters.failed.fetch_add(1, Ordering::SeqCst);
                    if let Ok(mut last) = counters.last_error.lock() {
                        *last = Some(e.to_string());
                    }
                    SyncEvent::Failed {
                        book: record.book,
                        message: e.to_string(),
                    }
                }
            }
        })
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            pending: self.counters.pending.load(Ordering::SeqCst),
            synced: self.counters.synced.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            last_error: self
                .counters
                .last_error
                .lock()
                .ok()
                .and_then(|e| e.clone()),
        }
    }
}

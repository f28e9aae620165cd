//! In-memory cache map with periodic flushes to the append-only log.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::key::{CacheKey, CacheValue};
use super::log::CacheLog;
use crate::Result;

/// Default interval between automatic flushes.
pub const DEFAULT_SAVE_EVERY: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backing file. `None` keeps the cache in memory only.
    pub path: Option<PathBuf>,
    pub save_every: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            save_every: DEFAULT_SAVE_EVERY,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
    pub fn with_save_every(mut self, interval: Duration) -> Self {
        self.save_every = interval;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    /// Physical writes to the backing file.
    pub flushes: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    flushes: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        }
    }
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

struct StoreState {
    entries: HashMap<CacheKey, CacheValue>,
    // Records set since the last flush, in set order.
    pending: Vec<(CacheKey, CacheValue)>,
    last_flush: Instant,
    log: Option<CacheLog>,
}

/// Request cache: a fully materialized map plus an append-only log on disk.
///
/// Every entry on disk is also in memory. Entries set since the last flush live only in
/// memory until `save_every` has elapsed at the time of a `set`, until [`flush`] is called,
/// or until the store is dropped.
///
/// All access goes through one mutex, so the store can be shared between tasks. The lock is
/// held only for map operations and log appends, never across an `.await`.
///
/// [`flush`]: CacheStore::flush
pub struct CacheStore {
    state: Mutex<StoreState>,
    save_every: Duration,
    stats: AtomicStats,
}

impl CacheStore {
    /// Open a store, replaying the backing log if it exists.
    pub fn open(config: CacheConfig) -> Result<Self> {
        let mut entries = HashMap::new();
        let log = match config.path {
            Some(path) => {
                let mut log = CacheLog::new(path);
                let records = log.replay()?;
                let replayed = records.len();
                entries.extend(records);
                info!(
                    path = %log.path().display(),
                    records = replayed,
                    entries = entries.len(),
                    "loaded request cache"
                );
                Some(log)
            }
            None => None,
        };
        Ok(Self {
            state: Mutex::new(StoreState {
                entries,
                pending: Vec::new(),
                last_flush: Instant::now(),
                log,
            }),
            save_every: config.save_every,
            stats: AtomicStats::new(),
        })
    }

    /// A store without a backing file.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(StoreState {
                entries: HashMap::new(),
                pending: Vec::new(),
                last_flush: Instant::now(),
                log: None,
            }),
            save_every: DEFAULT_SAVE_EVERY,
            stats: AtomicStats::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let found = self.lock().entries.get(key).cloned();
        let counter = if found.is_some() {
            &self.stats.hits
        } else {
            &self.stats.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Insert or overwrite an entry and hand the value back.
    ///
    /// Flushes before returning when the save interval has elapsed. A failed interval flush
    /// is logged and retried at the next interval; the entry stays in memory and pending.
    pub fn set(&self, key: CacheKey, value: CacheValue) -> CacheValue {
        let mut st = self.lock();
        st.entries.insert(key.clone(), value.clone());
        st.pending.push((key, value.clone()));
        self.stats.sets.fetch_add(1, Ordering::Relaxed);
        if st.last_flush.elapsed() >= self.save_every {
            if let Err(e) = self.flush_locked(&mut st) {
                st.last_flush = Instant::now();
                warn!(
                    path = ?st.log.as_ref().map(|l| l.path().to_path_buf()),
                    pending = st.pending.len(),
                    error = %e,
                    "cache flush failed, keeping entries pending"
                );
            }
        }
        value
    }

    /// Write everything set since the last flush to the backing file.
    ///
    /// On error nothing is dropped: the pending entries are written by the next flush.
    pub fn flush(&self) -> Result<()> {
        let mut st = self.lock();
        self.flush_locked(&mut st)
    }

    fn flush_locked(&self, st: &mut StoreState) -> Result<()> {
        if let Some(log) = st.log.as_mut() {
            if !st.pending.is_empty() {
                log.append(&st.pending)?;
                self.stats.flushes.fetch_add(1, Ordering::Relaxed);
                info!(
                    path = %log.path().display(),
                    records = st.pending.len(),
                    "flushed request cache"
                );
            }
        }
        st.pending.clear();
        st.last_flush = Instant::now();
        Ok(())
    }

    /// Whether there are entries not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        let st = self.lock();
        st.log.is_some() && !st.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.lock().log.as_ref().map(|l| l.path().to_path_buf())
    }

    pub fn save_every(&self) -> Duration {
        self.save_every
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }
}

impl Drop for CacheStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(path = ?self.path(), error = %e, "final cache flush failed");
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("path", &self.path())
            .field("entries", &self.len())
            .field("save_every", &self.save_every)
            .finish()
    }
}

//! Buffer pool - the bounded page cache between operators and heap files.
//!
//! The [`BufferPool`] provides:
//! - Page caching between disk and memory, at most `capacity` pages
//! - Pluggable eviction policies (default: LRU)
//! - Dirty-page write-back on eviction and explicit flush
//! - Row insert/delete routing with dirty attribution per transaction

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::buffer::replacer::{LruReplacer, Replacer};
use crate::buffer::stats::CacheStats;
use crate::catalog::Catalog;
use crate::common::{Error, PageId, Permissions, Result, TransactionId};
use crate::concurrency::{LockTable, PageLockTable};
use crate::storage::HeapPage;
use crate::tuple::Tuple;

/// A shared handle to a cached page. While a page is resident this is the
/// only live instance for its [`PageId`]; every caller mutates the same
/// copy.
pub type PageHandle = Arc<RwLock<HeapPage>>;

/// Bounded, process-wide cache of decoded pages.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │                       BufferPool                         │
/// │  ┌─────────────────────────┐  ┌───────────────────────┐  │
/// │  │ page_table              │  │ replacer              │  │
/// │  │ PageId → live HeapPage  │  │ victim selection      │  │
/// │  └─────────────────────────┘  └───────────────────────┘  │
/// │  ┌─────────────────────────┐  ┌───────────────────────┐  │
/// │  │ catalog                 │  │ lock_table            │  │
/// │  │ table id → heap file    │  │ page lock bookkeeping │  │
/// │  └─────────────────────────┘  └───────────────────────┘  │
/// └──────────────────────────────────────────────────────────┘
/// ```
///
/// Callers never read or write heap files directly: misses load through
/// the catalog's files, and dirty pages are written back when evicted or
/// explicitly flushed.
///
/// # Thread safety
/// All methods take `&self`; internal state is behind `parking_lot` locks
/// and atomics. Lock order is `page_table` before `replacer`. Operator
/// trees must still be externally serialized until a blocking
/// [`LockTable`] exists (the shipped one only does bookkeeping).
pub struct BufferPool {
    /// Maximum number of resident pages.
    capacity: usize,

    /// Resolves a page's owning heap file on a miss.
    catalog: Arc<Catalog>,

    /// The resident pages.
    page_table: RwLock<HashMap<PageId, PageHandle>>,

    /// Eviction policy for selecting victim pages.
    replacer: Mutex<Box<dyn Replacer>>,

    /// Page-lock bookkeeping, consulted on every fetch.
    lock_table: Arc<dyn LockTable>,

    /// Performance statistics.
    stats: CacheStats,
}

impl BufferPool {
    /// Create a buffer pool with the default LRU policy and bookkeeping
    /// lock table.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize, catalog: Arc<Catalog>) -> Self {
        Self::with_policy(
            capacity,
            catalog,
            Box::new(LruReplacer::new()),
            Arc::new(PageLockTable::new()),
        )
    }

    /// Create a buffer pool with an explicit eviction policy and lock
    /// table.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_policy(
        capacity: usize,
        catalog: Arc<Catalog>,
        replacer: Box<dyn Replacer>,
        lock_table: Arc<dyn LockTable>,
    ) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            capacity,
            catalog,
            page_table: RwLock::new(HashMap::new()),
            replacer: Mutex::new(replacer),
            lock_table,
            stats: CacheStats::new(),
        }
    }

    // ========================================================================
    // Public API: fetch pages
    // ========================================================================

    /// Retrieve a page with the given permissions, loading it from its
    /// heap file on a miss. A hit makes the page the most recently used;
    /// a miss against a full cache evicts exactly one victim first,
    /// writing it back if dirty.
    pub fn get_page(
        &self,
        tx: TransactionId,
        pid: PageId,
        perm: Permissions,
    ) -> Result<PageHandle> {
        self.lock_table.acquire(tx, pid, perm)?;

        // Fast path: page already resident.
        {
            let table = self.page_table.read();
            if let Some(page) = table.get(&pid) {
                self.replacer.lock().record_access(pid);
                self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(page));
            }
        }

        self.load_page(pid)
    }

    /// Handle a cache miss: make room, read the page, insert it.
    fn load_page(&self, pid: PageId) -> Result<PageHandle> {
        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);

        let file = self.catalog.file(pid.table_id)?;

        let mut table = self.page_table.write();
        // Re-check under the write lock so a racing fetch cannot create a
        // second live instance of the same page.
        if let Some(page) = table.get(&pid) {
            self.replacer.lock().record_access(pid);
            return Ok(Arc::clone(page));
        }
        if table.len() >= self.capacity {
            self.evict_one(&mut table)?;
        }

        let page = file.read_page(pid)?;
        self.stats.pages_read.fetch_add(1, Ordering::Relaxed);

        let handle = Arc::new(RwLock::new(page));
        table.insert(pid, Arc::clone(&handle));
        self.replacer.lock().record_access(pid);

        Ok(handle)
    }

    /// Evict one victim chosen by the replacer, flushing it first if
    /// dirty. The caller holds the page-table write lock.
    fn evict_one(&self, table: &mut HashMap<PageId, PageHandle>) -> Result<()> {
        loop {
            let victim = self
                .replacer
                .lock()
                .evict()
                .ok_or(Error::IllegalState("cache is full but has no victim"))?;

            let Some(handle) = table.remove(&victim) else {
                // Stale replacer entry; pick again.
                continue;
            };

            let page = handle.read();
            if page.is_dirty() {
                let file = self.catalog.file(victim.table_id)?;
                file.write_page(&page)?;
                self.stats.pages_written.fetch_add(1, Ordering::Relaxed);
            }
            drop(page);

            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
    }

    // ========================================================================
    // Public API: row mutation
    // ========================================================================

    /// Add a row to the given table on behalf of `tx`.
    ///
    /// Resolves the owning heap file via the catalog, performs the
    /// structural insert (which may append a page), and marks the
    /// affected page dirty, attributed to `tx`. Fails with
    /// `SchemaMismatch` if the row does not match the table.
    pub fn insert_tuple(&self, tx: TransactionId, table_id: u32, tuple: Tuple) -> Result<()> {
        let file = self.catalog.file(table_id)?;
        if **tuple.schema() != **file.schema() {
            return Err(Error::SchemaMismatch(format!(
                "row shape {} does not match table shape {}",
                tuple.schema(),
                file.schema()
            )));
        }
        let page = file.insert_tuple(tx, tuple, self)?;
        page.write().mark_dirty(tx);
        Ok(())
    }

    /// Remove a row on behalf of `tx`, routed through the row's
    /// [`RecordId`](crate::common::RecordId) to its owning page, which is
    /// marked dirty.
    pub fn delete_tuple(&self, tx: TransactionId, tuple: &Tuple) -> Result<()> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        let file = self.catalog.file(rid.page_id.table_id)?;
        let page = file.delete_tuple(tx, tuple, self)?;
        page.write().mark_dirty(tx);
        Ok(())
    }

    // ========================================================================
    // Public API: flush and discard
    // ========================================================================

    /// Write one cached page back to its heap file and clear its dirty
    /// flag. No-op if the page is not resident or not dirty.
    pub fn flush_page(&self, pid: PageId) -> Result<()> {
        let handle = self.page_table.read().get(&pid).cloned();
        let Some(handle) = handle else {
            return Ok(());
        };

        let page = handle.read();
        if page.is_dirty() {
            let file = self.catalog.file(pid.table_id)?;
            file.write_page(&page)?;
            self.stats.pages_written.fetch_add(1, Ordering::Relaxed);
            drop(page);
            handle.write().clear_dirty();
        }
        Ok(())
    }

    /// Flush every resident page. Intended for checkpoint/shutdown;
    /// under a no-steal recovery policy this writes uncommitted data.
    pub fn flush_all_pages(&self) -> Result<()> {
        let pids: Vec<PageId> = self.page_table.read().keys().copied().collect();
        for pid in pids {
            self.flush_page(pid)?;
        }
        Ok(())
    }

    /// Flush only the pages last dirtied by `tx` (commit path).
    pub fn flush_pages(&self, tx: TransactionId) -> Result<()> {
        for pid in self.pages_dirtied_by(tx) {
            self.flush_page(pid)?;
        }
        Ok(())
    }

    /// Drop a cached page without flushing it, undoing uncommitted
    /// changes to it. No-op if the page is not resident.
    pub fn discard_page(&self, pid: PageId) {
        self.page_table.write().remove(&pid);
        self.replacer.lock().remove(pid);
    }

    /// Finish a transaction: on commit, flush the pages it dirtied; on
    /// abort, discard them so the next fetch rereads the on-disk state.
    /// Either way its page locks are released.
    pub fn transaction_complete(&self, tx: TransactionId, commit: bool) -> Result<()> {
        let dirtied = self.pages_dirtied_by(tx);
        for pid in dirtied {
            if commit {
                self.flush_page(pid)?;
            } else {
                self.discard_page(pid);
            }
        }
        self.lock_table.release_all(tx);
        Ok(())
    }

    fn pages_dirtied_by(&self, tx: TransactionId) -> Vec<PageId> {
        self.page_table
            .read()
            .iter()
            .filter(|(_, handle)| handle.read().dirtied_by() == Some(tx))
            .map(|(pid, _)| *pid)
            .collect()
    }

    // ========================================================================
    // Public API: stats and info
    // ========================================================================

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Maximum number of resident pages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pages currently resident.
    pub fn resident_count(&self) -> usize {
        self.page_table.read().len()
    }

    /// Whether a page is currently resident.
    pub fn is_resident(&self, pid: PageId) -> bool {
        self.page_table.read().contains_key(&pid)
    }

    /// The lock table this pool consults.
    pub fn lock_table(&self) -> &Arc<dyn LockTable> {
        &self.lock_table
    }
}

//! The database environment: catalog + buffer pool as one owned value.

use std::sync::Arc;

use crate::buffer::replacer::Replacer;
use crate::buffer::BufferPool;
use crate::catalog::Catalog;
use crate::common::config::DEFAULT_CACHE_PAGES;
use crate::concurrency::LockTable;

/// Explicitly constructed engine state.
///
/// There is no ambient global catalog or pool; callers build a `Database`,
/// share it via `Arc`, and pass it to scans, write operators, and table
/// statistics. Dropping the last reference drops the cache (without
/// flushing — call [`BufferPool::flush_all_pages`] first for a clean
/// shutdown).
pub struct Database {
    catalog: Arc<Catalog>,
    pool: Arc<BufferPool>,
}

impl Database {
    /// A database with the default cache capacity and policies.
    pub fn new() -> Self {
        Self::with_cache_pages(DEFAULT_CACHE_PAGES)
    }

    /// A database whose cache holds at most `cache_pages` pages.
    pub fn with_cache_pages(cache_pages: usize) -> Self {
        let catalog = Arc::new(Catalog::new());
        let pool = Arc::new(BufferPool::new(cache_pages, Arc::clone(&catalog)));
        Database { catalog, pool }
    }

    /// A database with an explicit eviction policy and lock table.
    pub fn with_policy(
        cache_pages: usize,
        replacer: Box<dyn Replacer>,
        lock_table: Arc<dyn LockTable>,
    ) -> Self {
        let catalog = Arc::new(Catalog::new());
        let pool = Arc::new(BufferPool::with_policy(
            cache_pages,
            Arc::clone(&catalog),
            replacer,
            lock_table,
        ));
        Database { catalog, pool }
    }

    /// The table catalog.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The buffer pool.
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

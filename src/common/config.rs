//! Configuration constants for heapdb.

/// Size of a page in bytes (4KB).
///
/// This value is chosen to match:
/// - OS page size on most systems (4096 bytes)
/// - Common database page sizes (PostgreSQL uses 8KB, but 4KB is also standard)
///
/// Every heap file is a sequence of `PAGE_SIZE`-byte blocks with no
/// file-level header; page `n` lives at byte offset `n * PAGE_SIZE`.
pub const PAGE_SIZE: usize = 4096;

/// Default number of pages a buffer pool caches.
pub const DEFAULT_CACHE_PAGES: usize = 50;

/// Default number of buckets in a selectivity histogram.
pub const NUM_HIST_BUCKETS: usize = 100;

/// Default cost charged per page of sequential I/O by the scan-cost model.
pub const DEFAULT_IO_COST_PER_PAGE: f64 = 1000.0;

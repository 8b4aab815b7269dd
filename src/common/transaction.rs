//! Transaction identifiers and page-access permissions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TX_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identifier for one transaction.
///
/// The core threads this value through every buffer-pool and operator call
/// so dirty pages can be attributed to their writer; it imposes no further
/// contract. Each call to [`TransactionId::new`] mints a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Mint a new, process-unique transaction id.
    pub fn new() -> Self {
        TransactionId(NEXT_TX_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx{}", self.0)
    }
}

/// Permission a transaction requests when fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissions {
    /// Shared read access.
    ReadOnly,
    /// Exclusive read-write access.
    ReadWrite,
}

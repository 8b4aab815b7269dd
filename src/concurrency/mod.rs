//! Page locking as a capability the buffer pool consumes.
//!
//! The storage core runs single-threaded (one active mutator), so no
//! blocking lock manager ships here. What does ship is the seam for one:
//! the [`LockTable`] trait the buffer pool calls on every page fetch, and
//! [`PageLockTable`], a bookkeeping implementation that records holders
//! and modes without ever blocking. A real lock manager — blocking
//! acquisition, deadlock detection, transaction-scoped queues — slots in
//! behind the same trait.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::common::{PageId, Permissions, Result, TransactionId};

/// Capability interface for page-granularity locking.
///
/// The buffer pool acquires through this on every `get_page` call with the
/// requested permission, and releases per transaction on completion.
pub trait LockTable: Send + Sync {
    /// Record (or, in a blocking implementation, wait for) a lock on
    /// `pid` for `tx` in the mode implied by `perm`.
    fn acquire(&self, tx: TransactionId, pid: PageId, perm: Permissions) -> Result<()>;

    /// Release `tx`'s lock on one page.
    fn release(&self, tx: TransactionId, pid: PageId);

    /// Release every lock held by `tx` (commit/abort path).
    fn release_all(&self, tx: TransactionId);

    /// Whether `tx` currently holds any lock on `pid`.
    fn holds_lock(&self, tx: TransactionId, pid: PageId) -> bool;
}

#[derive(Default)]
struct Holders {
    shared: HashSet<TransactionId>,
    exclusive: Option<TransactionId>,
}

impl Holders {
    fn is_empty(&self) -> bool {
        self.shared.is_empty() && self.exclusive.is_none()
    }
}

/// Non-blocking lock bookkeeping keyed by page.
///
/// Grants every request immediately: with a single active mutator there is
/// nothing to wait for, but the holder sets are maintained exactly as a
/// blocking manager would need them, so `holds_lock` and `release_all`
/// behave and tests can observe lock state. Read-write acquisition
/// upgrades a shared hold to exclusive.
#[derive(Default)]
pub struct PageLockTable {
    entries: Mutex<HashMap<PageId, Holders>>,
}

impl PageLockTable {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockTable for PageLockTable {
    fn acquire(&self, tx: TransactionId, pid: PageId, perm: Permissions) -> Result<()> {
        let mut entries = self.entries.lock();
        let holders = entries.entry(pid).or_default();
        match perm {
            Permissions::ReadOnly => {
                if holders.exclusive != Some(tx) {
                    holders.shared.insert(tx);
                }
            }
            Permissions::ReadWrite => {
                holders.shared.remove(&tx);
                holders.exclusive = Some(tx);
            }
        }
        Ok(())
    }

    fn release(&self, tx: TransactionId, pid: PageId) {
        let mut entries = self.entries.lock();
        if let Some(holders) = entries.get_mut(&pid) {
            holders.shared.remove(&tx);
            if holders.exclusive == Some(tx) {
                holders.exclusive = None;
            }
            if holders.is_empty() {
                entries.remove(&pid);
            }
        }
    }

    fn release_all(&self, tx: TransactionId) {
        let mut entries = self.entries.lock();
        entries.retain(|_, holders| {
            holders.shared.remove(&tx);
            if holders.exclusive == Some(tx) {
                holders.exclusive = None;
            }
            !holders.is_empty()
        });
    }

    fn holds_lock(&self, tx: TransactionId, pid: PageId) -> bool {
        let entries = self.entries.lock();
        entries
            .get(&pid)
            .is_some_and(|h| h.shared.contains(&tx) || h.exclusive == Some(tx))
    }
}

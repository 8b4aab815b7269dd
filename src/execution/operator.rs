//! The pull-based operator protocol.

use std::sync::Arc;

use crate::common::Result;
use crate::tuple::{Schema, Tuple};

/// A pull iterator over rows, composable into an execution tree.
///
/// The protocol:
/// - [`open`](Self::open) prepares the operator; opening an already open
///   operator is an `IllegalState` error.
/// - [`has_next`](Self::has_next) / [`next`](Self::next) drive iteration;
///   `next` without a pending row fails with `NoSuchElement`, and using an
///   unopened operator fails with `IllegalState`.
/// - [`rewind`](Self::rewind) re-runs from the start without requiring a
///   re-open.
/// - [`close`](Self::close) releases state; non-leaf operators own their
///   children exclusively and close them too.
/// - [`schema`](Self::schema) describes the rows the operator produces,
///   valid whether or not it is open.
///
/// Trees are built by child ownership: each non-leaf operator holds its
/// children as `Box<dyn OpIterator>`.
pub trait OpIterator {
    /// Prepare for iteration.
    fn open(&mut self) -> Result<()>;

    /// Whether another row is pending.
    fn has_next(&mut self) -> Result<bool>;

    /// Produce the next row.
    fn next(&mut self) -> Result<Tuple>;

    /// Restart iteration from the first row.
    fn rewind(&mut self) -> Result<()>;

    /// Stop iterating and release state. Idempotent.
    fn close(&mut self);

    /// Shape of the rows this operator produces.
    fn schema(&self) -> &Arc<Schema>;
}

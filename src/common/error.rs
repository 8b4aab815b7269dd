//! Error types for heapdb.

use crate::common::page_id::{PageId, RecordId};
use crate::execution::AggregateOp;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in heapdb.
///
/// A single error type keeps error handling consistent across the storage,
/// buffer, and execution layers. Storage-level failures propagate to the
/// operator that requested the mutation and from there to the caller; they
/// are never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from a page read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row's schema does not match the table it is being written to.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Insert targeted a page with no free slot.
    #[error("page {0} is full")]
    PageFull(PageId),

    /// Delete targeted a slot that is already free.
    #[error("slot {} of page {} is not occupied", .0.slot, .0.page_id)]
    SlotNotOccupied(RecordId),

    /// A field value was assigned to a column of a different type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An iterator was advanced past its end, or used before being opened.
    #[error("no such element: {0}")]
    NoSuchElement(&'static str),

    /// An operator was opened twice, or used after being closed.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    /// A non-COUNT aggregate was requested over a string column.
    #[error("unsupported aggregate {0} over a string column")]
    UnsupportedAggregate(AggregateOp),

    /// The catalog has no table registered under this id.
    #[error("no table with id {0}")]
    TableNotFound(u32),

    /// A delete was routed through a row that was never persisted.
    #[error("row has no storage location")]
    MissingRecordId,
}

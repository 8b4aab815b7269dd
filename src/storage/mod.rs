//! Disk storage: slotted heap pages and per-table heap files.
//!
//! # Components
//! - [`HeapPage`] - a decoded 4KB page: occupancy bitmap + fixed-size row slots
//! - [`HeapFile`] - a paged file of rows for one table, with page-level I/O
//! - [`HeapFileIterator`] - lazy page-then-slot walk over a whole file

mod heap_file;
mod heap_page;

pub use heap_file::{HeapFile, HeapFileIterator};
pub use heap_page::HeapPage;

//! heapdb - the storage and execution core of a single-node relational
//! database.
//!
//! # Architecture
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                           heapdb                              │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────────────────────────────────────┐   │
//! │  │            Execution Layer (execution/)                │   │
//! │  │   SeqScan · Filter · Aggregate · Insert · Delete       │   │
//! │  │        pull-based OpIterator trees                     │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! │             ↓ rows                        ↑ estimates         │
//! │  ┌────────────────────────┐  ┌─────────────────────────┐     │
//! │  │ Buffer Pool (buffer/)  │  │ Optimizer (optimizer/)  │     │
//! │  │  bounded page cache    │  │  histograms, TableStats │     │
//! │  │  [Runtime-Swappable]   │  └─────────────────────────┘     │
//! │  │  Eviction: LRU | FIFO  │                                  │
//! │  └────────────────────────┘                                  │
//! │             ↓ pages                                          │
//! │  ┌───────────────────────────────────────────────────────┐   │
//! │  │            Storage Layer (storage/)                    │   │
//! │  │     HeapFile + HeapPage (bitmap + row slots)           │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, RecordId, Error, config)
//! - [`tuple`] - Typed values, schemas, and rows
//! - [`storage`] - Heap pages and heap files
//! - [`buffer`] - The buffer pool and eviction policies
//! - [`concurrency`] - The page lock-table capability
//! - [`catalog`] / [`database`] - Table registry and the owned environment
//! - [`execution`] - The operator protocol and its operators
//! - [`optimizer`] - Selectivity histograms and table statistics
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use heapdb::common::TransactionId;
//! use heapdb::database::Database;
//! use heapdb::execution::{OpIterator, SeqScan};
//! use heapdb::storage::HeapFile;
//! use heapdb::tuple::{Column, Schema, Type};
//!
//! let db = Database::new();
//! let schema = Arc::new(Schema::new(vec![
//!     Column::named(Type::Int, "id"),
//!     Column::named(Type::Text(32), "name"),
//! ]));
//! let file = Arc::new(HeapFile::open("users.dat", 1, schema).unwrap());
//! db.catalog().add_table(file, "users");
//!
//! let mut scan = SeqScan::new(&db, TransactionId::new(), 1, "u").unwrap();
//! scan.open().unwrap();
//! while scan.has_next().unwrap() {
//!     println!("{}", scan.next().unwrap());
//! }
//! scan.close();
//! ```

// Core modules
pub mod buffer;
pub mod catalog;
pub mod common;
pub mod concurrency;
pub mod database;
pub mod execution;
pub mod optimizer;
pub mod storage;
pub mod tuple;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, PageId, Permissions, RecordId, Result, TransactionId};

pub use buffer::{BufferPool, CacheStats, StatsSnapshot};
pub use catalog::Catalog;
pub use database::Database;
pub use execution::{Aggregate, AggregateOp, Delete, Filter, Insert, OpIterator, Predicate, SeqScan};
pub use optimizer::{IntHistogram, StringHistogram, TableStats};
pub use storage::{HeapFile, HeapPage};
pub use tuple::{Column, Field, Op, Schema, Tuple, Type};

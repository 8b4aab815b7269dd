//! The table catalog: maps table ids to heap files, schemas, and names.
//!
//! The catalog is never ambient global state. A [`Catalog`] is explicitly
//! constructed, owned (via `Arc`) by a
//! [`Database`](crate::database::Database) environment value, and handed to
//! the buffer pool at construction so cache misses can resolve the owning
//! heap file.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Error, Result};
use crate::storage::HeapFile;
use crate::tuple::Schema;

struct TableEntry {
    file: Arc<HeapFile>,
    name: String,
}

/// Registry of the tables the storage core knows about.
#[derive(Default)]
pub struct Catalog {
    tables: RwLock<HashMap<u32, TableEntry>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Catalog {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Register a table under its file's table id. Re-registering an id
    /// replaces the previous entry.
    pub fn add_table(&self, file: Arc<HeapFile>, name: impl Into<String>) -> u32 {
        let table_id = file.table_id();
        self.tables.write().insert(
            table_id,
            TableEntry {
                file,
                name: name.into(),
            },
        );
        table_id
    }

    /// Heap file backing a table.
    pub fn file(&self, table_id: u32) -> Result<Arc<HeapFile>> {
        self.tables
            .read()
            .get(&table_id)
            .map(|e| Arc::clone(&e.file))
            .ok_or(Error::TableNotFound(table_id))
    }

    /// Schema of a table's rows.
    pub fn schema(&self, table_id: u32) -> Result<Arc<Schema>> {
        self.file(table_id).map(|f| Arc::clone(f.schema()))
    }

    /// Human-readable table name.
    pub fn table_name(&self, table_id: u32) -> Result<String> {
        self.tables
            .read()
            .get(&table_id)
            .map(|e| e.name.clone())
            .ok_or(Error::TableNotFound(table_id))
    }

    /// Ids of every registered table, in no particular order.
    pub fn table_ids(&self) -> Vec<u32> {
        self.tables.read().keys().copied().collect()
    }
}

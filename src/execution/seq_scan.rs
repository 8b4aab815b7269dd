//! Sequential scan: the leaf operator reading one table front to back.

use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::common::{Error, Result, TransactionId};
use crate::database::Database;
use crate::execution::operator::OpIterator;
use crate::storage::{HeapFile, HeapFileIterator};
use crate::tuple::{Schema, Tuple};

/// Reads every row of a table in page order, in no particular row order.
///
/// The scan's schema is the table schema with every field name prefixed
/// `alias.name`, so columns stay distinguishable when scans are composed.
pub struct SeqScan {
    pool: Arc<BufferPool>,
    file: Arc<HeapFile>,
    tx: TransactionId,
    table_name: String,
    alias: String,
    schema: Arc<Schema>,
    iter: Option<HeapFileIterator>,
}

impl SeqScan {
    /// Create a scan of `table_id` under the given alias.
    pub fn new(db: &Database, tx: TransactionId, table_id: u32, alias: &str) -> Result<Self> {
        let file = db.catalog().file(table_id)?;
        let table_name = db.catalog().table_name(table_id)?;
        let schema = Arc::new(file.schema().prefixed(alias));
        Ok(SeqScan {
            pool: Arc::clone(db.pool()),
            file,
            tx,
            table_name,
            alias: alias.to_string(),
            schema,
            iter: None,
        })
    }

    /// Actual name of the scanned table in the catalog.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Alias this scan was created with.
    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl OpIterator for SeqScan {
    fn open(&mut self) -> Result<()> {
        if self.iter.is_some() {
            return Err(Error::IllegalState("scan is already open"));
        }
        let mut iter = self.file.iter(self.tx, Arc::clone(&self.pool));
        iter.open()?;
        self.iter = Some(iter);
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        match self.iter.as_mut() {
            Some(iter) => iter.has_next(),
            None => Err(Error::IllegalState("scan is not open")),
        }
    }

    fn next(&mut self) -> Result<Tuple> {
        match self.iter.as_mut() {
            Some(iter) => iter.next(),
            None => Err(Error::NoSuchElement("scan is not open")),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        match self.iter.as_mut() {
            Some(iter) => iter.rewind(),
            None => Err(Error::IllegalState("scan is not open")),
        }
    }

    fn close(&mut self) {
        if let Some(mut iter) = self.iter.take() {
            iter.close();
        }
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

//! Insert: drains its child into a table and reports the row count.

use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::common::{Error, Result, TransactionId};
use crate::database::Database;
use crate::execution::operator::OpIterator;
use crate::tuple::{Column, Field, Schema, Tuple, Type};

/// Writes every row produced by its child into one table through the
/// buffer pool.
///
/// The entire child is drained on the first fetch, after which exactly
/// one output row is produced: a single integer holding the number of
/// rows inserted. Further fetches report end-of-data until a rewind.
/// Storage failures during the drain propagate to the caller.
pub struct Insert {
    tx: TransactionId,
    pool: Arc<BufferPool>,
    table_id: u32,
    child: Box<dyn OpIterator>,
    out_schema: Arc<Schema>,
    open: bool,
    done: bool,
}

impl std::fmt::Debug for Insert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Insert")
            .field("tx", &self.tx)
            .field("table_id", &self.table_id)
            .field("out_schema", &self.out_schema)
            .field("open", &self.open)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Insert {
    /// Create an insert of `child`'s rows into `table_id`.
    ///
    /// Fails with `SchemaMismatch` if the child's rows do not match the
    /// table's schema.
    pub fn new(
        db: &Database,
        tx: TransactionId,
        child: Box<dyn OpIterator>,
        table_id: u32,
    ) -> Result<Self> {
        let table_schema = db.catalog().schema(table_id)?;
        if *table_schema != **child.schema() {
            return Err(Error::SchemaMismatch(format!(
                "child rows {} do not match table shape {}",
                child.schema(),
                table_schema
            )));
        }
        Ok(Insert {
            tx,
            pool: Arc::clone(db.pool()),
            table_id,
            child,
            out_schema: Arc::new(Schema::new(vec![Column::named(Type::Int, "count")])),
            open: false,
            done: false,
        })
    }
}

impl OpIterator for Insert {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IllegalState("insert is already open"));
        }
        self.child.open()?;
        self.open = true;
        self.done = false;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        if !self.open {
            return Err(Error::IllegalState("insert is not open"));
        }
        Ok(!self.done)
    }

    fn next(&mut self) -> Result<Tuple> {
        if !self.open {
            return Err(Error::NoSuchElement("insert is not open"));
        }
        if self.done {
            return Err(Error::NoSuchElement("insert already reported its count"));
        }
        self.done = true;

        let mut count = 0;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            self.pool.insert_tuple(self.tx, self.table_id, tuple)?;
            count += 1;
        }

        Tuple::from_fields(Arc::clone(&self.out_schema), vec![Field::Int(count)])
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::IllegalState("insert is not open"));
        }
        self.child.rewind()?;
        self.done = false;
        Ok(())
    }

    fn close(&mut self) {
        self.child.close();
        self.open = false;
        self.done = false;
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.out_schema
    }
}

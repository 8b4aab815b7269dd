//! Delete: drains its child, removing each row from its table.

use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::common::{Error, Result, TransactionId};
use crate::database::Database;
use crate::execution::operator::OpIterator;
use crate::tuple::{Column, Field, Schema, Tuple, Type};

/// Removes every row produced by its child through the buffer pool,
/// routed by each row's record id.
///
/// Like [`Insert`](crate::execution::Insert), the child is drained on the
/// first fetch and exactly one output row is produced: the number of rows
/// deleted. Further fetches report end-of-data until a rewind.
pub struct Delete {
    tx: TransactionId,
    pool: Arc<BufferPool>,
    child: Box<dyn OpIterator>,
    out_schema: Arc<Schema>,
    open: bool,
    done: bool,
}

impl Delete {
    /// Create a delete of `child`'s rows.
    pub fn new(db: &Database, tx: TransactionId, child: Box<dyn OpIterator>) -> Self {
        Delete {
            tx,
            pool: Arc::clone(db.pool()),
            child,
            out_schema: Arc::new(Schema::new(vec![Column::named(Type::Int, "count")])),
            open: false,
            done: false,
        }
    }
}

impl OpIterator for Delete {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IllegalState("delete is already open"));
        }
        self.child.open()?;
        self.open = true;
        self.done = false;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        if !self.open {
            return Err(Error::IllegalState("delete is not open"));
        }
        Ok(!self.done)
    }

    fn next(&mut self) -> Result<Tuple> {
        if !self.open {
            return Err(Error::NoSuchElement("delete is not open"));
        }
        if self.done {
            return Err(Error::NoSuchElement("delete already reported its count"));
        }
        self.done = true;

        let mut count = 0;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            self.pool.delete_tuple(self.tx, &tuple)?;
            count += 1;
        }

        Tuple::from_fields(Arc::clone(&self.out_schema), vec![Field::Int(count)])
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::IllegalState("delete is not open"));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::filter::Filter;
    use crate::execution::predicate::Predicate;
    use crate::execution::seq_scan::SeqScan;
    use crate::storage::HeapFile;
    use crate::tuple::Op;
    use tempfile::tempdir;

    fn setup_with_rows(values: &[i32]) -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::with_cache_pages(4);
        let schema = Arc::new(Schema::new(vec![Column::named(Type::Int, "id")]));
        let file =
            Arc::new(HeapFile::open(dir.path().join("t.dat"), 1, Arc::clone(&schema)).unwrap());
        db.catalog().add_table(file, "t");

        let tx = TransactionId::new();
        for &v in values {
            let t = Tuple::from_fields(Arc::clone(&schema), vec![Field::Int(v)]).unwrap();
            db.pool().insert_tuple(tx, 1, t).unwrap();
        }
        (db, dir)
    }

    fn scan_ids(db: &Database) -> Vec<i32> {
        let mut scan = SeqScan::new(db, TransactionId::new(), 1, "t").unwrap();
        scan.open().unwrap();
        let mut out = vec![];
        while scan.has_next().unwrap() {
            if let Some(Field::Int(v)) = scan.next().unwrap().field(0) {
                out.push(*v);
            }
        }
        scan.close();
        out.sort_unstable();
        out
    }

    #[test]
    fn test_delete_all_rows() {
        let (db, _dir) = setup_with_rows(&[1, 2, 3]);
        let tx = TransactionId::new();

        let scan = SeqScan::new(&db, tx, 1, "t").unwrap();
        let mut delete = Delete::new(&db, tx, Box::new(scan));
        delete.open().unwrap();
        let summary = delete.next().unwrap();
        assert_eq!(summary.field(0), Some(&Field::Int(3)));
        delete.close();

        assert!(scan_ids(&db).is_empty());
    }

    #[test]
    fn test_delete_filtered_subset() {
        let (db, _dir) = setup_with_rows(&[1, 2, 3, 4]);
        let tx = TransactionId::new();

        // Delete the rows with id > 2.
        let scan = SeqScan::new(&db, tx, 1, "t").unwrap();
        let filter = Filter::new(
            Predicate::compare(0, Op::GreaterThan, Field::Int(2)),
            Box::new(scan),
        );
        let mut delete = Delete::new(&db, tx, Box::new(filter));
        delete.open().unwrap();
        let summary = delete.next().unwrap();
        assert_eq!(summary.field(0), Some(&Field::Int(2)));
        delete.close();

        assert_eq!(scan_ids(&db), vec![1, 2]);
    }

    #[test]
    fn test_delete_reports_once() {
        let (db, _dir) = setup_with_rows(&[1]);
        let tx = TransactionId::new();
        let scan = SeqScan::new(&db, tx, 1, "t").unwrap();
        let mut delete = Delete::new(&db, tx, Box::new(scan));
        delete.open().unwrap();
        delete.next().unwrap();
        assert!(!delete.has_next().unwrap());
        assert!(matches!(delete.next(), Err(Error::NoSuchElement(_))));
    }

    #[test]
    fn test_delete_unpersisted_row_errors() {
        let (db, _dir) = setup_with_rows(&[]);
        let tx = TransactionId::new();
        let schema = Arc::new(Schema::new(vec![Column::named(Type::Int, "id")]));
        let unpersisted =
            Tuple::from_fields(Arc::clone(&schema), vec![Field::Int(9)]).unwrap();
        let source = crate::execution::row_source::RowSource::new(schema, vec![unpersisted]);

        let mut delete = Delete::new(&db, tx, Box::new(source));
        delete.open().unwrap();
        // The storage error surfaces instead of being swallowed.
        assert!(matches!(delete.next(), Err(Error::MissingRecordId)));
    }
}

//! An in-memory leaf operator over a fixed list of rows.

use std::sync::Arc;

use crate::common::{Error, Result};
use crate::execution::operator::OpIterator;
use crate::tuple::{Schema, Tuple};

/// Serves a prepared `Vec` of rows through the operator protocol.
///
/// This is how literal rows enter an execution tree — most commonly as
/// the child of an [`Insert`](crate::execution::Insert) — and the usual
/// stand-in child in operator tests.
pub struct RowSource {
    schema: Arc<Schema>,
    rows: Vec<Tuple>,
    cursor: Option<usize>,
}

impl RowSource {
    /// Create a source over `rows`, which must all share `schema`.
    pub fn new(schema: Arc<Schema>, rows: Vec<Tuple>) -> Self {
        RowSource {
            schema,
            rows,
            cursor: None,
        }
    }
}

impl OpIterator for RowSource {
    fn open(&mut self) -> Result<()> {
        if self.cursor.is_some() {
            return Err(Error::IllegalState("row source is already open"));
        }
        self.cursor = Some(0);
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        match self.cursor {
            Some(i) => Ok(i < self.rows.len()),
            None => Err(Error::IllegalState("row source is not open")),
        }
    }

    fn next(&mut self) -> Result<Tuple> {
        match self.cursor {
            Some(i) if i < self.rows.len() => {
                self.cursor = Some(i + 1);
                Ok(self.rows[i].clone())
            }
            Some(_) => Err(Error::NoSuchElement("row source exhausted")),
            None => Err(Error::NoSuchElement("row source is not open")),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        match self.cursor {
            Some(_) => {
                self.cursor = Some(0);
                Ok(())
            }
            None => Err(Error::IllegalState("row source is not open")),
        }
    }

    fn close(&mut self) {
        self.cursor = None;
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::{Field, Type};

    fn source(values: &[i32]) -> RowSource {
        let schema = Arc::new(Schema::from_types(&[Type::Int]));
        let rows = values
            .iter()
            .map(|&v| Tuple::from_fields(Arc::clone(&schema), vec![Field::Int(v)]).unwrap())
            .collect();
        RowSource::new(schema, rows)
    }

    #[test]
    fn test_serves_rows_in_order() {
        let mut src = source(&[1, 2, 3]);
        src.open().unwrap();
        let mut out = vec![];
        while src.has_next().unwrap() {
            if let Some(Field::Int(v)) = src.next().unwrap().field(0) {
                out.push(*v);
            }
        }
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_exhausted_next_errors() {
        let mut src = source(&[1]);
        src.open().unwrap();
        src.next().unwrap();
        assert!(matches!(src.next(), Err(Error::NoSuchElement(_))));
    }

    #[test]
    fn test_rewind() {
        let mut src = source(&[1, 2]);
        src.open().unwrap();
        src.next().unwrap();
        src.rewind().unwrap();
        assert!(src.has_next().unwrap());
        src.next().unwrap();
        src.next().unwrap();
        assert!(!src.has_next().unwrap());
    }

    #[test]
    fn test_double_open_errors() {
        let mut src = source(&[]);
        src.open().unwrap();
        assert!(matches!(src.open(), Err(Error::IllegalState(_))));
        src.close();
        src.open().unwrap();
    }
}

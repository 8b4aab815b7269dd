//! Filter: relational select over one child operator.

use std::sync::Arc;

use crate::common::{Error, Result};
use crate::execution::operator::OpIterator;
use crate::execution::predicate::Predicate;
use crate::tuple::{Schema, Tuple};

/// Passes through the child's rows that satisfy a predicate, in the
/// child's order.
///
/// Filtering is lazy: each `next` pulls from the child until a row
/// matches, holding a one-row lookahead. Nothing is buffered, so rewind
/// rewinds the child and filters again.
pub struct Filter {
    predicate: Predicate,
    child: Box<dyn OpIterator>,
    open: bool,
    lookahead: Option<Tuple>,
}

impl Filter {
    /// Create a filter over `child`.
    pub fn new(predicate: Predicate, child: Box<dyn OpIterator>) -> Self {
        Filter {
            predicate,
            child,
            open: false,
            lookahead: None,
        }
    }

    /// The predicate being applied.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Pull from the child until a row matches.
    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            if self.predicate.eval(&tuple)? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }
}

impl OpIterator for Filter {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IllegalState("filter is already open"));
        }
        self.child.open()?;
        self.open = true;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        if !self.open {
            return Err(Error::IllegalState("filter is not open"));
        }
        if self.lookahead.is_none() {
            self.lookahead = self.fetch_next()?;
        }
        Ok(self.lookahead.is_some())
    }

    fn next(&mut self) -> Result<Tuple> {
        if !self.has_next()? {
            return Err(Error::NoSuchElement("no more rows pass the filter"));
        }
        self.lookahead
            .take()
            .ok_or(Error::NoSuchElement("no more rows pass the filter"))
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::IllegalState("filter is not open"));
        }
        self.lookahead = None;
        self.child.rewind()
    }

    fn close(&mut self) {
        self.child.close();
        self.open = false;
        self.lookahead = None;
    }

    fn schema(&self) -> &Arc<Schema> {
        self.child.schema()
    }
}

//! Query execution: the pull-based operator protocol and its operators.
//!
//! An execution tree of [`OpIterator`]s pulls rows top-down. Leaf scans
//! pull pages from the buffer pool; write operators push rows back
//! through it.
//!
//! # Operators
//! - [`SeqScan`] - read one table, alias-prefixing its schema
//! - [`Filter`] - relational select by a [`Predicate`]
//! - [`Aggregate`] - blocking grouped/ungrouped aggregation
//! - [`Insert`] / [`Delete`] - drain a child into row mutations, report a count
//! - [`RowSource`] - serve literal in-memory rows

mod aggregate;
mod aggregator;
mod delete;
mod filter;
mod insert;
mod integer_aggregator;
mod operator;
mod predicate;
mod row_source;
mod seq_scan;
mod string_aggregator;

pub use aggregate::Aggregate;
pub use aggregator::{output_schema, AggregateOp, Aggregator};
pub use delete::Delete;
pub use filter::Filter;
pub use insert::Insert;
pub use integer_aggregator::IntegerAggregator;
pub use operator::OpIterator;
pub use predicate::Predicate;
pub use row_source::RowSource;
pub use seq_scan::SeqScan;
pub use string_aggregator::StringAggregator;

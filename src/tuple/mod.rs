//! The type/field model: typed scalar values, row schemas, and rows.
//!
//! # Components
//! - [`Type`] / [`Field`] - column types and typed values with comparison
//! - [`Op`] - the comparison operators predicates are built from
//! - [`Schema`] / [`Column`] - the shape of a row and its byte size
//! - [`Tuple`] - one schema-bound record, optionally persisted

mod field;
mod schema;
#[allow(clippy::module_inception)]
mod tuple;

pub use field::{Field, Op, Type};
pub use schema::{Column, Schema};
pub use tuple::Tuple;

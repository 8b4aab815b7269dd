//! The aggregation engine: per-group running aggregate state.

use std::sync::Arc;

use crate::common::Result;
use crate::tuple::{Column, Schema, Tuple, Type};

/// The aggregate functions the engine computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl std::fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AggregateOp::Count => "count",
            AggregateOp::Sum => "sum",
            AggregateOp::Avg => "avg",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        };
        write!(f, "{}", s)
    }
}

/// Folds rows into per-group running aggregates.
///
/// One implementation exists per aggregated column type:
/// [`IntegerAggregator`](crate::execution::IntegerAggregator) for numeric
/// columns (all five operators) and
/// [`StringAggregator`](crate::execution::StringAggregator) for text
/// columns (COUNT only). The group key is the group-by field's value, or
/// a single ungrouped group when there is no grouping.
pub trait Aggregator {
    /// Fold one row into its group's running state.
    fn merge(&mut self, tuple: &Tuple) -> Result<()>;

    /// Finished per-group result rows, shaped by [`output_schema`].
    /// Cross-group order is unspecified.
    fn results(&self) -> Result<Vec<Tuple>>;
}

/// Output shape shared by both aggregators: `(aggregateVal)` when
/// ungrouped, `(groupVal, aggregateVal)` when grouped.
pub fn output_schema(group_type: Option<Type>) -> Arc<Schema> {
    let columns = match group_type {
        None => vec![Column::named(Type::Int, "aggregateVal")],
        Some(ty) => vec![
            Column::named(ty, "groupVal"),
            Column::named(Type::Int, "aggregateVal"),
        ],
    };
    Arc::new(Schema::new(columns))
}

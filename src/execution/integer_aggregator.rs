//! Running aggregates over an integer column.

use std::collections::HashMap;

use crate::common::{Error, Result};
use crate::execution::aggregator::{output_schema, AggregateOp, Aggregator};
use crate::tuple::{Field, Tuple, Type};

/// Per-group running state.
///
/// MIN and MAX are seeded at the type's extremes so the first merged
/// value always replaces the seed; AVG keeps a separate sum and count and
/// reports the truncated quotient.
#[derive(Debug, Clone)]
struct GroupState {
    current: i64,
    avg_sum: i64,
    avg_count: i64,
}

impl GroupState {
    fn new(op: AggregateOp) -> Self {
        let current = match op {
            AggregateOp::Count | AggregateOp::Sum | AggregateOp::Avg => 0,
            AggregateOp::Min => i32::MAX as i64,
            AggregateOp::Max => i32::MIN as i64,
        };
        GroupState {
            current,
            avg_sum: 0,
            avg_count: 0,
        }
    }

    fn fold(&mut self, op: AggregateOp, value: i64) {
        match op {
            AggregateOp::Count => self.current += 1,
            AggregateOp::Sum => self.current += value,
            AggregateOp::Avg => {
                self.avg_sum += value;
                self.avg_count += 1;
                self.current = self.avg_sum / self.avg_count;
            }
            AggregateOp::Min => self.current = self.current.min(value),
            AggregateOp::Max => self.current = self.current.max(value),
        }
    }
}

/// Computes COUNT, SUM, AVG, MIN, or MAX over an integer column,
/// optionally grouped by another column.
pub struct IntegerAggregator {
    group_field: Option<usize>,
    group_type: Option<Type>,
    agg_field: usize,
    op: AggregateOp,
    groups: HashMap<Option<Field>, GroupState>,
}

impl IntegerAggregator {
    /// Create an aggregator.
    ///
    /// `group` is the group-by field's index and type, or `None` for a
    /// single ungrouped aggregate; `agg_field` is the aggregated column.
    pub fn new(group: Option<(usize, Type)>, agg_field: usize, op: AggregateOp) -> Self {
        IntegerAggregator {
            group_field: group.map(|(i, _)| i),
            group_type: group.map(|(_, ty)| ty),
            agg_field,
            op,
            groups: HashMap::new(),
        }
    }
}

impl Aggregator for IntegerAggregator {
    fn merge(&mut self, tuple: &Tuple) -> Result<()> {
        let key = match self.group_field {
            None => None,
            Some(i) => Some(
                tuple
                    .field(i)
                    .cloned()
                    .ok_or(Error::IllegalState("group-by field is unset"))?,
            ),
        };
        let value = match tuple.field(self.agg_field) {
            Some(Field::Int(v)) => *v as i64,
            Some(other) => {
                return Err(Error::TypeMismatch(format!(
                    "integer aggregate over non-integer value {}",
                    other
                )))
            }
            None => return Err(Error::IllegalState("aggregate field is unset")),
        };

        self.groups
            .entry(key)
            .or_insert_with(|| GroupState::new(self.op))
            .fold(self.op, value);
        Ok(())
    }

    fn results(&self) -> Result<Vec<Tuple>> {
        let schema = output_schema(self.group_type);
        let mut out = Vec::with_capacity(self.groups.len());
        for (key, state) in &self.groups {
            let agg_val = Field::Int(state.current as i32);
            let fields = match key {
                None => vec![agg_val],
                Some(group_val) => vec![group_val.clone(), agg_val],
            };
            out.push(Tuple::from_fields(schema.clone(), fields)?);
        }
        Ok(out)
    }
}

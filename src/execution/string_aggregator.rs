//! Running aggregates over a string column. COUNT is the only operator
//! with a meaning here.

use std::collections::HashMap;

use crate::common::{Error, Result};
use crate::execution::aggregator::{output_schema, AggregateOp, Aggregator};
use crate::tuple::{Field, Tuple, Type};

/// Counts rows per group where the aggregated column is a string.
///
/// Constructing one with any operator other than COUNT fails with
/// `UnsupportedAggregate`.
#[derive(Debug)]
pub struct StringAggregator {
    group_field: Option<usize>,
    group_type: Option<Type>,
    agg_field: usize,
    counts: HashMap<Option<Field>, i32>,
}

impl StringAggregator {
    /// Create a COUNT aggregator over a string column.
    pub fn new(group: Option<(usize, Type)>, agg_field: usize, op: AggregateOp) -> Result<Self> {
        if op != AggregateOp::Count {
            return Err(Error::UnsupportedAggregate(op));
        }
        Ok(StringAggregator {
            group_field: group.map(|(i, _)| i),
            group_type: group.map(|(_, ty)| ty),
            agg_field,
            counts: HashMap::new(),
        })
    }
}

impl Aggregator for StringAggregator {
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
        match tuple.field(self.agg_field) {
            Some(Field::Text(_)) => {}
            Some(other) => {
                return Err(Error::TypeMismatch(format!(
                    "string aggregate over non-string value {}",
                    other
                )))
            }
            None => return Err(Error::IllegalState("aggregate field is unset")),
        }

        *self.counts.entry(key).or_insert(0) += 1;
        Ok(())
    }

    fn results(&self) -> Result<Vec<Tuple>> {
        let schema = output_schema(self.group_type);
        let mut out = Vec::with_capacity(self.counts.len());
        for (key, count) in &self.counts {
            let fields = match key {
                None => vec![Field::Int(*count)],
                Some(group_val) => vec![group_val.clone(), Field::Int(*count)],
            };
            out.push(Tuple::from_fields(schema.clone(), fields)?);
        }
        Ok(out)
    }
}

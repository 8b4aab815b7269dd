//! Aggregate: grouped or ungrouped aggregation over one column.

use std::sync::Arc;

use crate::common::{Error, Result};
use crate::execution::aggregator::{output_schema, AggregateOp, Aggregator};
use crate::execution::integer_aggregator::IntegerAggregator;
use crate::execution::operator::OpIterator;
use crate::execution::string_aggregator::StringAggregator;
use crate::tuple::{Schema, Tuple, Type};

/// Computes one aggregate (COUNT/SUM/AVG/MIN/MAX) over a single column,
/// optionally grouped by a single column.
///
/// A group's result requires every input row, so `open` drains the child
/// completely before the first row is available — this operator is
/// blocking by construction. The finished groups are then served in
/// unspecified order; `rewind` re-serves them without re-reading the
/// child.
pub struct Aggregate {
    child: Box<dyn OpIterator>,
    agg_field: usize,
    group_field: Option<usize>,
    op: AggregateOp,
    out_schema: Arc<Schema>,
    results: Option<Vec<Tuple>>,
    cursor: usize,
}

impl std::fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregate")
            .field("agg_field", &self.agg_field)
            .field("group_field", &self.group_field)
            .field("op", &self.op)
            .field("out_schema", &self.out_schema)
            .field("results", &self.results)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl Aggregate {
    /// Create an aggregate over `child`.
    ///
    /// `agg_field` is the aggregated column in the child's schema and
    /// `group_field` the optional group-by column. Fails immediately with
    /// `UnsupportedAggregate` for a non-COUNT operator over a string
    /// column.
    pub fn new(
        child: Box<dyn OpIterator>,
        agg_field: usize,
        group_field: Option<usize>,
        op: AggregateOp,
    ) -> Result<Self> {
        let child_schema = child.schema();
        let agg_type = *child_schema.field_type(agg_field);
        let group_type = group_field.map(|g| *child_schema.field_type(g));

        // A string column only supports COUNT; reject the rest up front.
        if matches!(agg_type, Type::Text(_)) && op != AggregateOp::Count {
            return Err(Error::UnsupportedAggregate(op));
        }

        let out_schema = output_schema(group_type);
        Ok(Aggregate {
            child,
            agg_field,
            group_field,
            op,
            out_schema,
            results: None,
            cursor: 0,
        })
    }

    /// The group-by column in the child's schema, if any.
    pub fn group_field(&self) -> Option<usize> {
        self.group_field
    }

    /// The aggregated column in the child's schema.
    pub fn aggregate_field(&self) -> usize {
        self.agg_field
    }

    /// The aggregate operator.
    pub fn aggregate_op(&self) -> AggregateOp {
        self.op
    }

    fn build_aggregator(&self) -> Result<Box<dyn Aggregator>> {
        let child_schema = self.child.schema();
        let group = self
            .group_field
            .map(|g| (g, *child_schema.field_type(g)));
        match child_schema.field_type(self.agg_field) {
            Type::Int => Ok(Box::new(IntegerAggregator::new(
                group,
                self.agg_field,
                self.op,
            ))),
            Type::Text(_) => Ok(Box::new(StringAggregator::new(
                group,
                self.agg_field,
                self.op,
            )?)),
        }
    }
}

impl OpIterator for Aggregate {
    fn open(&mut self) -> Result<()> {
        if self.results.is_some() {
            return Err(Error::IllegalState("aggregate is already open"));
        }
        self.child.open()?;

        let mut aggregator = self.build_aggregator()?;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            aggregator.merge(&tuple)?;
        }

        self.results = Some(aggregator.results()?);
        self.cursor = 0;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        match &self.results {
            Some(rows) => Ok(self.cursor < rows.len()),
            None => Err(Error::IllegalState("aggregate is not open")),
        }
    }

    fn next(&mut self) -> Result<Tuple> {
        match &self.results {
            Some(rows) if self.cursor < rows.len() => {
                let tuple = rows[self.cursor].clone();
                self.cursor += 1;
                Ok(tuple)
            }
            Some(_) => Err(Error::NoSuchElement("no more groups")),
            None => Err(Error::NoSuchElement("aggregate is not open")),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        if self.results.is_none() {
            return Err(Error::IllegalState("aggregate is not open"));
        }
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.child.close();
        self.results = None;
        self.cursor = 0;
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.out_schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::row_source::RowSource;
    use crate::tuple::Field;

    /// (group: text, value: int) rows.
    fn grouped_source(rows: &[(&str, i32)]) -> Box<dyn OpIterator> {
        let schema = Arc::new(Schema::from_types(&[Type::Text(8), Type::Int]));
        let tuples = rows
            .iter()
            .map(|&(g, v)| {
                Tuple::from_fields(
                    Arc::clone(&schema),
                    vec![Field::Text(g.into()), Field::Int(v)],
                )
                .unwrap()
            })
            .collect();
        Box::new(RowSource::new(schema, tuples))
    }

    fn drain(agg: &mut Aggregate) -> Vec<Tuple> {
        let mut out = vec![];
        while agg.has_next().unwrap() {
            out.push(agg.next().unwrap());
        }
        out
    }

    #[test]
    fn test_grouped_sum() {
        let child = grouped_source(&[("A", 1), ("A", 3), ("B", 2)]);
        let mut agg = Aggregate::new(child, 1, Some(0), AggregateOp::Sum).unwrap();
        agg.open().unwrap();

        let mut out: Vec<(String, i32)> = drain(&mut agg)
            .iter()
            .map(|t| match (t.field(0), t.field(1)) {
                (Some(Field::Text(g)), Some(Field::Int(v))) => (g.clone(), *v),
                other => panic!("unexpected row {:?}", other),
            })
            .collect();
        out.sort();
        assert_eq!(out, vec![("A".to_string(), 4), ("B".to_string(), 2)]);
        agg.close();
    }

    #[test]
    fn test_ungrouped_count() {
        let child = grouped_source(&[("A", 1), ("A", 3), ("B", 2)]);
        let mut agg = Aggregate::new(child, 1, None, AggregateOp::Count).unwrap();
        agg.open().unwrap();

        let rows = drain(&mut agg);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field(0), Some(&Field::Int(3)));
        assert_eq!(agg.schema().len(), 1);
    }

    #[test]
    fn test_string_column_rejects_sum() {
        let child = grouped_source(&[("A", 1)]);
        let err = Aggregate::new(child, 0, None, AggregateOp::Sum).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAggregate(AggregateOp::Sum)));
    }

    #[test]
    fn test_string_column_count() {
        let child = grouped_source(&[("A", 1), ("B", 2)]);
        let mut agg = Aggregate::new(child, 0, None, AggregateOp::Count).unwrap();
        agg.open().unwrap();
        let rows = drain(&mut agg);
        assert_eq!(rows[0].field(0), Some(&Field::Int(2)));
    }

    #[test]
    fn test_rewind_reserves_groups() {
        let child = grouped_source(&[("A", 1), ("B", 2)]);
        let mut agg = Aggregate::new(child, 1, Some(0), AggregateOp::Sum).unwrap();
        agg.open().unwrap();

        let first = drain(&mut agg);
        agg.rewind().unwrap();
        let second = drain(&mut agg);
        assert_eq!(first, second);
    }

    #[test]
    fn test_protocol_errors() {
        let child = grouped_source(&[("A", 1)]);
        let mut agg = Aggregate::new(child, 1, None, AggregateOp::Sum).unwrap();
        assert!(matches!(agg.has_next(), Err(Error::IllegalState(_))));
        agg.open().unwrap();
        assert!(matches!(agg.open(), Err(Error::IllegalState(_))));
    }

    #[test]
    fn test_accessors() {
        let child = grouped_source(&[("A", 1)]);
        let agg = Aggregate::new(child, 1, Some(0), AggregateOp::Max).unwrap();
        assert_eq!(agg.aggregate_field(), 1);
        assert_eq!(agg.group_field(), Some(0));
        assert_eq!(agg.aggregate_op(), AggregateOp::Max);
    }
}

//! Per-table statistics for cost-based planning.

use std::sync::Arc;

use crate::common::config::NUM_HIST_BUCKETS;
use crate::common::{Error, Result, TransactionId};
use crate::database::Database;
use crate::optimizer::int_histogram::IntHistogram;
use crate::optimizer::string_histogram::StringHistogram;
use crate::tuple::{Field, Op, Schema, Type};

enum ColumnHistogram {
    Int(IntHistogram),
    Text(StringHistogram),
}

/// Histogram-backed statistics over one table's columns.
///
/// Built by scanning the table twice: once to learn each integer
/// column's min/max (which fix the bucket ranges), once to populate the
/// bucket counts. A planner combines [`estimate_scan_cost`],
/// [`estimate_selectivity`], and [`estimate_cardinality`] to cost
/// alternative plans.
///
/// There is no process-wide stats registry; callers build stats per
/// table and own the map from table name to `TableStats` themselves.
///
/// [`estimate_scan_cost`]: Self::estimate_scan_cost
/// [`estimate_selectivity`]: Self::estimate_selectivity
/// [`estimate_cardinality`]: Self::estimate_cardinality
pub struct TableStats {
    io_cost_per_page: f64,
    num_pages: u32,
    total_tuples: usize,
    schema: Arc<Schema>,
    histograms: Vec<ColumnHistogram>,
}

impl TableStats {
    /// Scan `table_id` and build one histogram per column.
    pub fn build(db: &Database, table_id: u32, io_cost_per_page: f64) -> Result<Self> {
        let file = db.catalog().file(table_id)?;
        let schema = Arc::clone(file.schema());
        let tx = TransactionId::new();
        let mut iter = file.iter(tx, Arc::clone(db.pool()));

        // Pass 1: per-column min/max for the integer columns.
        let n = schema.len();
        let mut mins = vec![i32::MAX; n];
        let mut maxs = vec![i32::MIN; n];
        let mut seen_any = false;
        iter.open()?;
        while iter.has_next()? {
            let tuple = iter.next()?;
            seen_any = true;
            for (i, column) in schema.columns().iter().enumerate() {
                if column.ty != Type::Int {
                    continue;
                }
                if let Some(Field::Int(v)) = tuple.field(i) {
                    mins[i] = mins[i].min(*v);
                    maxs[i] = maxs[i].max(*v);
                }
            }
        }

        let mut histograms: Vec<ColumnHistogram> = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| match column.ty {
                Type::Int => {
                    let (min, max) = if seen_any && mins[i] <= maxs[i] {
                        (mins[i], maxs[i])
                    } else {
                        (0, 0)
                    };
                    ColumnHistogram::Int(IntHistogram::new(NUM_HIST_BUCKETS, min, max))
                }
                Type::Text(_) => ColumnHistogram::Text(StringHistogram::new(NUM_HIST_BUCKETS)),
            })
            .collect();

        // Pass 2: populate bucket counts and the row total.
        iter.rewind()?;
        let mut total_tuples = 0;
        while iter.has_next()? {
            let tuple = iter.next()?;
            total_tuples += 1;
            for (i, histogram) in histograms.iter_mut().enumerate() {
                match (histogram, tuple.field(i)) {
                    (ColumnHistogram::Int(h), Some(Field::Int(v))) => h.add_value(*v),
                    (ColumnHistogram::Text(h), Some(Field::Text(s))) => h.add_value(s),
                    _ => {}
                }
            }
        }
        iter.close();

        Ok(TableStats {
            io_cost_per_page,
            num_pages: file.num_pages()?,
            total_tuples,
            schema,
            histograms,
        })
    }

    /// Cost of sequentially scanning the whole table, assuming nothing is
    /// cached and partial pages cost as much as full ones.
    pub fn estimate_scan_cost(&self) -> f64 {
        self.num_pages as f64 * self.io_cost_per_page
    }

    /// Rows expected from a scan with the given predicate selectivity.
    pub fn estimate_cardinality(&self, selectivity: f64) -> usize {
        (self.total_tuples as f64 * selectivity).ceil() as usize
    }

    /// Estimated selectivity of `column op constant` on this table.
    pub fn estimate_selectivity(&self, column: usize, op: Op, constant: &Field) -> Result<f64> {
        let histogram = self
            .histograms
            .get(column)
            .ok_or(Error::IllegalState("column index out of bounds"))?;
        match (histogram, constant) {
            (ColumnHistogram::Int(h), Field::Int(v)) => Ok(h.estimate_selectivity(op, *v)),
            (ColumnHistogram::Text(h), Field::Text(s)) => Ok(h.estimate_selectivity(op, s)),
            _ => Err(Error::TypeMismatch(format!(
                "constant {} does not match column {} of type {}",
                constant,
                column,
                self.schema.field_type(column)
            ))),
        }
    }

    /// Expected selectivity of `column op ?` with an unknown constant; a
    /// placeholder pending smarter join estimation.
    pub fn avg_selectivity(&self, _column: usize, _op: Op) -> f64 {
        1.0
    }

    /// Total number of rows in the table at build time.
    pub fn total_tuples(&self) -> usize {
        self.total_tuples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HeapFile;
    use crate::tuple::{Column, Tuple};
    use tempfile::tempdir;

    fn setup(values: &[(i32, &str)]) -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::with_cache_pages(8);
        let schema = Arc::new(Schema::new(vec![
            Column::named(Type::Int, "score"),
            Column::named(Type::Text(8), "name"),
        ]));
        let file =
            Arc::new(HeapFile::open(dir.path().join("t.dat"), 1, Arc::clone(&schema)).unwrap());
        db.catalog().add_table(file, "t");

        let tx = TransactionId::new();
        for &(v, s) in values {
            let t = Tuple::from_fields(
                Arc::clone(&schema),
                vec![Field::Int(v), Field::Text(s.into())],
            )
            .unwrap();
            db.pool().insert_tuple(tx, 1, t).unwrap();
        }
        (db, dir)
    }

    #[test]
    fn test_scan_cost_scales_with_pages() {
        let (db, _dir) = setup(&[(1, "a"), (2, "b")]);
        let stats = TableStats::build(&db, 1, 1000.0).unwrap();
        // Two rows fit on one page.
        assert_eq!(stats.estimate_scan_cost(), 1000.0);
    }

    #[test]
    fn test_cardinality_rounds_up() {
        let rows: Vec<(i32, &str)> = (0..10).map(|i| (i, "x")).collect();
        let (db, _dir) = setup(&rows);
        let stats = TableStats::build(&db, 1, 1000.0).unwrap();

        assert_eq!(stats.total_tuples(), 10);
        assert_eq!(stats.estimate_cardinality(1.0), 10);
        assert_eq!(stats.estimate_cardinality(0.5), 5);
        assert_eq!(stats.estimate_cardinality(0.01), 1);
        assert_eq!(stats.estimate_cardinality(0.0), 0);
    }

    #[test]
    fn test_int_column_selectivity() {
        let rows: Vec<(i32, &str)> = (1..=100).map(|i| (i, "x")).collect();
        let (db, _dir) = setup(&rows);
        let stats = TableStats::build(&db, 1, 1000.0).unwrap();

        let sel = stats
            .estimate_selectivity(0, Op::GreaterThan, &Field::Int(50))
            .unwrap();
        assert!(sel > 0.3 && sel < 0.7, "got {}", sel);

        let none = stats
            .estimate_selectivity(0, Op::Equals, &Field::Int(500))
            .unwrap();
        assert_eq!(none, 0.0);
    }

    #[test]
    fn test_string_column_selectivity() {
        let (db, _dir) = setup(&[(1, "apple"), (2, "pear"), (3, "plum")]);
        let stats = TableStats::build(&db, 1, 1000.0).unwrap();

        let eq = stats
            .estimate_selectivity(1, Op::Equals, &Field::Text("apple".into()))
            .unwrap();
        let neq = stats
            .estimate_selectivity(1, Op::NotEquals, &Field::Text("apple".into()))
            .unwrap();
        assert!((eq + neq - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_constant_type() {
        let (db, _dir) = setup(&[(1, "a")]);
        let stats = TableStats::build(&db, 1, 1000.0).unwrap();
        let err = stats
            .estimate_selectivity(0, Op::Equals, &Field::Text("a".into()))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn test_empty_table() {
        let (db, _dir) = setup(&[]);
        let stats = TableStats::build(&db, 1, 1000.0).unwrap();
        assert_eq!(stats.total_tuples(), 0);
        assert_eq!(stats.estimate_scan_cost(), 0.0);
        assert_eq!(stats.estimate_cardinality(0.5), 0);
    }
}

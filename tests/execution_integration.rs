//! End-to-end tests driving full operator trees against real tables.

use std::sync::Arc;

use heapdb::common::TransactionId;
use heapdb::execution::{
    Aggregate, AggregateOp, Delete, Filter, Insert, OpIterator, Predicate, RowSource, SeqScan,
};
use heapdb::storage::HeapFile;
use heapdb::tuple::{Column, Field, Op, Schema, Tuple, Type};
use heapdb::Database;
use tempfile::tempdir;

fn table_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Column::named(Type::Int, "id"),
        Column::named(Type::Int, "value"),
    ]))
}

fn setup(dir: &tempfile::TempDir) -> Database {
    let db = Database::with_cache_pages(8);
    let file = Arc::new(HeapFile::open(dir.path().join("t.dat"), 1, table_schema()).unwrap());
    db.catalog().add_table(file, "t");
    db
}

fn literal_rows(rows: &[(i32, i32)]) -> Box<dyn OpIterator> {
    let schema = table_schema();
    let tuples = rows
        .iter()
        .map(|&(id, v)| {
            Tuple::from_fields(Arc::clone(&schema), vec![Field::Int(id), Field::Int(v)]).unwrap()
        })
        .collect();
    Box::new(RowSource::new(schema, tuples))
}

fn scan_rows(db: &Database) -> Vec<(i32, i32)> {
    let mut scan = SeqScan::new(db, TransactionId::new(), 1, "t").unwrap();
    scan.open().unwrap();
    let mut out = vec![];
    while scan.has_next().unwrap() {
        let t = scan.next().unwrap();
        match (t.field(0), t.field(1)) {
            (Some(Field::Int(id)), Some(Field::Int(v))) => out.push((*id, *v)),
            other => panic!("unexpected row {:?}", other),
        }
    }
    scan.close();
    out.sort_unstable();
    out
}

/// Run a write operator to completion and return its count.
fn run_to_count(op: &mut dyn OpIterator) -> i32 {
    op.open().unwrap();
    let summary = op.next().unwrap();
    assert!(!op.has_next().unwrap());
    op.close();
    match summary.field(0) {
        Some(Field::Int(n)) => *n,
        other => panic!("unexpected summary {:?}", other),
    }
}

#[test]
fn test_insert_then_scan_then_delete() {
    let dir = tempdir().unwrap();
    let db = setup(&dir);
    let tx = TransactionId::new();

    // Insert 5 literal rows; the one summary row reports count 5.
    let rows = [(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)];
    let mut insert = Insert::new(&db, tx, literal_rows(&rows), 1).unwrap();
    assert_eq!(run_to_count(&mut insert), 5);

    assert_eq!(scan_rows(&db), rows.to_vec());

    // Delete the two rows with id > 3; the summary reports count 2.
    let scan = SeqScan::new(&db, tx, 1, "t").unwrap();
    let filter = Filter::new(
        Predicate::compare(0, Op::GreaterThan, Field::Int(3)),
        Box::new(scan),
    );
    let mut delete = Delete::new(&db, tx, Box::new(filter));
    assert_eq!(run_to_count(&mut delete), 2);

    assert_eq!(scan_rows(&db), vec![(1, 10), (2, 20), (3, 30)]);
}

#[test]
fn test_filter_over_stored_rows_preserves_order() {
    let dir = tempdir().unwrap();
    let db = setup(&dir);
    let tx = TransactionId::new();

    let mut insert = Insert::new(
        &db,
        tx,
        literal_rows(&[(1, 5), (2, 15), (3, 10), (4, 20)]),
        1,
    )
    .unwrap();
    run_to_count(&mut insert);

    // value > 10 keeps rows (2,15) and (4,20), in scan order.
    let scan = SeqScan::new(&db, tx, 1, "t").unwrap();
    let mut filter = Filter::new(
        Predicate::compare(1, Op::GreaterThan, Field::Int(10)),
        Box::new(scan),
    );
    filter.open().unwrap();
    let mut values = vec![];
    while filter.has_next().unwrap() {
        if let Some(Field::Int(v)) = filter.next().unwrap().field(1) {
            values.push(*v);
        }
    }
    filter.close();
    assert_eq!(values, vec![15, 20]);
}

#[test]
fn test_aggregate_over_stored_rows() {
    let dir = tempdir().unwrap();
    let db = setup(&dir);
    let tx = TransactionId::new();

    // Group ids: (1,1),(1,3),(2,2) summed by group.
    let mut insert = Insert::new(&db, tx, literal_rows(&[(1, 1), (1, 3), (2, 2)]), 1).unwrap();
    run_to_count(&mut insert);

    let scan = SeqScan::new(&db, tx, 1, "t").unwrap();
    let mut agg = Aggregate::new(Box::new(scan), 1, Some(0), AggregateOp::Sum).unwrap();
    agg.open().unwrap();
    let mut groups = vec![];
    while agg.has_next().unwrap() {
        let t = agg.next().unwrap();
        match (t.field(0), t.field(1)) {
            (Some(Field::Int(g)), Some(Field::Int(v))) => groups.push((*g, *v)),
            other => panic!("unexpected group row {:?}", other),
        }
    }
    agg.close();
    groups.sort_unstable();
    assert_eq!(groups, vec![(1, 4), (2, 2)]);

    // Ungrouped COUNT over the same table.
    let scan = SeqScan::new(&db, tx, 1, "t").unwrap();
    let mut count = Aggregate::new(Box::new(scan), 1, None, AggregateOp::Count).unwrap();
    count.open().unwrap();
    let t = count.next().unwrap();
    assert_eq!(t.field(0), Some(&Field::Int(3)));
    count.close();
}

#[test]
fn test_insert_spills_across_pages_through_small_cache() {
    let dir = tempdir().unwrap();
    let db = Database::with_cache_pages(2);
    let file = Arc::new(HeapFile::open(dir.path().join("t.dat"), 1, table_schema()).unwrap());
    db.catalog().add_table(Arc::clone(&file), "t");
    let tx = TransactionId::new();

    // 8-byte rows give 504 slots per page: 1000 rows spill onto a second
    // page.
    let rows: Vec<(i32, i32)> = (0..1000).map(|i| (i, i)).collect();
    let mut insert = Insert::new(&db, tx, literal_rows(&rows), 1).unwrap();
    assert_eq!(run_to_count(&mut insert), 1000);
    db.pool().flush_all_pages().unwrap();

    assert_eq!(file.num_pages().unwrap(), 2);
    assert_eq!(scan_rows(&db).len(), 1000);
}

#[test]
fn test_rewound_insert_reinserts() {
    let dir = tempdir().unwrap();
    let db = setup(&dir);
    let tx = TransactionId::new();

    let mut insert = Insert::new(&db, tx, literal_rows(&[(1, 1)]), 1).unwrap();
    insert.open().unwrap();
    assert_eq!(insert.next().unwrap().field(0), Some(&Field::Int(1)));

    // After a rewind the operator runs its cycle again.
    insert.rewind().unwrap();
    assert!(insert.has_next().unwrap());
    assert_eq!(insert.next().unwrap().field(0), Some(&Field::Int(1)));
    insert.close();

    assert_eq!(scan_rows(&db).len(), 2);
}

#[test]
fn test_deleted_slots_are_reused() {
    let dir = tempdir().unwrap();
    let db = setup(&dir);
    let tx = TransactionId::new();

    let mut insert = Insert::new(&db, tx, literal_rows(&[(1, 1), (2, 2)]), 1).unwrap();
    run_to_count(&mut insert);

    let scan = SeqScan::new(&db, tx, 1, "t").unwrap();
    let mut delete = Delete::new(&db, tx, Box::new(scan));
    assert_eq!(run_to_count(&mut delete), 2);

    let mut insert = Insert::new(&db, tx, literal_rows(&[(3, 3)]), 1).unwrap();
    run_to_count(&mut insert);

    // The freed slots were reused; the file did not grow.
    let file = db.catalog().file(1).unwrap();
    assert_eq!(file.num_pages().unwrap(), 1);
    assert_eq!(scan_rows(&db), vec![(3, 3)]);
}

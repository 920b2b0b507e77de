//! End-to-end tests for the join operators on the lab dataset shape:
//! left rows `('r{i}', i % right_rows)`, right rows `(i, 's{i}')`, joined
//! on the shared `b` attribute.

use std::sync::Arc;

use burrow::buffer::BufMgr;
use burrow::catalog::{Catalog, TableSchema};
use burrow::executor::{BlockNestedLoopJoin, OnePassJoin};
use burrow::heap::{insert_tuple, tuple_from_sql};
use burrow::storage::HeapFile;
use tempfile::tempdir;

struct Dataset {
    left_file: Arc<HeapFile>,
    right_file: Arc<HeapFile>,
    left_schema: TableSchema,
    right_schema: TableSchema,
    left_rows: usize,
    right_rows: usize,
}

fn build_dataset(
    dir: &std::path::Path,
    pool: &mut BufMgr,
    left_rows: usize,
    right_rows: usize,
) -> Dataset {
    let left_schema =
        TableSchema::from_sql("CREATE TABLE r (a CHAR(8) NOT NULL UNIQUE, b INT);").unwrap();
    let right_schema =
        TableSchema::from_sql("CREATE TABLE s (b INT UNIQUE NOT NULL, c VARCHAR(8));").unwrap();

    let left_path = dir.join("r.tbl");
    let right_path = dir.join("s.tbl");
    let mut catalog = Catalog::new("test");
    catalog.add_table(left_schema.clone(), left_path.display().to_string());
    catalog.add_table(right_schema.clone(), right_path.display().to_string());

    let left_file = Arc::new(HeapFile::create(&left_path).unwrap());
    let right_file = Arc::new(HeapFile::create(&right_path).unwrap());

    for i in 0..left_rows {
        let sql = format!("INSERT INTO r VALUES ('r{}', {});", i, i % right_rows);
        let tuple = tuple_from_sql(&sql, &catalog).unwrap();
        insert_tuple(&tuple, &left_file, pool);
    }
    for i in 0..right_rows {
        let sql = format!("INSERT INTO s VALUES ({}, 's{}');", i, i);
        let tuple = tuple_from_sql(&sql, &catalog).unwrap();
        insert_tuple(&tuple, &right_file, pool);
    }

    Dataset {
        left_file,
        right_file,
        left_schema,
        right_schema,
        left_rows,
        right_rows,
    }
}

/// The joined tuples this dataset must produce for its first `left_rows`
/// left rows, in no particular order.
fn expected_results(data: &Dataset, left_rows: usize) -> Vec<String> {
    (0..left_rows)
        .map(|i| {
            let b = i % data.right_rows;
            format!("result\tr{}\t{}\ts{}\t", i, b, b)
        })
        .collect()
}

fn collect_results(file: &HeapFile) -> Vec<String> {
    let mut records = Vec::new();
    for page in file.iter() {
        records.extend(page.unwrap().records().map(|r| r.into_owned()));
    }
    records
}

fn assert_same_tuples(mut actual: Vec<String>, mut expected: Vec<String>) {
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}

#[test]
fn test_one_pass_join_produces_every_match() {
    let dir = tempdir().unwrap();
    let mut pool = BufMgr::new(256);
    let data = build_dataset(dir.path(), &mut pool, 500, 100);

    let result_file = Arc::new(HeapFile::create(dir.path().join("opj.tbl")).unwrap());
    let mut join = OnePassJoin::new(
        Arc::clone(&data.left_file),
        Arc::clone(&data.right_file),
        data.left_schema.clone(),
        data.right_schema.clone(),
    );
    assert!(join.execute(100, &result_file, &mut pool).unwrap());

    let results = collect_results(&result_file);
    assert_eq!(results.len(), 500);
    assert_same_tuples(results, expected_results(&data, data.left_rows));

    // Record-granular counters: one per record visited in each phase.
    assert_eq!(join.stats().num_result_tuples, 500);
    assert_eq!(join.stats().num_ios, 600);
    assert_eq!(join.stats().num_used_buf_pages, 600);
}

#[test]
fn test_one_pass_join_does_not_rerun_once_complete() {
    let dir = tempdir().unwrap();
    let mut pool = BufMgr::new(64);
    let data = build_dataset(dir.path(), &mut pool, 10, 10);

    let result_file = Arc::new(HeapFile::create(dir.path().join("opj.tbl")).unwrap());
    let mut join = OnePassJoin::new(
        Arc::clone(&data.left_file),
        Arc::clone(&data.right_file),
        data.left_schema.clone(),
        data.right_schema.clone(),
    );
    assert!(join.execute(100, &result_file, &mut pool).unwrap());
    let pages_after_first = result_file.page_count();
    let stats_after_first = *join.stats();

    assert!(join.execute(100, &result_file, &mut pool).unwrap());
    assert_eq!(result_file.page_count(), pages_after_first);
    assert_eq!(*join.stats(), stats_after_first);
}

#[test]
fn test_nested_loop_join_matches_one_pass_at_block_multiples() {
    let dir = tempdir().unwrap();
    let mut pool = BufMgr::new(256);
    let data = build_dataset(dir.path(), &mut pool, 500, 100);

    let opj_file = Arc::new(HeapFile::create(dir.path().join("opj.tbl")).unwrap());
    let mut one_pass = OnePassJoin::new(
        Arc::clone(&data.left_file),
        Arc::clone(&data.right_file),
        data.left_schema.clone(),
        data.right_schema.clone(),
    );
    one_pass.execute(100, &opj_file, &mut pool).unwrap();

    let nlj_file = Arc::new(HeapFile::create(dir.path().join("nlj.tbl")).unwrap());
    let mut nested = BlockNestedLoopJoin::new(
        Arc::clone(&data.left_file),
        Arc::clone(&data.right_file),
        data.left_schema.clone(),
        data.right_schema.clone(),
    );
    assert!(nested.execute(10, &nlj_file, &mut pool).unwrap());

    // 500 left rows are a multiple of the 50-record block size, so both
    // operators produce the same tuples up to order.
    assert_same_tuples(collect_results(&nlj_file), collect_results(&opj_file));

    assert_eq!(nested.stats().num_result_tuples, 500);
    // 10 block probes over 100 right records, plus one per block boundary.
    assert_eq!(nested.stats().num_ios, 1010);
    assert_eq!(nested.stats().num_used_buf_pages, 51);
}

#[test]
fn test_nested_loop_join_never_probes_the_final_partial_block() {
    let dir = tempdir().unwrap();
    let mut pool = BufMgr::new(256);
    let data = build_dataset(dir.path(), &mut pool, 120, 100);

    let nlj_file = Arc::new(HeapFile::create(dir.path().join("nlj.tbl")).unwrap());
    let mut nested = BlockNestedLoopJoin::new(
        Arc::clone(&data.left_file),
        Arc::clone(&data.right_file),
        data.left_schema.clone(),
        data.right_schema.clone(),
    );
    assert!(nested.execute(10, &nlj_file, &mut pool).unwrap());

    // Only the two full blocks (left rows 0..100) are joined; the trailing
    // 20 rows never reach a probe.
    let results = collect_results(&nlj_file);
    assert_eq!(results.len(), 100);
    assert_same_tuples(results, expected_results(&data, 100));
    assert_eq!(nested.stats().num_ios, 202);
}

#[test]
fn test_result_schema_is_projected_once_per_operator() {
    let dir = tempdir().unwrap();
    let mut pool = BufMgr::new(64);
    let data = build_dataset(dir.path(), &mut pool, 10, 10);

    let join = OnePassJoin::new(
        Arc::clone(&data.left_file),
        Arc::clone(&data.right_file),
        data.left_schema.clone(),
        data.right_schema.clone(),
    );
    let schema = join.result_table_schema();
    assert_eq!(schema.table_name(), "TEMP_TABLE");
    assert!(schema.is_temp());
    let names: Vec<&str> = schema.attrs().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

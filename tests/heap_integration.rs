//! Integration tests for tuple-level heap access.

use std::sync::Arc;

use burrow::buffer::BufMgr;
use burrow::catalog::{Catalog, TableSchema};
use burrow::heap::{delete_tuple, insert_tuple, tuple_from_sql};
use burrow::storage::HeapFile;
use tempfile::tempdir;

fn catalog_with_r(filename: &str) -> Catalog {
    let mut catalog = Catalog::new("test");
    let schema = TableSchema::from_sql("CREATE TABLE r (a CHAR(8) NOT NULL UNIQUE, b INT);").unwrap();
    catalog.add_table(schema, filename);
    catalog
}

fn all_records(file: &HeapFile) -> Vec<String> {
    let mut records = Vec::new();
    for page in file.iter() {
        records.extend(page.unwrap().records().map(|r| r.into_owned()));
    }
    records
}

#[test]
fn test_each_tuple_occupies_its_own_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("r.tbl");
    let catalog = catalog_with_r(&path.display().to_string());
    let file = Arc::new(HeapFile::create(&path).unwrap());
    let mut pool = BufMgr::new(16);

    for i in 0..3 {
        let sql = format!("INSERT INTO r VALUES ('r{}', {});", i, i);
        let tuple = tuple_from_sql(&sql, &catalog).unwrap();
        let rid = insert_tuple(&tuple, &file, &mut pool);
        assert_eq!(rid.page_number, i);
        assert_eq!(rid.slot_number, 0);
    }

    // One fresh page per tuple, exactly one record on each.
    assert_eq!(file.page_count(), 3);
    for page in file.iter() {
        assert_eq!(page.unwrap().records().count(), 1);
    }
    assert_eq!(all_records(&file), vec!["r\tr0\t0", "r\tr1\t1", "r\tr2\t2"]);
}

#[test]
fn test_inserts_reach_disk_without_explicit_flush() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("r.tbl");
    let catalog = catalog_with_r(&path.display().to_string());

    {
        let file = Arc::new(HeapFile::create(&path).unwrap());
        let mut pool = BufMgr::new(4);
        let tuple = tuple_from_sql("INSERT INTO r VALUES ('r9', 9);", &catalog).unwrap();
        insert_tuple(&tuple, &file, &mut pool);
        // The pool is dropped without a teardown flush; insert_tuple's own
        // per-file flush already persisted the page.
    }

    let reopened = HeapFile::open(&path).unwrap();
    assert_eq!(all_records(&reopened), vec!["r\tr9\t9"]);
}

#[test]
fn test_delete_tuple_removes_the_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("r.tbl");
    let catalog = catalog_with_r(&path.display().to_string());
    let file = Arc::new(HeapFile::create(&path).unwrap());
    let mut pool = BufMgr::new(16);

    let mut rids = Vec::new();
    for i in 0..3 {
        let sql = format!("INSERT INTO r VALUES ('r{}', {});", i, i);
        let tuple = tuple_from_sql(&sql, &catalog).unwrap();
        rids.push(insert_tuple(&tuple, &file, &mut pool));
    }

    delete_tuple(rids[1], &file, &mut pool);
    assert_eq!(all_records(&file), vec!["r\tr0\t0", "r\tr2\t2"]);

    // Deleting the same tuple again is reported, not fatal.
    delete_tuple(rids[1], &file, &mut pool);
    assert_eq!(all_records(&file), vec!["r\tr0\t0", "r\tr2\t2"]);
}

//! Lab driver: populate two tables and join them both ways.

use std::sync::Arc;

use burrow::buffer::BufMgr;
use burrow::catalog::{Catalog, TableSchema};
use burrow::executor::{BlockNestedLoopJoin, OnePassJoin};
use burrow::heap::scanner::TableScanner;
use burrow::heap::{insert_tuple, tuple_from_sql};
use burrow::storage::{HeapFile, StorageError};

const POOL_SIZE: usize = 256;
const LEFT_TABLE_ROWS: usize = 500;
const RIGHT_TABLE_ROWS: usize = 100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut pool = BufMgr::new(POOL_SIZE);
    let mut catalog = Catalog::new("lab3");

    create_database(&mut pool, &mut catalog)?;

    println!("Running one-pass join ...");
    run_one_pass_join(&mut pool, &catalog)?;

    println!("Running nested-loop join ...");
    run_nested_loop_join(&mut pool, &catalog)?;

    pool.flush_all()?;
    println!("Done");
    Ok(())
}

/// Removes a stale file from a previous run, if any.
fn remove_if_present(name: &str) -> Result<(), StorageError> {
    match HeapFile::remove(name) {
        Ok(()) | Err(StorageError::FileNotFound(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

fn create_database(
    pool: &mut BufMgr,
    catalog: &mut Catalog,
) -> Result<(), Box<dyn std::error::Error>> {
    let left_schema =
        TableSchema::from_sql("CREATE TABLE r (a CHAR(8) NOT NULL UNIQUE, b INT);")?;
    let right_schema =
        TableSchema::from_sql("CREATE TABLE s (b INT UNIQUE NOT NULL, c VARCHAR(8));")?;
    print!("{}", left_schema);
    print!("{}", right_schema);

    remove_if_present("r.tbl")?;
    remove_if_present("s.tbl")?;
    let left_file = Arc::new(HeapFile::create("r.tbl")?);
    let right_file = Arc::new(HeapFile::create("s.tbl")?);

    catalog.add_table(left_schema, "r.tbl");
    catalog.add_table(right_schema, "s.tbl");

    println!("creating tuples for {}...", left_file.filename());
    for i in 0..LEFT_TABLE_ROWS {
        if i % (LEFT_TABLE_ROWS / 10) == 0 {
            println!("{}%...", i / (LEFT_TABLE_ROWS / 100));
        }
        let sql = format!("INSERT INTO r VALUES ('r{}', {});", i, i % RIGHT_TABLE_ROWS);
        let tuple = tuple_from_sql(&sql, catalog)?;
        insert_tuple(&tuple, &left_file, pool);
    }

    println!("creating tuples for {}...", right_file.filename());
    for i in 0..RIGHT_TABLE_ROWS {
        if i % (RIGHT_TABLE_ROWS / 10) == 0 {
            println!("{}%...", i / (RIGHT_TABLE_ROWS / 100));
        }
        let sql = format!("INSERT INTO s VALUES ({}, 's{}');", i, i);
        let tuple = tuple_from_sql(&sql, catalog)?;
        insert_tuple(&tuple, &right_file, pool);
    }

    Ok(())
}

fn run_one_pass_join(
    pool: &mut BufMgr,
    catalog: &Catalog,
) -> Result<(), Box<dyn std::error::Error>> {
    let left_id = catalog.table_id("r")?;
    let right_id = catalog.table_id("s")?;
    let left_schema = catalog.table_schema(left_id)?.clone();
    let right_schema = catalog.table_schema(right_id)?.clone();

    let left_file = Arc::new(HeapFile::open(catalog.table_filename(left_id)?)?);
    let right_file = Arc::new(HeapFile::open(catalog.table_filename(right_id)?)?);

    let result_name = format!(
        "{}_OPJ_{}.tbl",
        left_schema.table_name(),
        right_schema.table_name()
    );
    remove_if_present(&result_name)?;
    let result_file = Arc::new(HeapFile::create(&result_name)?);

    let mut join = OnePassJoin::new(left_file, right_file, left_schema, right_schema);
    join.execute(100, &result_file, pool)?;
    join.stats().print_running();

    TableScanner::new(result_file).print()?;
    Ok(())
}

fn run_nested_loop_join(
    pool: &mut BufMgr,
    catalog: &Catalog,
) -> Result<(), Box<dyn std::error::Error>> {
    let left_id = catalog.table_id("r")?;
    let right_id = catalog.table_id("s")?;
    let left_schema = catalog.table_schema(left_id)?.clone();
    let right_schema = catalog.table_schema(right_id)?.clone();

    let left_file = Arc::new(HeapFile::open(catalog.table_filename(left_id)?)?);
    let right_file = Arc::new(HeapFile::open(catalog.table_filename(right_id)?)?);

    let result_name = format!(
        "{}_NLJ_{}.tbl",
        left_schema.table_name(),
        right_schema.table_name()
    );
    remove_if_present(&result_name)?;
    let result_file = Arc::new(HeapFile::create(&result_name)?);

    let mut join = BlockNestedLoopJoin::new(left_file, right_file, left_schema, right_schema);
    join.execute(10, &result_file, pool)?;
    join.stats().print_running();

    TableScanner::new(result_file).print()?;
    Ok(())
}

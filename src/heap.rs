//! Tuple-level access to heap files through the buffer pool.
//!
//! A tuple's on-wire form is a tab-separated string
//! `"tableName\tv1\tv2\t…"`; pages store these strings verbatim.
//!
//! Insertion and deletion are free functions rather than methods on some
//! manager struct: the operations are stateless, each one runs a complete
//! alloc/modify/unpin/flush cycle against the pool. Every insert allocates
//! a fresh page, so each tuple occupies a page of its own; downstream page
//! and buffer statistics depend on that allocation pattern.

use std::sync::Arc;

use crate::buffer::{BufMgr, BufferError};
use crate::catalog::{Catalog, CatalogError};
use crate::sql::{self, SqlError};
use crate::storage::{HeapFile, RecordId};

pub mod scanner;

/// Errors raised while composing tuples from SQL.
#[derive(Debug)]
pub enum HeapError {
    Sql(SqlError),
    Catalog(CatalogError),
}

impl std::fmt::Display for HeapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeapError::Sql(e) => write!(f, "{}", e),
            HeapError::Catalog(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HeapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeapError::Sql(e) => Some(e),
            HeapError::Catalog(e) => Some(e),
        }
    }
}

impl From<SqlError> for HeapError {
    fn from(e: SqlError) -> Self {
        HeapError::Sql(e)
    }
}

impl From<CatalogError> for HeapError {
    fn from(e: CatalogError) -> Self {
        HeapError::Catalog(e)
    }
}

/// Composes a tuple string from an `INSERT INTO … VALUES` statement.
///
/// The table must exist in the catalog; the values are not type-checked
/// against its schema.
pub fn tuple_from_sql(statement: &str, catalog: &Catalog) -> Result<String, HeapError> {
    let stmt = sql::parse_insert(statement)?;
    catalog.table_id(&stmt.table_name)?;

    let mut tuple = stmt.table_name;
    for value in &stmt.values {
        tuple.push('\t');
        tuple.push_str(value);
    }
    Ok(tuple)
}

/// Inserts a tuple into a heap file, one fresh page per tuple.
///
/// Pool errors are reported as a single diagnostic line and swallowed; the
/// returned id is the default value in that case. Callers looping over bulk
/// inserts keep going past an individual failure.
pub fn insert_tuple(tuple: &str, file: &Arc<HeapFile>, pool: &mut BufMgr) -> RecordId {
    match try_insert(tuple, file, pool) {
        Ok(rid) => rid,
        Err(e) => {
            log::warn!("tuple insert into {} failed: {}", file.filename(), e);
            RecordId::default()
        }
    }
}

fn try_insert(
    tuple: &str,
    file: &Arc<HeapFile>,
    pool: &mut BufMgr,
) -> Result<RecordId, BufferError> {
    let (page_no, page) = pool.alloc_page(file)?;
    let rid = page.insert_record(tuple)?;
    pool.unpin_page(file, page_no, true)?;
    pool.flush_file(file)?;
    Ok(rid)
}

/// Deletes a tuple by record id.
///
/// Same diagnostic contract as [`insert_tuple`]: pool errors are logged
/// and swallowed.
pub fn delete_tuple(rid: RecordId, file: &Arc<HeapFile>, pool: &mut BufMgr) {
    if let Err(e) = try_delete(rid, file, pool) {
        log::warn!("tuple delete from {} failed: {}", file.filename(), e);
    }
}

fn try_delete(rid: RecordId, file: &Arc<HeapFile>, pool: &mut BufMgr) -> Result<(), BufferError> {
    let page = pool.read_page(file, rid.page_number)?;
    page.delete_record(rid)?;
    pool.unpin_page(file, rid.page_number, true)?;
    pool.flush_file(file)?;
    Ok(())
}

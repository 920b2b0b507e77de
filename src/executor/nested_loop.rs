//! Block nested-loop join.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::ExecutorError;
use super::join::{self, join_key, join_records, split_tuple, JoinColumns};
use super::JoinStats;
use crate::buffer::BufMgr;
use crate::catalog::TableSchema;
use crate::storage::HeapFile;

/// Number of left records buffered per block.
pub const BLOCK_SIZE: usize = 50;

/// Nested-loop join that buffers blocks of the left input.
///
/// Left records accumulate into an in-memory multimap; each time the count
/// reaches a multiple of [`BLOCK_SIZE`], the entire right input is scanned
/// once against the block, matches are written to a fresh result page, and
/// the block is discarded.
///
/// Left records in a final, incomplete block are never probed and produce
/// no output. That is this operator's observable behavior; inputs whose
/// left row count is a multiple of the block size join completely.
pub struct BlockNestedLoopJoin {
    left_file: Arc<HeapFile>,
    right_file: Arc<HeapFile>,
    left_schema: TableSchema,
    right_schema: TableSchema,
    result_schema: TableSchema,
    stats: JoinStats,
    complete: bool,
}

impl BlockNestedLoopJoin {
    pub fn new(
        left_file: Arc<HeapFile>,
        right_file: Arc<HeapFile>,
        left_schema: TableSchema,
        right_schema: TableSchema,
    ) -> Self {
        let result_schema = join::result_schema(&left_schema, &right_schema);
        Self {
            left_file,
            right_file,
            left_schema,
            right_schema,
            result_schema,
            stats: JoinStats::default(),
            complete: false,
        }
    }

    /// Schema of the joined output.
    pub fn result_table_schema(&self) -> &TableSchema {
        &self.result_schema
    }

    /// Statistics of the last execution.
    pub fn stats(&self) -> &JoinStats {
        &self.stats
    }

    /// Runs the join, writing joined tuples into `result_file`.
    ///
    /// Returns `Ok(true)` on completion; a completed operator returns
    /// immediately without re-executing. `num_ios` counts one per right
    /// record visited plus one per block boundary crossed;
    /// `num_used_buf_pages` reports the block size plus the result page.
    pub fn execute(
        &mut self,
        _available_buf_pages: usize,
        result_file: &Arc<HeapFile>,
        pool: &mut BufMgr,
    ) -> Result<bool, ExecutorError> {
        println!("... executing nested-loop join");
        if self.complete {
            return Ok(true);
        }

        print!("{}", self.result_schema);
        self.stats = JoinStats::default();
        let columns = JoinColumns::resolve(&self.left_schema, &self.right_schema, &self.result_schema);
        log::debug!(
            "joining on {:?} (left {:?}, right {:?}, result {:?})",
            columns.names,
            columns.left,
            columns.right,
            columns.result
        );

        let left_file = Arc::clone(&self.left_file);
        let right_file = Arc::clone(&self.right_file);

        let mut table: HashMap<String, Vec<String>> = HashMap::new();
        let mut buffered = 0usize;

        for left_page in left_file.iter() {
            let left_page = left_page?;
            for record in left_page.records() {
                let record = record.into_owned();
                let key = join_key(&split_tuple(&record), &columns.left);
                table.entry(key).or_default().push(record);
                buffered += 1;
                if buffered % BLOCK_SIZE != 0 {
                    continue;
                }

                // A full block is buffered: scan the right input once
                // against it and emit every match into a fresh result page.
                self.stats.num_ios += 1;
                log::debug!("probing with block ending at left record {}", buffered);
                let (result_page_no, result_page) = pool.alloc_page(result_file)?;
                for right_page in right_file.iter() {
                    let right_page = right_page?;
                    for right_record in right_page.records() {
                        let tokens = split_tuple(&right_record);
                        let key = join_key(&tokens, &columns.right);
                        if let Some(matches) = table.get(&key) {
                            for left_record in matches {
                                let joined = join_records(left_record, &tokens, &columns.right);
                                result_page.insert_record(&format!("result\t{}", joined))?;
                                self.stats.num_result_tuples += 1;
                            }
                        }
                        self.stats.num_ios += 1;
                    }
                }
                pool.unpin_page(result_file, result_page_no, true)?;
                pool.flush_file(result_file)?;
                table.clear();
            }
        }

        self.stats.num_used_buf_pages = (BLOCK_SIZE + 1) as u64;
        self.complete = true;
        Ok(true)
    }
}

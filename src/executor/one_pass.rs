//! One-pass hash join.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::ExecutorError;
use super::join::{self, join_key, join_records, split_tuple, JoinColumns};
use super::JoinStats;
use crate::buffer::BufMgr;
use crate::catalog::TableSchema;
use crate::storage::HeapFile;

/// Hash join that materializes the entire left input in memory.
///
/// The build phase loads every left record into a key → records multimap;
/// the probe phase streams the right input against it. The caller-supplied
/// buffer budget is informational only; this operator keeps the whole left
/// side in memory regardless.
///
/// One result page is allocated, unpinned dirty, and flushed per right
/// record visited, matched or not. That balloons the result file but is the
/// allocation pattern the running statistics describe, so it stays.
pub struct OnePassJoin {
    left_file: Arc<HeapFile>,
    right_file: Arc<HeapFile>,
    left_schema: TableSchema,
    right_schema: TableSchema,
    result_schema: TableSchema,
    stats: JoinStats,
    complete: bool,
}

impl OnePassJoin {
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
    /// immediately without re-executing. `num_ios` and `num_used_buf_pages`
    /// count one per record visited in each phase.
    pub fn execute(
        &mut self,
        _available_buf_pages: usize,
        result_file: &Arc<HeapFile>,
        pool: &mut BufMgr,
    ) -> Result<bool, ExecutorError> {
        println!("... executing one-pass join");
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

        // Build: materialize the left input keyed by its join values.
        let mut table: HashMap<String, Vec<String>> = HashMap::new();
        let left_file = Arc::clone(&self.left_file);
        for page in left_file.iter() {
            let page = page?;
            for record in page.records() {
                let record = record.into_owned();
                let key = join_key(&split_tuple(&record), &columns.left);
                table.entry(key).or_default().push(record);
                self.stats.num_ios += 1;
                self.stats.num_used_buf_pages += 1;
            }
        }

        // Probe: stream the right input against the multimap.
        let right_file = Arc::clone(&self.right_file);
        for page in right_file.iter() {
            let page = page?;
            for record in page.records() {
                let (result_page_no, result_page) = pool.alloc_page(result_file)?;
                let tokens = split_tuple(&record);
                let key = join_key(&tokens, &columns.right);
                if let Some(matches) = table.get(&key) {
                    for left_record in matches {
                        let joined = join_records(left_record, &tokens, &columns.right);
                        result_page.insert_record(&format!("result\t{}", joined))?;
                        self.stats.num_result_tuples += 1;
                    }
                }
                pool.unpin_page(result_file, result_page_no, true)?;
                pool.flush_file(result_file)?;
                self.stats.num_ios += 1;
                self.stats.num_used_buf_pages += 1;
            }
        }

        self.complete = true;
        Ok(true)
    }
}

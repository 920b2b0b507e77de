//! Full-table record dump.

use std::sync::Arc;

use crate::storage::{HeapFile, StorageError};

/// Scans every record of a heap file and prints it with its page number.
pub struct TableScanner {
    file: Arc<HeapFile>,
}

impl TableScanner {
    pub fn new(file: Arc<HeapFile>) -> Self {
        Self { file }
    }

    /// Prints all records to stdout in file order.
    pub fn print(&self) -> Result<(), StorageError> {
        println!("scanning file - {}", self.file.filename());
        for page in self.file.iter() {
            let page = page?;
            for record in page.records() {
                println!("record(page {}) - '{}'", page.page_number(), record);
            }
        }
        Ok(())
    }
}

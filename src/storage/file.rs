//! Disk-backed heap files.
//!
//! A heap file is an unordered sequence of fixed-size pages stored as
//! contiguous 8KB blocks:
//!
//! ```text
//! +------------------+------------------+------------------+
//! | Page 0 (8KB)     | Page 1 (8KB)     | Page 2 (8KB)     | ...
//! +------------------+------------------+------------------+
//! ^ offset 0         ^ offset 8192      ^ offset 16384
//! ```
//!
//! File identity throughout the buffer layer is the filename: two handles
//! opened on the same path denote the same file. All I/O is synchronous and
//! completes before the call returns; a mutex around the handle serializes
//! seeks and transfers between handles sharing one `HeapFile`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use super::error::StorageError;
use super::page::{Page, PageNumber, PAGE_SIZE};

/// A heap file of slotted pages.
pub struct HeapFile {
    path: PathBuf,
    filename: String,
    file: Mutex<File>,
    page_count: AtomicU32,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl HeapFile {
    /// Creates a new, empty heap file.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::FileExists`] if the path already exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::FileExists(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        log::debug!("created heap file {}", path.display());
        Ok(Self::from_parts(path, file, 0))
    }

    /// Opens an existing heap file.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::FileNotFound`] if the path does not exist,
    /// or [`StorageError::Corrupted`] if its size is not a whole number of
    /// pages.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let file_size = file.metadata()?.len();
        if file_size % PAGE_SIZE as u64 != 0 {
            return Err(StorageError::Corrupted(format!(
                "size of {} ({} bytes) is not a multiple of the page size",
                path.display(),
                file_size
            )));
        }

        let page_count = (file_size / PAGE_SIZE as u64) as u32;
        Ok(Self::from_parts(path, file, page_count))
    }

    /// Removes a heap file from disk.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::FileNotFound`] if the path does not exist.
    pub fn remove(path: impl AsRef<Path>) -> Result<(), StorageError> {
        let path = path.as_ref();
        match std::fs::remove_file(path) {
            Ok(()) => {
                log::debug!("removed heap file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn from_parts(path: PathBuf, file: File, page_count: u32) -> Self {
        Self {
            filename: path.display().to_string(),
            path,
            file: Mutex::new(file),
            page_count: AtomicU32::new(page_count),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// The name of this file, used as its identity by the buffer layer.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Path this file was created or opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the file, deleted pages included.
    pub fn page_count(&self) -> u32 {
        self.page_count.load(Ordering::Acquire)
    }

    /// Number of pages read from disk so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of pages written back to disk so far (allocations excluded).
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Appends a fresh page to the file and returns its in-memory image.
    pub fn allocate_page(&self) -> Result<Page, StorageError> {
        let mut file = self.file.lock().expect("file handle poisoned");

        let page_number = self.page_count.load(Ordering::Acquire);
        let page = Page::new(page_number);

        file.seek(SeekFrom::Start(page_number as u64 * PAGE_SIZE as u64))?;
        file.write_all(page.as_bytes())?;

        self.page_count.store(page_number + 1, Ordering::Release);
        Ok(page)
    }

    /// Reads a page from disk.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::InvalidPage`] for out-of-range or deleted
    /// pages.
    pub fn read_page(&self, page_number: PageNumber) -> Result<Page, StorageError> {
        if page_number >= self.page_count() {
            return Err(StorageError::InvalidPage(page_number));
        }

        let mut buf = [0u8; PAGE_SIZE];
        {
            let mut file = self.file.lock().expect("file handle poisoned");
            file.seek(SeekFrom::Start(page_number as u64 * PAGE_SIZE as u64))?;
            file.read_exact(&mut buf)?;
        }
        self.reads.fetch_add(1, Ordering::Relaxed);

        let page = Page::from_bytes(&buf);
        if page.is_unused() {
            return Err(StorageError::InvalidPage(page_number));
        }
        if page.page_number() != page_number {
            return Err(StorageError::Corrupted(format!(
                "page {} of {} carries page number {}",
                page_number,
                self.filename,
                page.page_number()
            )));
        }
        Ok(page)
    }

    /// Writes a page image back to its slot in the file.
    pub fn write_page(&self, page: &Page) -> Result<(), StorageError> {
        let page_number = page.page_number();
        if page_number >= self.page_count() {
            return Err(StorageError::InvalidPage(page_number));
        }

        let mut file = self.file.lock().expect("file handle poisoned");
        file.seek(SeekFrom::Start(page_number as u64 * PAGE_SIZE as u64))?;
        file.write_all(page.as_bytes())?;

        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Marks a page as unused on disk. Its number is not reused.
    pub fn delete_page(&self, page_number: PageNumber) -> Result<(), StorageError> {
        if page_number >= self.page_count() {
            return Err(StorageError::InvalidPage(page_number));
        }

        let unused = Page::default();
        let mut file = self.file.lock().expect("file handle poisoned");
        file.seek(SeekFrom::Start(page_number as u64 * PAGE_SIZE as u64))?;
        file.write_all(unused.as_bytes())?;
        Ok(())
    }

    /// Iterates over the live pages of this file in file order.
    pub fn iter(&self) -> FileIter<'_> {
        FileIter {
            file: self,
            next_page: 0,
        }
    }
}

/// In-order page iterator over a heap file. Deleted pages are skipped.
pub struct FileIter<'a> {
    file: &'a HeapFile,
    next_page: PageNumber,
}

impl Iterator for FileIter<'_> {
    type Item = Result<Page, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_page < self.file.page_count() {
            let page_number = self.next_page;
            self.next_page += 1;
            match self.file.read_page(page_number) {
                Ok(page) => return Some(Ok(page)),
                Err(StorageError::InvalidPage(_)) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_open_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.tbl");

        let file = HeapFile::create(&path).unwrap();
        assert_eq!(file.page_count(), 0);
        assert!(matches!(
            HeapFile::create(&path),
            Err(StorageError::FileExists(_))
        ));
        drop(file);

        let file = HeapFile::open(&path).unwrap();
        assert_eq!(file.page_count(), 0);
        drop(file);

        HeapFile::remove(&path).unwrap();
        assert!(matches!(
            HeapFile::remove(&path),
            Err(StorageError::FileNotFound(_))
        ));
        assert!(matches!(
            HeapFile::open(&path),
            Err(StorageError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_allocate_write_read_round_trip() {
        let dir = tempdir().unwrap();
        let file = HeapFile::create(dir.path().join("t.tbl")).unwrap();

        let mut page = file.allocate_page().unwrap();
        assert_eq!(page.page_number(), 0);
        assert_eq!(file.page_count(), 1);

        page.insert_record("t\thello\t1").unwrap();
        file.write_page(&page).unwrap();

        let read_back = file.read_page(0).unwrap();
        assert_eq!(read_back.records().next().unwrap(), "t\thello\t1");
        assert_eq!(file.write_count(), 1);
    }

    #[test]
    fn test_read_out_of_range_is_invalid() {
        let dir = tempdir().unwrap();
        let file = HeapFile::create(dir.path().join("t.tbl")).unwrap();
        assert!(matches!(
            file.read_page(0),
            Err(StorageError::InvalidPage(0))
        ));
    }

    #[test]
    fn test_iteration_skips_deleted_pages() {
        let dir = tempdir().unwrap();
        let file = HeapFile::create(dir.path().join("t.tbl")).unwrap();

        for i in 0..3u32 {
            let mut page = file.allocate_page().unwrap();
            page.insert_record(&format!("t\trow{}", i)).unwrap();
            file.write_page(&page).unwrap();
        }
        file.delete_page(1).unwrap();

        let mut seen = Vec::new();
        for page in file.iter() {
            seen.push(page.unwrap().page_number());
        }
        assert_eq!(seen, vec![0, 2]);

        assert!(matches!(
            file.read_page(1),
            Err(StorageError::InvalidPage(1))
        ));
    }

    #[test]
    fn test_open_rejects_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.tbl");
        std::fs::write(&path, vec![0u8; 100]).unwrap();
        assert!(matches!(
            HeapFile::open(&path),
            Err(StorageError::Corrupted(_))
        ));
    }

    #[test]
    fn test_persistence_across_handles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.tbl");

        {
            let file = HeapFile::create(&path).unwrap();
            let mut page = file.allocate_page().unwrap();
            page.insert_record("t\tpersisted").unwrap();
            file.write_page(&page).unwrap();
        }

        let file = HeapFile::open(&path).unwrap();
        assert_eq!(file.page_count(), 1);
        let page = file.read_page(0).unwrap();
        assert_eq!(page.records().next().unwrap(), "t\tpersisted");
    }
}

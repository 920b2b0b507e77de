//! Buffer pool manager with clock-sweep replacement.

use std::sync::{Arc, Weak};

use super::error::BufferError;
use super::frame::{FrameDesc, FrameId};
use super::frame_table::FrameTable;
use crate::storage::{HeapFile, Page, PageNumber};

/// The buffer pool manager: a fixed-size cache of disk pages.
///
/// # Architecture
///
/// ```text
/// +-------------------+
/// |  Join Operators   |
/// |  Heap Access      |
/// +-------------------+
///          |
///          v
/// +-------------------+     +----------------------+
/// |      BufMgr       |---->| FrameTable           |
/// | read/alloc/unpin/ |     | (file,page)->FrameId |
/// | flush/dispose     |     +----------------------+
/// +-------------------+
///     |           |
///     v           v
/// +---------+ +----------+
/// | frames  | | images   |
/// | [desc]  | | [Page]   |
/// +---------+ +----------+
///          |
///          v
/// +-------------------+
/// |     HeapFile      |
/// +-------------------+
/// ```
///
/// Descriptors (`frames`) and page images (`images`) are parallel arrays
/// indexed by [`FrameId`]; both are allocated once at construction.
///
/// # Pin discipline
///
/// Every successful [`read_page`](BufMgr::read_page) or
/// [`alloc_page`](BufMgr::alloc_page) pins the page; the caller must pair it
/// with an [`unpin_page`](BufMgr::unpin_page), declaring at that point
/// whether it wrote to the image. Pinned frames are never evicted; if the
/// sweep finds nothing but pinned frames it fails with
/// [`BufferError::BufferExceeded`] after exactly one full pass.
///
/// # Replacement
///
/// Clock sweep with a second-chance reference bit. The hand starts at the
/// last frame so the first sweep begins at frame 0. On each step the sweep
/// takes an invalid frame immediately; otherwise it clears a set reference
/// bit and moves on, skips (and counts) pinned frames, and evicts the first
/// unpinned frame with a clear reference bit, writing its image back first
/// when dirty.
///
/// # Threading
///
/// The pool is single-threaded mutable state: all methods take `&mut self`,
/// never suspend, and complete in program order before returning. Files are
/// referenced weakly; a file handle must outlive every page cached from it.
pub struct BufMgr {
    frames: Vec<FrameDesc>,
    images: Vec<Page>,
    frame_table: FrameTable,
    clock_hand: usize,
    pool_size: usize,
}

impl BufMgr {
    /// Creates a pool with `pool_size` frames.
    ///
    /// # Panics
    ///
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames: Vec<_> = (0..pool_size).map(FrameDesc::new).collect();
        let images: Vec<_> = (0..pool_size).map(|_| Page::default()).collect();

        Self {
            frames,
            images,
            frame_table: FrameTable::new(pool_size),
            // The hand points at the last frame so the first advance lands
            // on frame 0.
            clock_hand: pool_size - 1,
            pool_size,
        }
    }

    /// Number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Frame currently caching the given page, if any.
    pub fn frame_of(&self, file: &HeapFile, page_no: PageNumber) -> Option<FrameId> {
        self.frame_table.lookup(file.filename(), page_no)
    }

    /// Fetches a page into the pool and pins it.
    ///
    /// On a hit the reference bit is set and the pin count incremented; on a
    /// miss a frame is freed by the clock sweep, the page is read from the
    /// file, and the frame is seated with a pin count of 1. The returned
    /// reference is the pooled image; writes to it must be declared via
    /// `unpin_page(.., dirty = true)`.
    ///
    /// # Errors
    ///
    /// - [`BufferError::BufferExceeded`] when every frame is pinned
    /// - [`BufferError::Storage`] when the file rejects the read
    pub fn read_page(
        &mut self,
        file: &Arc<HeapFile>,
        page_no: PageNumber,
    ) -> Result<&mut Page, BufferError> {
        if let Some(frame_no) = self.frame_table.lookup(file.filename(), page_no) {
            let frame = &mut self.frames[frame_no];
            frame.ref_bit = true;
            frame.pin_count += 1;
            return Ok(&mut self.images[frame_no]);
        }

        let frame_no = self.alloc_frame()?;
        let page = file.read_page(page_no)?;
        self.frame_table.insert(file.filename(), page_no, frame_no);
        self.frames[frame_no].seat(Arc::downgrade(file), page_no);
        self.images[frame_no] = page;
        Ok(&mut self.images[frame_no])
    }

    /// Allocates a fresh page in the file and seats it pinned in the pool.
    ///
    /// Returns the new page's number along with the pooled image.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`read_page`](BufMgr::read_page). Note that the
    /// file has already grown by one page when the sweep fails.
    pub fn alloc_page(
        &mut self,
        file: &Arc<HeapFile>,
    ) -> Result<(PageNumber, &mut Page), BufferError> {
        let page = file.allocate_page()?;
        let page_no = page.page_number();

        let frame_no = self.alloc_frame()?;
        self.frame_table.insert(file.filename(), page_no, frame_no);
        self.frames[frame_no].seat(Arc::downgrade(file), page_no);
        self.images[frame_no] = page;
        Ok((page_no, &mut self.images[frame_no]))
    }

    /// Unpins a page, optionally marking it dirty.
    ///
    /// The dirty flag is recorded before the pin count changes. Unpinning a
    /// page that is not cached succeeds silently.
    ///
    /// # Errors
    ///
    /// [`BufferError::PageNotPinned`] if the cached page's pin count is
    /// already 0.
    pub fn unpin_page(
        &mut self,
        file: &HeapFile,
        page_no: PageNumber,
        dirty: bool,
    ) -> Result<(), BufferError> {
        let Some(frame_no) = self.frame_table.lookup(file.filename(), page_no) else {
            return Ok(());
        };

        let frame = &mut self.frames[frame_no];
        if dirty {
            frame.dirty = true;
        }
        if frame.pin_count == 0 {
            return Err(BufferError::PageNotPinned {
                filename: file.filename().to_owned(),
                page_no,
                frame_no,
            });
        }
        frame.pin_count -= 1;
        Ok(())
    }

    /// Flushes every cached page of a file and drops it from the pool.
    ///
    /// Frames are visited in ascending index order. Per frame: write back if
    /// dirty (clearing the dirty flag), remove the table entry, clear the
    /// descriptor.
    ///
    /// # Errors
    ///
    /// - [`BufferError::PagePinned`] if any matching frame is still pinned
    /// - [`BufferError::BadBuffer`] if a matching frame is invalid, which
    ///   the descriptor invariants rule out: an invalid frame has no file
    ///   association, so the filename comparison below can never reach one
    ///   unless the table is corrupted
    pub fn flush_file(&mut self, file: &HeapFile) -> Result<(), BufferError> {
        for frame_no in 0..self.pool_size {
            let Some(weak) = self.frames[frame_no].file.clone() else {
                continue;
            };
            let owner = weak
                .upgrade()
                .expect("file handle dropped while its pages are still cached");
            if owner.filename() != file.filename() {
                continue;
            }

            let frame = &self.frames[frame_no];
            if !frame.valid {
                return Err(BufferError::BadBuffer {
                    frame_no,
                    dirty: frame.dirty,
                    valid: false,
                    ref_bit: frame.ref_bit,
                });
            }
            if frame.pin_count > 0 {
                return Err(BufferError::PagePinned {
                    filename: owner.filename().to_owned(),
                    page_no: frame.page_no,
                    frame_no,
                });
            }

            if self.frames[frame_no].dirty {
                owner.write_page(&self.images[frame_no])?;
                self.frames[frame_no].dirty = false;
            }
            let page_no = self.frames[frame_no].page_no;
            self.frame_table.remove(owner.filename(), page_no);
            self.frames[frame_no].clear();
        }
        Ok(())
    }

    /// Deletes a page, evicting it from the pool first if cached.
    ///
    /// The cached image is discarded without writeback; the file is then
    /// told to delete the page on disk.
    pub fn dispose_page(
        &mut self,
        file: &Arc<HeapFile>,
        page_no: PageNumber,
    ) -> Result<(), BufferError> {
        if let Some(frame_no) = self.frame_table.lookup(file.filename(), page_no) {
            self.frames[frame_no].clear();
            self.frame_table.remove(file.filename(), page_no);
        }
        file.delete_page(page_no)?;
        Ok(())
    }

    /// Writes back every dirty frame without evicting anything.
    ///
    /// Teardown hook: callers run this before dropping the pool so that all
    /// modifications reach disk.
    pub fn flush_all(&mut self) -> Result<(), BufferError> {
        for frame_no in 0..self.pool_size {
            if !self.frames[frame_no].valid || !self.frames[frame_no].dirty {
                continue;
            }
            let owner = self.frames[frame_no]
                .file
                .as_ref()
                .and_then(Weak::upgrade)
                .expect("file handle dropped while its pages are still cached");
            owner.write_page(&self.images[frame_no])?;
            self.frames[frame_no].dirty = false;
        }
        Ok(())
    }

    /// Logs the state of every valid frame at debug level.
    pub fn dump(&self) {
        let mut valid_frames = 0;
        for frame in &self.frames {
            if !frame.valid {
                continue;
            }
            valid_frames += 1;
            let filename = frame
                .file
                .as_ref()
                .and_then(Weak::upgrade)
                .map(|f| f.filename().to_owned())
                .unwrap_or_else(|| "<dropped>".to_owned());
            log::debug!(
                "frame {}: page {} of {} pin_count={} dirty={} ref_bit={}",
                frame.frame_no,
                frame.page_no,
                filename,
                frame.pin_count,
                frame.dirty,
                frame.ref_bit
            );
        }
        log::debug!(
            "{} valid frames, {} table entries",
            valid_frames,
            self.frame_table.len()
        );
    }

    /// Frees a frame with the clock sweep, evicting its current page if any.
    ///
    /// A pinned frame is skipped but counted; once `pool_size` pinned frames
    /// have been skipped the sweep has proven that nothing is evictable and
    /// fails rather than spinning. A set reference bit buys the frame one
    /// more pass. Writeback of a dirty victim happens before its table entry
    /// is removed.
    fn alloc_frame(&mut self) -> Result<FrameId, BufferError> {
        let mut skipped_pinned = 0;
        loop {
            if skipped_pinned == self.pool_size {
                return Err(BufferError::BufferExceeded);
            }
            self.clock_hand = (self.clock_hand + 1) % self.pool_size;
            let hand = self.clock_hand;

            if self.frames[hand].valid {
                if self.frames[hand].ref_bit {
                    self.frames[hand].ref_bit = false;
                    continue;
                }
                if self.frames[hand].pin_count > 0 {
                    skipped_pinned += 1;
                    continue;
                }

                let page_no = self.frames[hand].page_no;
                let owner = self.frames[hand]
                    .file
                    .as_ref()
                    .and_then(Weak::upgrade)
                    .expect("file handle dropped while its pages are still cached");
                if self.frames[hand].dirty {
                    log::debug!(
                        "evicting dirty page {} of {} from frame {}",
                        page_no,
                        owner.filename(),
                        hand
                    );
                    owner.write_page(&self.images[hand])?;
                }
                self.frame_table.remove(owner.filename(), page_no);
                self.frames[hand].clear();
            }
            return Ok(hand);
        }
    }
}

//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between disk and memory
//! - Pin-based reference counting
//! - Dirty page write-back on eviction and flush
//! - Pluggable eviction policies

use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::buffer::frame::FrameDescriptor;
use crate::buffer::page_table::PageTable;
use crate::buffer::replacer::Replacer;
use crate::buffer::BufferPoolStats;
use crate::common::{BufferPoolConfig, Error, FrameId, PageId, Result};
use crate::storage::{DiskManager, Page};

/// How a missing page is brought into its frame by [`BufferPoolManager::pin`].
#[derive(Debug, Clone, Copy)]
pub enum PinMode<'a> {
    /// Read the page from disk.
    ReadFromDisk,
    /// Skip the disk read and fill the frame with these contents.
    ///
    /// For brand-new pages. Fails with `AlreadyResident` if the page is
    /// already in the pool.
    Initialize(&'a Page),
}

/// Manages a fixed pool of frames caching disk pages.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                         │
/// │  ┌──────────────┐  ┌────────────────────────────────────┐    │
/// │  │ page_table   │  │  descriptors: Vec<FrameDescriptor> │    │
/// │  │PageId → Fid  │─▶│  frames:      Box<[Page]>          │    │
/// │  └──────────────┘  └────────────────────────────────────┘    │
/// │  ┌──────────────────────┐      ┌───────────────────────┐     │
/// │  │ replacer             │      │ disk_manager: D       │     │
/// │  │ Box<dyn Replacer>    │      │ (injected)            │     │
/// │  └──────────────────────┘      └───────────────────────┘     │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// Every operation takes `&mut self`; the pool is meant for one caller at a
/// time. Wrap it in a `SharedBufferPool` to serve several threads.
///
/// # Usage
/// ```
/// use clockpool::storage::MemoryDiskManager;
/// use clockpool::{BufferPoolManager, Page, PinMode};
///
/// let mut bpm = BufferPoolManager::new(2, MemoryDiskManager::new());
///
/// // Allocate a new page; it comes back pinned
/// let pid = bpm.allocate(&Page::new(), 1).unwrap();
/// bpm.page_mut(pid).unwrap().as_mut_slice()[0] = 0xAB;
/// bpm.unpin(pid, true).unwrap();
///
/// // Pin it again to read it
/// let page = bpm.pin(pid, PinMode::ReadFromDisk).unwrap();
/// assert_eq!(page.as_slice()[0], 0xAB);
/// bpm.unpin(pid, false).unwrap();
/// ```
pub struct BufferPoolManager<D> {
    /// Page contents, one per frame.
    frames: Box<[Page]>,

    /// Frame metadata, same index as `frames`.
    descriptors: Vec<FrameDescriptor>,

    /// Maps resident page IDs to frame IDs.
    page_table: PageTable,

    /// Eviction policy for selecting victim frames.
    replacer: Box<dyn Replacer>,

    /// Handles all disk I/O.
    disk_manager: D,

    stats: BufferPoolStats,
}

impl<D: DiskManager> BufferPoolManager<D> {
    /// Create a pool of `pool_size` frames using the clock policy.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, disk_manager: D) -> Self {
        Self::with_config(BufferPoolConfig::new(pool_size), disk_manager)
    }

    /// Create a pool from a [`BufferPoolConfig`].
    ///
    /// # Panics
    /// Panics if `config.pool_size` is 0.
    pub fn with_config(config: BufferPoolConfig, disk_manager: D) -> Self {
        let replacer = config.policy.build(config.pool_size);
        Self::with_replacer(config.pool_size, disk_manager, replacer)
    }

    /// Create a pool with a caller-supplied replacement policy.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn with_replacer(pool_size: usize, disk_manager: D, replacer: Box<dyn Replacer>) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames: Box<[Page]> = (0..pool_size).map(|_| Page::new()).collect();
        let descriptors = (0..pool_size)
            .map(|i| FrameDescriptor::new(FrameId::new(i)))
            .collect();

        debug!(
            "buffer pool created: {} frames, {} replacer",
            pool_size,
            replacer.name()
        );

        Self {
            frames,
            descriptors,
            page_table: PageTable::with_capacity(pool_size),
            replacer,
            disk_manager,
            stats: BufferPoolStats::new(),
        }
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a page into the pool and expose its frame.
    ///
    /// A resident page just gains a holder and causes no I/O. Otherwise the
    /// replacer picks a victim frame, whose page is written back first if
    /// dirty, and the new page is read from disk or initialized per `mode`.
    /// A freshly loaded page starts clean with a pin count of one.
    ///
    /// # Errors
    /// - `Error::AlreadyResident` for `PinMode::Initialize` on a resident page
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - Disk errors from the write-back or the read
    ///
    /// A failed write-back leaves the victim resident and dirty. A failed
    /// read leaves the victim frame empty.
    pub fn pin(&mut self, page_id: PageId, mode: PinMode<'_>) -> Result<&mut Page> {
        if let Some(frame_id) = self.page_table.get(page_id) {
            if let PinMode::Initialize(_) = mode {
                return Err(Error::AlreadyResident(page_id));
            }

            let pins = self.descriptors[frame_id.0].pin();
            self.replacer.pin_page(frame_id);
            self.stats.cache_hits += 1;
            trace!("pin hit: {} in {} (pins={})", page_id, frame_id, pins);
            return Ok(&mut self.frames[frame_id.0]);
        }

        self.stats.cache_misses += 1;

        let frame_id = self
            .replacer
            .pick_victim(&mut self.descriptors)
            .ok_or(Error::PoolExhausted)?;
        self.evict(frame_id)?;

        let frame = &mut self.frames[frame_id.0];
        let loaded = match mode {
            PinMode::Initialize(contents) => {
                frame.copy_from(contents);
                Ok(())
            }
            PinMode::ReadFromDisk => self.disk_manager.read_page(page_id, frame),
        };
        if let Err(e) = loaded {
            self.replacer.free_page(frame_id);
            return Err(e);
        }
        if let PinMode::ReadFromDisk = mode {
            self.stats.pages_read += 1;
        }

        self.descriptors[frame_id.0].load(page_id);
        self.page_table.insert(page_id, frame_id);
        self.replacer.new_page(frame_id);
        trace!("pin miss: loaded {} into {}", page_id, frame_id);

        Ok(&mut self.frames[frame_id.0])
    }

    /// Release one hold on a page.
    ///
    /// `mark_dirty` only ever sets the dirty flag; passing `false` keeps a
    /// flag set by an earlier holder.
    ///
    /// # Errors
    /// - `Error::NotResident` if the page is not in the pool
    /// - `Error::NotPinned` if its pin count is already 0
    pub fn unpin(&mut self, page_id: PageId, mark_dirty: bool) -> Result<()> {
        let frame_id = self
            .page_table
            .get(page_id)
            .ok_or(Error::NotResident(page_id))?;

        let descriptor = &mut self.descriptors[frame_id.0];
        if !descriptor.is_pinned() {
            return Err(Error::NotPinned(page_id));
        }
        descriptor.unpin(mark_dirty);
        self.replacer.unpin_page(frame_id);

        Ok(())
    }

    // ========================================================================
    // Public API: Allocate and deallocate pages
    // ========================================================================

    /// Allocate `run_length` contiguous pages on disk and pin the first,
    /// initialized with `initial_contents`.
    ///
    /// The returned page is pinned once; the caller must `unpin` it.
    ///
    /// # Errors
    /// Disk allocation errors, or the pin error (`Error::PoolExhausted` when
    /// every frame is pinned). When the pin fails, every page of the run is
    /// handed back to the disk manager first.
    pub fn allocate(&mut self, initial_contents: &Page, run_length: usize) -> Result<PageId> {
        let first = self.disk_manager.allocate_page(run_length)?;

        if let Err(e) = self.pin(first, PinMode::Initialize(initial_contents)) {
            warn!(
                "allocate of {} pages at {} failed ({}); rolling back",
                run_length, first, e
            );
            for n in 0..run_length {
                let page_id = first.offset(n as u32);
                if let Err(undo) = self.disk_manager.deallocate_page(page_id) {
                    warn!("rollback could not free {}: {}", page_id, undo);
                }
            }
            return Err(e);
        }

        debug!("allocated {} (run of {})", first, run_length);
        Ok(first)
    }

    /// Free a page on disk, dropping it from the pool if resident.
    ///
    /// A resident copy is discarded without write-back, even if dirty.
    ///
    /// # Errors
    /// - `Error::StillPinned` if the page is resident and pinned
    /// - Disk errors from the deallocation, in which case the pool is
    ///   left untouched
    pub fn deallocate(&mut self, page_id: PageId) -> Result<()> {
        let frame_id = self.page_table.get(page_id);
        if let Some(frame_id) = frame_id {
            if self.descriptors[frame_id.0].is_pinned() {
                return Err(Error::StillPinned(page_id));
            }
        }

        self.disk_manager.deallocate_page(page_id)?;

        if let Some(frame_id) = frame_id {
            self.page_table.remove(page_id);
            self.descriptors[frame_id.0].reset();
            self.replacer.free_page(frame_id);
            debug!("deallocated resident {} from {}", page_id, frame_id);
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write a resident page to disk if it is dirty.
    ///
    /// # Errors
    /// - `Error::NotResident` if the page is not in the pool
    /// - I/O errors from disk write
    pub fn flush(&mut self, page_id: PageId) -> Result<()> {
        let frame_id = self
            .page_table
            .get(page_id)
            .ok_or(Error::NotResident(page_id))?;

        self.flush_frame(frame_id)
    }

    /// Write every dirty frame to disk, pinned or not.
    ///
    /// # Errors
    /// Stops at the first disk error; frames already flushed stay clean.
    pub fn flush_all(&mut self) -> Result<()> {
        for i in 0..self.descriptors.len() {
            self.flush_frame(FrameId::new(i))?;
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Page access
    // ========================================================================

    /// Contents of a pinned page.
    ///
    /// # Errors
    /// `Error::NotResident` or `Error::NotPinned`.
    pub fn page(&self, page_id: PageId) -> Result<&Page> {
        let frame_id = self.pinned_frame(page_id)?;
        Ok(&self.frames[frame_id.0])
    }

    /// Mutable contents of a pinned page.
    ///
    /// Writing does not mark the page dirty; say so when unpinning.
    ///
    /// # Errors
    /// `Error::NotResident` or `Error::NotPinned`.
    pub fn page_mut(&mut self, page_id: PageId) -> Result<&mut Page> {
        let frame_id = self.pinned_frame(page_id)?;
        Ok(&mut self.frames[frame_id.0])
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Get the pool size.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of frames with a pin count of zero, empty frames included.
    ///
    /// Not every such frame is immediately evictable: a `Referenced` frame
    /// still has its second chance.
    pub fn unpinned_count(&self) -> usize {
        self.descriptors.iter().filter(|d| !d.is_pinned()).count()
    }

    /// Get the number of pages in the buffer pool.
    #[inline]
    pub fn resident_count(&self) -> usize {
        self.page_table.len()
    }

    #[inline]
    pub fn is_resident(&self, page_id: PageId) -> bool {
        self.page_table.contains(page_id)
    }

    /// Frame holding `page_id`, if resident.
    #[inline]
    pub fn frame_of(&self, page_id: PageId) -> Option<FrameId> {
        self.page_table.get(page_id)
    }

    /// Pin count of `page_id`, or `None` if it is not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        self.descriptor_of(page_id).map(FrameDescriptor::pin_count)
    }

    /// Dirty flag of `page_id`, or `None` if it is not resident.
    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        self.descriptor_of(page_id).map(FrameDescriptor::is_dirty)
    }

    /// Descriptor of a frame.
    ///
    /// # Panics
    /// Panics if `frame_id` is out of range.
    pub fn descriptor(&self, frame_id: FrameId) -> &FrameDescriptor {
        &self.descriptors[frame_id.0]
    }

    /// Name of the replacement policy in use.
    pub fn replacer_name(&self) -> &'static str {
        self.replacer.name()
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> BufferPoolStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn disk_manager(&self) -> &D {
        &self.disk_manager
    }

    pub fn disk_manager_mut(&mut self) -> &mut D {
        &mut self.disk_manager
    }

    /// Consume the pool without flushing, returning its disk manager.
    pub fn into_disk_manager(self) -> D {
        self.disk_manager
    }

    /// Check the frame and page-table invariants.
    ///
    /// - A frame is pinned exactly when its state is `Pinned`.
    /// - An empty frame is unpinned, clean and `Available`.
    /// - No page occupies two frames, and the page table maps exactly the
    ///   occupied frames.
    ///
    /// # Errors
    /// `Error::InvariantViolation` describing the first problem found.
    pub fn verify_invariants(&self) -> Result<()> {
        let mut occupants = HashSet::with_capacity(self.page_table.len());

        for descriptor in &self.descriptors {
            if let Some(problem) = descriptor.check() {
                return Err(Error::InvariantViolation(problem));
            }
            let Some(page_id) = descriptor.occupant() else {
                continue;
            };
            if !occupants.insert(page_id) {
                return Err(Error::InvariantViolation(format!(
                    "{} is resident in more than one frame",
                    page_id
                )));
            }
            if self.page_table.get(page_id) != Some(descriptor.frame_id()) {
                return Err(Error::InvariantViolation(format!(
                    "page table does not map {} to {}",
                    page_id,
                    descriptor.frame_id()
                )));
            }
        }

        if occupants.len() != self.page_table.len() {
            return Err(Error::InvariantViolation(format!(
                "page table has {} entries for {} occupied frames",
                self.page_table.len(),
                occupants.len()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn descriptor_of(&self, page_id: PageId) -> Option<&FrameDescriptor> {
        self.page_table
            .get(page_id)
            .map(|frame_id| &self.descriptors[frame_id.0])
    }

    fn pinned_frame(&self, page_id: PageId) -> Result<FrameId> {
        let frame_id = self
            .page_table
            .get(page_id)
            .ok_or(Error::NotResident(page_id))?;
        if !self.descriptors[frame_id.0].is_pinned() {
            return Err(Error::NotPinned(page_id));
        }
        Ok(frame_id)
    }

    /// Empty a victim frame, writing its page back first if dirty.
    fn evict(&mut self, frame_id: FrameId) -> Result<()> {
        let Some(old_page_id) = self.descriptors[frame_id.0].occupant() else {
            return Ok(());
        };

        self.flush_frame(frame_id)?;

        self.page_table.remove(old_page_id);
        self.descriptors[frame_id.0].reset();
        self.stats.evictions += 1;
        debug!("evicted {} from {}", old_page_id, frame_id);

        Ok(())
    }

    /// Write a frame to disk if dirty, then mark it clean.
    fn flush_frame(&mut self, frame_id: FrameId) -> Result<()> {
        let descriptor = &mut self.descriptors[frame_id.0];
        let Some(page_id) = descriptor.occupant() else {
            return Ok(());
        };

        if descriptor.is_dirty() {
            self.disk_manager
                .write_page(page_id, &self.frames[frame_id.0])?;
            descriptor.clear_dirty();
            self.stats.pages_written += 1;
            debug!("wrote back {} from {}", page_id, frame_id);
        }

        Ok(())
    }
}

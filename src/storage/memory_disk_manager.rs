//! In-memory disk manager.
//!
//! [`MemoryDiskManager`] keeps every allocated page in a map and counts the
//! I/O it performs, which makes it the natural stand-in for a real disk when
//! checking what the buffer pool reads and writes.

use std::collections::HashMap;
use std::io;

use crate::common::{Error, PageId, Result};
use crate::storage::disk_manager::DiskManager;
use crate::storage::page::Page;

/// Counters for the operations a [`MemoryDiskManager`] has served.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiskStats {
    pub reads: u64,
    pub writes: u64,
    pub allocations: u64,
    pub deallocations: u64,
}

/// A volatile [`DiskManager`] backed by a `HashMap`.
///
/// Identifiers are handed out monotonically and never reused, so a run is
/// always contiguous. Reads and writes can be made to fail on demand.
///
/// # Example
/// ```
/// use clockpool::storage::{DiskManager, MemoryDiskManager};
/// use clockpool::Page;
///
/// let mut dm = MemoryDiskManager::new();
/// let first = dm.allocate_page(2).unwrap();
///
/// dm.write_page(first.next(), &Page::from_bytes(b"hi")).unwrap();
/// assert_eq!(dm.stats().writes, 1);
/// assert_eq!(&dm.stored(first.next()).unwrap().as_slice()[..2], b"hi");
/// ```
#[derive(Debug, Default)]
pub struct MemoryDiskManager {
    pages: HashMap<PageId, Box<Page>>,
    next_page_id: u32,
    stats: DiskStats,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryDiskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// I/O performed so far.
    pub fn stats(&self) -> DiskStats {
        self.stats
    }

    /// The durable copy of `page_id`, if it is allocated.
    pub fn stored(&self, page_id: PageId) -> Option<&Page> {
        self.pages.get(&page_id).map(|page| page.as_ref())
    }

    /// Whether `page_id` is currently allocated.
    pub fn is_allocated(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id)
    }

    /// Number of allocated pages.
    pub fn allocated_count(&self) -> usize {
        self.pages.len()
    }

    /// Make subsequent reads fail with an I/O error.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make subsequent writes fail with an I/O error.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl DiskManager for MemoryDiskManager {
    fn allocate_page(&mut self, run_length: usize) -> Result<PageId> {
        if run_length == 0 {
            return Err(Error::InvalidRunLength(run_length));
        }
        let run = u32::try_from(run_length)
            .ok()
            .filter(|run| self.next_page_id.checked_add(*run).is_some())
            .ok_or(Error::DiskFull {
                requested: run_length,
            })?;

        let first = PageId::new(self.next_page_id);
        for n in 0..run {
            self.pages.insert(first.offset(n), Box::new(Page::new()));
        }
        self.next_page_id += run;
        self.stats.allocations += 1;
        Ok(first)
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        self.pages
            .remove(&page_id)
            .ok_or(Error::PageNotAllocated(page_id))?;
        self.stats.deallocations += 1;
        Ok(())
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        if self.fail_reads {
            return Err(io::Error::other("injected read failure").into());
        }
        let stored = self
            .pages
            .get(&page_id)
            .ok_or(Error::PageNotAllocated(page_id))?;
        page.copy_from(stored);
        self.stats.reads += 1;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("injected write failure").into());
        }
        let stored = self
            .pages
            .get_mut(&page_id)
            .ok_or(Error::PageNotAllocated(page_id))?;
        stored.copy_from(page);
        self.stats.writes += 1;
        Ok(())
    }
}

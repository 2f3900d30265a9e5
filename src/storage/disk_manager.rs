//! The disk collaborator consumed by the buffer pool.

use crate::common::{PageId, Result};
use crate::storage::page::Page;

/// Allocation and raw I/O for fixed-size pages.
///
/// The buffer pool never touches storage directly; it is handed one of
/// these at construction and routes every read, write, allocation and
/// deallocation through it. Implementations are single-threaded; the pool
/// serializes access.
pub trait DiskManager {
    /// Reserve `run_length` contiguous fresh identifiers, returning the first.
    ///
    /// # Errors
    /// `InvalidRunLength` for a zero-length run, `DiskFull` if no run fits.
    fn allocate_page(&mut self, run_length: usize) -> Result<PageId>;

    /// Free a single identifier. Runs are freed one page at a time.
    fn deallocate_page(&mut self, page_id: PageId) -> Result<()>;

    /// Fill `page` from durable storage.
    ///
    /// # Errors
    /// `PageNotAllocated` if `page_id` was never allocated.
    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()>;

    /// Durably persist `page` as the contents of `page_id`.
    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()>;
}

impl<D: DiskManager + ?Sized> DiskManager for Box<D> {
    fn allocate_page(&mut self, run_length: usize) -> Result<PageId> {
        (**self).allocate_page(run_length)
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        (**self).deallocate_page(page_id)
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        (**self).read_page(page_id, page)
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        (**self).write_page(page_id, page)
    }
}

//! Thread-safe access to a buffer pool.
//!
//! [`SharedBufferPool`] puts one `parking_lot::Mutex` around the whole
//! [`BufferPoolManager`]: every pin, unpin, flush, allocate and deallocate
//! touches the page table, the frame table and the replacer's hand, so a
//! single coarse lock is all the pool needs.
//!
//! [`PinnedPage`] is the RAII handle returned by [`SharedBufferPool::fetch`]
//! and [`SharedBufferPool::create`]. It holds one pin and releases it on drop,
//! marking the page dirty if it was written through the handle.

use log::warn;
use parking_lot::{Mutex, MutexGuard};

use crate::buffer::{BufferPoolManager, BufferPoolStats, PinMode};
use crate::common::{PageId, Result};
use crate::storage::{DiskManager, Page};

/// A [`BufferPoolManager`] behind a single mutex.
///
/// # Example
/// ```
/// use clockpool::storage::MemoryDiskManager;
/// use clockpool::{BufferPoolManager, Page, SharedBufferPool};
///
/// let pool = SharedBufferPool::new(BufferPoolManager::new(4, MemoryDiskManager::new()));
///
/// let pid = {
///     let mut page = pool.create(&Page::new()).unwrap();
///     page.write(|p| p.as_mut_slice()[0] = 7).unwrap();
///     page.page_id()
/// }; // unpinned here, marked dirty
///
/// let page = pool.fetch(pid).unwrap();
/// assert_eq!(page.read(|p| p.as_slice()[0]).unwrap(), 7);
/// ```
pub struct SharedBufferPool<D> {
    inner: Mutex<BufferPoolManager<D>>,
}

impl<D: DiskManager> SharedBufferPool<D> {
    pub fn new(pool: BufferPoolManager<D>) -> Self {
        Self {
            inner: Mutex::new(pool),
        }
    }

    /// Lock the pool for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, BufferPoolManager<D>> {
        self.inner.lock()
    }

    pub fn into_inner(self) -> BufferPoolManager<D> {
        self.inner.into_inner()
    }

    /// Pin a page (reading it from disk if needed) behind a handle.
    pub fn fetch(&self, page_id: PageId) -> Result<PinnedPage<'_, D>> {
        self.inner.lock().pin(page_id, PinMode::ReadFromDisk)?;
        Ok(PinnedPage::new(self, page_id))
    }

    /// Allocate a single page initialized with `initial_contents`.
    pub fn create(&self, initial_contents: &Page) -> Result<PinnedPage<'_, D>> {
        let page_id = self.inner.lock().allocate(initial_contents, 1)?;
        Ok(PinnedPage::new(self, page_id))
    }

    /// See [`BufferPoolManager::allocate`]. The first page stays pinned.
    pub fn allocate(&self, initial_contents: &Page, run_length: usize) -> Result<PageId> {
        self.inner.lock().allocate(initial_contents, run_length)
    }

    pub fn unpin(&self, page_id: PageId, mark_dirty: bool) -> Result<()> {
        self.inner.lock().unpin(page_id, mark_dirty)
    }

    pub fn deallocate(&self, page_id: PageId) -> Result<()> {
        self.inner.lock().deallocate(page_id)
    }

    pub fn flush(&self, page_id: PageId) -> Result<()> {
        self.inner.lock().flush(page_id)
    }

    pub fn flush_all(&self) -> Result<()> {
        self.inner.lock().flush_all()
    }

    pub fn pool_size(&self) -> usize {
        self.inner.lock().pool_size()
    }

    pub fn unpinned_count(&self) -> usize {
        self.inner.lock().unpinned_count()
    }

    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        self.inner.lock().pin_count(page_id)
    }

    pub fn stats(&self) -> BufferPoolStats {
        self.inner.lock().stats()
    }
}

/// One pin on a page of a [`SharedBufferPool`], released on drop.
///
/// Access goes through closures so the pool lock is held only while the
/// page is being read or written.
pub struct PinnedPage<'a, D: DiskManager> {
    /// Pool to unpin from on drop.
    pool: &'a SharedBufferPool<D>,
    page_id: PageId,
    /// Set by `write`; passed to `unpin`.
    dirty: bool,
}

impl<'a, D: DiskManager> PinnedPage<'a, D> {
    fn new(pool: &'a SharedBufferPool<D>, page_id: PageId) -> Self {
        Self {
            pool,
            page_id,
            dirty: false,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Run `f` over the page contents.
    ///
    /// The pool lock is held while `f` runs. `f` must not call back into
    /// the same pool (including through another handle): the lock is not
    /// reentrant and the thread deadlocks. Return what you need from `f` and
    /// make further pool calls after it.
    ///
    /// # Errors
    /// Fails only if the pin was released behind this handle's back.
    pub fn read<R>(&self, f: impl FnOnce(&Page) -> R) -> Result<R> {
        let pool = self.pool.inner.lock();
        Ok(f(pool.page(self.page_id)?))
    }

    /// Run `f` over the mutable page contents and mark the page dirty.
    ///
    /// Holds the pool lock while `f` runs, like [`PinnedPage::read`]; `f`
    /// must not call back into the same pool.
    ///
    /// # Errors
    /// Fails only if the pin was released behind this handle's back.
    pub fn write<R>(&mut self, f: impl FnOnce(&mut Page) -> R) -> Result<R> {
        let mut pool = self.pool.inner.lock();
        let result = f(pool.page_mut(self.page_id)?);
        self.dirty = true;
        Ok(result)
    }
}

impl<D: DiskManager> Drop for PinnedPage<'_, D> {
    fn drop(&mut self) {
        if let Err(e) = self.pool.inner.lock().unpin(self.page_id, self.dirty) {
            warn!("dropping handle for {}: {}", self.page_id, e);
        }
    }
}

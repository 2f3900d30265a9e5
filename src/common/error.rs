//! Error types for the buffer pool and its disk collaborator.

use thiserror::Error;

use super::PageId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors surfaced by the buffer pool and disk managers.
///
/// Every error is reported synchronously; nothing in this crate retries.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pin asked to initialize a page that is already in the pool.
    #[error("{0} is already resident in the buffer pool")]
    AlreadyResident(PageId),

    /// Every frame is pinned, so no victim can be chosen.
    #[error("buffer pool exhausted: all frames are pinned")]
    PoolExhausted,

    /// The page is not in the buffer pool.
    #[error("{0} is not resident in the buffer pool")]
    NotResident(PageId),

    /// Attempted to unpin (or access) a page with a pin count of zero.
    ///
    /// This indicates a bug - unpinning should match pinning.
    #[error("{0} is not pinned")]
    NotPinned(PageId),

    /// Attempted to deallocate a page that still has holders.
    #[error("{0} is still pinned")]
    StillPinned(PageId),

    /// The disk manager has no record of this page identifier.
    #[error("{0} is not allocated on disk")]
    PageNotAllocated(PageId),

    /// A page run must contain at least one page.
    #[error("invalid run length: {0}")]
    InvalidRunLength(usize),

    /// No run of free page identifiers of the requested length exists.
    #[error("disk full: no run of {requested} free pages")]
    DiskFull { requested: usize },

    /// The on-disk allocation map failed validation.
    #[error("corrupt space map: {0}")]
    CorruptSpaceMap(String),

    /// The pool self-check found a broken frame or page-table invariant.
    #[error("buffer pool invariant violated: {0}")]
    InvariantViolation(String),
}

//! Page identifier type.

use std::fmt;

/// Identifies a logical page on disk.
///
/// Every value names a real page; "no page" is `Option<PageId>`.
///
/// # Example
/// ```
/// use clockpool::PageId;
///
/// let page_id = PageId::new(42);
/// assert_eq!(page_id.0, 42);
/// assert_eq!(page_id.offset(2), PageId::new(44));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// The identifier `n` places after this one within a run.
    #[inline]
    pub fn offset(self, n: u32) -> Self {
        PageId(self.0 + n)
    }

    /// The identifier immediately after this one.
    #[inline]
    pub fn next(self) -> Self {
        self.offset(1)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}

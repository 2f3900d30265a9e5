//! Residency map from page identifiers to frames.

use std::collections::HashMap;

use crate::common::{FrameId, PageId};

/// Maps every resident page to the frame holding it.
///
/// Keys are exactly the occupants of non-empty frames. Entries are added when
/// a page is loaded and removed when it is evicted or deallocated.
#[derive(Debug, Default)]
pub struct PageTable {
    entries: HashMap<PageId, FrameId>,
}

impl PageTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn get(&self, page_id: PageId) -> Option<FrameId> {
        self.entries.get(&page_id).copied()
    }

    #[inline]
    pub fn contains(&self, page_id: PageId) -> bool {
        self.entries.contains_key(&page_id)
    }

    /// Record that `page_id` now lives in `frame_id`.
    ///
    /// Returns the frame previously recorded for the page, which for a
    /// well-formed pool is always `None`.
    pub fn insert(&mut self, page_id: PageId, frame_id: FrameId) -> Option<FrameId> {
        self.entries.insert(page_id, frame_id)
    }

    pub fn remove(&mut self, page_id: PageId) -> Option<FrameId> {
        self.entries.remove(&page_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PageId, FrameId)> + '_ {
        self.entries.iter().map(|(&pid, &fid)| (pid, fid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut table = PageTable::with_capacity(4);
        assert!(table.is_empty());

        assert_eq!(table.insert(PageId::new(7), FrameId::new(1)), None);
        assert_eq!(table.get(PageId::new(7)), Some(FrameId::new(1)));
        assert!(table.contains(PageId::new(7)));
        assert_eq!(table.len(), 1);

        assert_eq!(table.remove(PageId::new(7)), Some(FrameId::new(1)));
        assert_eq!(table.get(PageId::new(7)), None);
        assert_eq!(table.remove(PageId::new(7)), None);
    }

    #[test]
    fn test_iter() {
        let mut table = PageTable::default();
        table.insert(PageId::new(1), FrameId::new(0));
        table.insert(PageId::new(2), FrameId::new(1));

        let mut entries: Vec<_> = table.iter().collect();
        entries.sort();
        assert_eq!(
            entries,
            vec![
                (PageId::new(1), FrameId::new(0)),
                (PageId::new(2), FrameId::new(1))
            ]
        );
    }
}

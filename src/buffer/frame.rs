//! Frame descriptors - per-frame bookkeeping for the buffer pool.
//!
//! A [`FrameDescriptor`] records, for one slot of the frame array:
//! - Which page occupies it (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - The replacement state the clock policy reads and downgrades
//!
//! The page bytes themselves live in a separate frame array owned by the
//! `BufferPoolManager`; descriptors never hold page contents.

use std::fmt;

use crate::common::{FrameId, PageId};

/// Replacement state of a frame, doubling as the clock's reference bit.
///
/// Invariant: `Pinned` exactly when the pin count is non-zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementState {
    /// Empty, or referenced and already passed over once. Evictable.
    #[default]
    Available,
    /// Recently unpinned; survives one more clock pass.
    Referenced,
    /// Held by at least one caller; never evictable.
    Pinned,
}

impl fmt::Display for ReplacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacementState::Available => "AVAILABLE",
            ReplacementState::Referenced => "REFERENCED",
            ReplacementState::Pinned => "PINNED",
        };
        f.write_str(name)
    }
}

/// Metadata for one frame.
///
/// Descriptors are created once when the pool is built and are relabelled,
/// never dropped, as pages move in and out.
#[derive(Debug, Clone)]
pub struct FrameDescriptor {
    frame_id: FrameId,
    occupant: Option<PageId>,
    pin_count: u32,
    dirty: bool,
    state: ReplacementState,
}

impl FrameDescriptor {
    /// Create the empty descriptor for `frame_id`.
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            occupant: None,
            pin_count: 0,
            dirty: false,
            state: ReplacementState::Available,
        }
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// The page held by this frame, or `None` if the frame is empty.
    #[inline]
    pub fn occupant(&self) -> Option<PageId> {
        self.occupant
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    #[inline]
    pub fn state(&self) -> ReplacementState {
        self.state
    }

    // ========================================================================
    // Lifecycle transitions (driven by the BufferPoolManager)
    // ========================================================================

    /// Label the frame with a freshly loaded page, pinned once and clean.
    pub(crate) fn load(&mut self, page_id: PageId) {
        self.occupant = Some(page_id);
        self.pin_count = 1;
        self.dirty = false;
        self.state = ReplacementState::Pinned;
    }

    /// Add a holder. Returns the new pin count.
    pub(crate) fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.state = ReplacementState::Pinned;
        self.pin_count
    }

    /// Drop a holder, OR-ing in `mark_dirty`. Returns the new pin count.
    ///
    /// The last unpin moves the frame to `Referenced`.
    ///
    /// # Panics
    /// Panics if the pin count is already 0; callers check first.
    pub(crate) fn unpin(&mut self, mark_dirty: bool) -> u32 {
        assert!(self.pin_count > 0, "pin count underflow");
        self.pin_count -= 1;
        self.dirty |= mark_dirty;
        if self.pin_count == 0 {
            self.state = ReplacementState::Referenced;
        }
        self.pin_count
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn set_state(&mut self, state: ReplacementState) {
        self.state = state;
    }

    /// Return to the empty state, forgetting any dirty contents.
    pub(crate) fn reset(&mut self) {
        self.occupant = None;
        self.pin_count = 0;
        self.dirty = false;
        self.state = ReplacementState::Available;
    }

    /// Check the per-frame invariants, describing the first one broken.
    pub(crate) fn check(&self) -> Option<String> {
        if self.is_pinned() != (self.state == ReplacementState::Pinned) {
            return Some(format!(
                "{} has pin count {} but state {}",
                self.frame_id, self.pin_count, self.state
            ));
        }
        if self.is_empty()
            && (self.pin_count != 0 || self.dirty || self.state != ReplacementState::Available)
        {
            return Some(format!("{} is empty but not reset: {:?}", self.frame_id, self));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_new() {
        let frame = FrameDescriptor::new(FrameId::new(3));
        assert_eq!(frame.frame_id(), FrameId::new(3));
        assert!(frame.is_empty());
        assert!(!frame.is_pinned());
        assert!(!frame.is_dirty());
        assert_eq!(frame.state(), ReplacementState::Available);
        assert!(frame.check().is_none());
    }

    #[test]
    fn test_frame_load_and_pin_unpin() {
        let mut frame = FrameDescriptor::new(FrameId::new(0));
        frame.load(PageId::new(9));

        assert_eq!(frame.occupant(), Some(PageId::new(9)));
        assert_eq!(frame.pin_count(), 1);
        assert_eq!(frame.state(), ReplacementState::Pinned);

        assert_eq!(frame.pin(), 2);
        assert_eq!(frame.unpin(false), 1);
        assert_eq!(frame.state(), ReplacementState::Pinned);

        assert_eq!(frame.unpin(false), 0);
        assert_eq!(frame.state(), ReplacementState::Referenced);
        assert!(frame.check().is_none());
    }

    #[test]
    #[should_panic(expected = "pin count underflow")]
    fn test_frame_unpin_underflow() {
        let mut frame = FrameDescriptor::new(FrameId::new(0));
        frame.unpin(false);
    }

    #[test]
    fn test_unpin_never_clears_dirty() {
        let mut frame = FrameDescriptor::new(FrameId::new(0));
        frame.load(PageId::new(1));
        frame.pin();

        frame.unpin(true);
        assert!(frame.is_dirty());
        frame.unpin(false);
        assert!(frame.is_dirty());

        frame.clear_dirty();
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_frame_reset() {
        let mut frame = FrameDescriptor::new(FrameId::new(0));
        frame.load(PageId::new(99));
        frame.unpin(true);

        frame.reset();

        assert!(frame.is_empty());
        assert!(!frame.is_dirty());
        assert_eq!(frame.state(), ReplacementState::Available);
        assert!(frame.check().is_none());
    }

    #[test]
    fn test_check_reports_broken_state() {
        let mut frame = FrameDescriptor::new(FrameId::new(2));
        frame.set_state(ReplacementState::Pinned);
        assert!(frame.check().unwrap().contains("Frame(2)"));

        let mut frame = FrameDescriptor::new(FrameId::new(0));
        frame.dirty = true;
        assert!(frame.check().is_some());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ReplacementState::Referenced.to_string(), "REFERENCED");
    }
}

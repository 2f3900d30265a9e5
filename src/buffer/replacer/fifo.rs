//! FIFO (First-In-First-Out) replacement policy.

use std::collections::{HashSet, VecDeque};

use super::{FrameStates, Replacer};
use crate::common::FrameId;

/// Evicts pages in the order they were loaded into the pool.
///
/// Frames that hold no page are handed out first, lowest index first.
/// Otherwise the oldest unpinned load is the victim; pinned frames keep
/// their place in the queue. A picked frame moves to the back, so a victim
/// the pool fails to evict is not offered again before the others. Relies
/// on the `new_page`/`free_page` hooks to learn which frames are occupied.
#[derive(Debug, Default)]
pub struct FifoReplacer {
    /// Occupied frames in load order (front = oldest).
    queue: VecDeque<FrameId>,

    /// Set for O(1) membership check.
    in_queue: HashSet<FrameId>,
}

impl FifoReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            in_queue: HashSet::with_capacity(capacity),
        }
    }

    /// Number of frames the policy believes are occupied.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn forget(&mut self, frame_id: FrameId) {
        if self.in_queue.remove(&frame_id) {
            self.queue.retain(|&f| f != frame_id);
        }
    }
}

impl Replacer for FifoReplacer {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn pick_victim(&mut self, frames: &mut dyn FrameStates) -> Option<FrameId> {
        let empty = (0..frames.frame_count())
            .map(FrameId::new)
            .find(|f| !self.in_queue.contains(f) && frames.pin_count(*f) == 0);
        if empty.is_some() {
            return empty;
        }

        // The victim stays queued, at the back, until the pool reports it
        // reloaded or freed. A failed eviction leaves it occupied.
        let position = self
            .queue
            .iter()
            .position(|&f| frames.pin_count(f) == 0)?;
        let victim = self.queue.remove(position)?;
        self.queue.push_back(victim);
        Some(victim)
    }

    fn new_page(&mut self, frame_id: FrameId) {
        self.forget(frame_id);
        self.queue.push_back(frame_id);
        self.in_queue.insert(frame_id);
    }

    fn free_page(&mut self, frame_id: FrameId) {
        self.forget(frame_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::frame::ReplacementState::{Pinned, Referenced};
    use crate::buffer::replacer::test_util::frames_in;

    #[test]
    fn test_fifo_prefers_empty_frames() {
        let mut fifo = FifoReplacer::new();
        let mut frames = frames_in(&[Referenced, Referenced, Referenced]);
        fifo.new_page(FrameId::new(1));

        // Frames 0 and 2 were never loaded as far as the policy knows
        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(0)));
    }

    #[test]
    fn test_fifo_basic() {
        let mut fifo = FifoReplacer::new();
        let mut frames = frames_in(&[Referenced, Referenced, Referenced]);

        fifo.new_page(FrameId::new(2));
        fifo.new_page(FrameId::new(0));
        fifo.new_page(FrameId::new(1));
        assert_eq!(fifo.len(), 3);

        // Should evict in load order
        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(2)));
        fifo.new_page(FrameId::new(2));
        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(0)));
    }

    #[test]
    fn test_fifo_skips_pinned() {
        let mut fifo = FifoReplacer::new();
        let mut frames = frames_in(&[Pinned, Referenced, Pinned]);
        for i in 0..3 {
            fifo.new_page(FrameId::new(i));
        }

        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(1)));
        // Picking alone does not make frame 1 empty
        assert_eq!(fifo.len(), 3);
    }

    #[test]
    fn test_fifo_unreleased_victim_goes_to_back() {
        let mut fifo = FifoReplacer::new();
        let mut frames = frames_in(&[Referenced, Referenced, Referenced]);
        for i in 0..3 {
            fifo.new_page(FrameId::new(i));
        }

        // No new_page/free_page follows, as when a write-back fails
        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(0)));
        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(1)));
        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(2)));
        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(0)));
        assert_eq!(fifo.len(), 3);
    }

    #[test]
    fn test_fifo_all_pinned() {
        let mut fifo = FifoReplacer::new();
        let mut frames = frames_in(&[Pinned, Pinned]);
        fifo.new_page(FrameId::new(0));
        fifo.new_page(FrameId::new(1));

        assert_eq!(fifo.pick_victim(&mut frames), None);
        assert_eq!(fifo.len(), 2);
    }

    #[test]
    fn test_fifo_reload_moves_to_back() {
        let mut fifo = FifoReplacer::new();
        let mut frames = frames_in(&[Referenced, Referenced]);

        fifo.new_page(FrameId::new(0));
        fifo.new_page(FrameId::new(1));
        fifo.new_page(FrameId::new(0));

        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(1)));
    }

    #[test]
    fn test_fifo_free_page() {
        let mut fifo = FifoReplacer::new();
        let mut frames = frames_in(&[Referenced, Referenced]);
        fifo.new_page(FrameId::new(0));
        fifo.new_page(FrameId::new(1));

        fifo.free_page(FrameId::new(1));

        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.pick_victim(&mut frames), Some(FrameId::new(1)));
    }
}

//! Eviction policy implementations (replacers).
//!
//! A replacer only decides *which* frame to reuse. It sees frames through
//! the narrow [`FrameStates`] capability (pin count and replacement state)
//! and never touches page contents or the page table.
//!
//! Currently implements:
//! - [`ClockReplacer`] - Second chance, the default
//! - [`FifoReplacer`] - Load order

mod clock;
mod fifo;

pub use clock::ClockReplacer;
pub use fifo::FifoReplacer;

use crate::buffer::frame::{FrameDescriptor, ReplacementState};
use crate::common::{FrameId, ReplacementPolicy};

/// What a replacer may see and change about the frame table.
pub trait FrameStates {
    /// Number of frames in the pool.
    fn frame_count(&self) -> usize;

    fn pin_count(&self, frame_id: FrameId) -> u32;

    fn state(&self, frame_id: FrameId) -> ReplacementState;

    fn set_state(&mut self, frame_id: FrameId, state: ReplacementState);
}

impl FrameStates for Vec<FrameDescriptor> {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn pin_count(&self, frame_id: FrameId) -> u32 {
        self[frame_id.0].pin_count()
    }

    fn state(&self, frame_id: FrameId) -> ReplacementState {
        self[frame_id.0].state()
    }

    fn set_state(&mut self, frame_id: FrameId, state: ReplacementState) {
        self[frame_id.0].set_state(state);
    }
}

/// A victim-selection policy.
///
/// The lifecycle hooks let a policy keep its own bookkeeping; the defaults
/// do nothing, which is all the clock policy needs.
pub trait Replacer: Send {
    /// Short policy name for logs.
    fn name(&self) -> &'static str;

    /// Choose an unpinned frame to reuse, or `None` if every frame is pinned.
    fn pick_victim(&mut self, frames: &mut dyn FrameStates) -> Option<FrameId>;

    /// A page has just been loaded into `frame_id`.
    fn new_page(&mut self, _frame_id: FrameId) {}

    /// `frame_id` has been emptied without being reloaded.
    fn free_page(&mut self, _frame_id: FrameId) {}

    /// A resident page in `frame_id` gained a holder.
    fn pin_page(&mut self, _frame_id: FrameId) {}

    /// A page in `frame_id` lost a holder.
    fn unpin_page(&mut self, _frame_id: FrameId) {}
}

impl ReplacementPolicy {
    /// Build a fresh replacer for a pool of `pool_size` frames.
    pub fn build(self, pool_size: usize) -> Box<dyn Replacer> {
        match self {
            ReplacementPolicy::Clock => Box::new(ClockReplacer::new()),
            ReplacementPolicy::Fifo => Box::new(FifoReplacer::with_capacity(pool_size)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::common::PageId;

    /// A descriptor table with frame `i` holding page `i` and unpinned
    /// in the given state. `Pinned` entries get a pin count of one.
    pub fn frames_in(states: &[ReplacementState]) -> Vec<FrameDescriptor> {
        states
            .iter()
            .enumerate()
            .map(|(i, &state)| {
                let mut frame = FrameDescriptor::new(FrameId::new(i));
                frame.load(PageId::new(i as u32));
                if state != ReplacementState::Pinned {
                    frame.unpin(false);
                }
                frame.set_state(state);
                frame
            })
            .collect()
    }
}

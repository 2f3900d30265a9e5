//! CLOCK (second chance) replacement policy.

use log::trace;

use super::{FrameStates, Replacer};
use crate::buffer::frame::ReplacementState;
use crate::common::FrameId;

/// Clock replacer.
///
/// A hand sweeps the frame table in a circle and persists between calls.
/// Each frame's [`ReplacementState`] is its reference bit:
/// - `Pinned` frames are skipped.
/// - `Referenced` frames are downgraded to `Available` and skipped.
/// - The first unpinned `Available` frame is the victim.
///
/// A sweep stops after two full turns. The first turn may only clear
/// reference bits, so two turns always reach a victim when any frame is
/// unpinned, and report `None` when none is.
#[derive(Debug, Default)]
pub struct ClockReplacer {
    /// Last frame the hand visited; `None` before the first sweep.
    hand: Option<usize>,
}

impl ClockReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame the hand currently rests on.
    pub fn hand(&self) -> Option<FrameId> {
        self.hand.map(FrameId::new)
    }
}

impl Replacer for ClockReplacer {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn pick_victim(&mut self, frames: &mut dyn FrameStates) -> Option<FrameId> {
        let frame_count = frames.frame_count();

        for _ in 0..2 * frame_count {
            let hand = self.hand.map_or(0, |h| (h + 1) % frame_count);
            self.hand = Some(hand);
            let frame_id = FrameId::new(hand);

            if frames.pin_count(frame_id) > 0 {
                continue;
            }
            match frames.state(frame_id) {
                ReplacementState::Referenced => {
                    frames.set_state(frame_id, ReplacementState::Available);
                }
                ReplacementState::Available => {
                    trace!("clock picked {}", frame_id);
                    return Some(frame_id);
                }
                ReplacementState::Pinned => {}
            }
        }
        None
    }
}

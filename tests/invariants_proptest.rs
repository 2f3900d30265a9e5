//! Property tests: random operation sequences against a simple model.
//!
//! After every step the pool must keep its frame invariants, agree with the
//! model on pin counts, and return the last contents written to each page.

use std::collections::HashMap;

use clockpool::storage::MemoryDiskManager;
use clockpool::{
    BufferPoolConfig, BufferPoolManager, Error, Page, PageId, PinMode, ReplacementPolicy,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Allocate(u8),
    Pin(usize),
    Unpin(usize, bool),
    Write(usize, u8),
    Flush(usize),
    FlushAll,
    Deallocate(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u8>().prop_map(Op::Allocate),
        4 => any::<usize>().prop_map(Op::Pin),
        4 => (any::<usize>(), any::<bool>()).prop_map(|(i, d)| Op::Unpin(i, d)),
        3 => (any::<usize>(), any::<u8>()).prop_map(|(i, b)| Op::Write(i, b)),
        1 => any::<usize>().prop_map(Op::Flush),
        1 => Just(Op::FlushAll),
        1 => any::<usize>().prop_map(Op::Deallocate),
    ]
}

/// What the pool should look like from the outside.
#[derive(Default)]
struct Model {
    pages: Vec<PageId>,
    contents: HashMap<PageId, u8>,
    pins: HashMap<PageId, u32>,
}

impl Model {
    fn pick(&self, i: usize) -> Option<PageId> {
        if self.pages.is_empty() {
            None
        } else {
            Some(self.pages[i % self.pages.len()])
        }
    }

    fn pinned_pages(&self) -> usize {
        self.pins.values().filter(|&&n| n > 0).count()
    }

    fn pins(&self, pid: PageId) -> u32 {
        self.pins.get(&pid).copied().unwrap_or(0)
    }
}

fn run_ops(policy: ReplacementPolicy, pool_size: usize, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let config = BufferPoolConfig::new(pool_size).with_policy(policy);
    let mut bpm = BufferPoolManager::with_config(config, MemoryDiskManager::new());
    let mut model = Model::default();

    for op in ops {
        let full = model.pinned_pages() == pool_size;

        match op {
            Op::Allocate(byte) => match bpm.allocate(&Page::from_bytes(&[byte]), 1) {
                Ok(pid) => {
                    prop_assert!(!full);
                    bpm.unpin(pid, true).unwrap();
                    model.pages.push(pid);
                    model.contents.insert(pid, byte);
                }
                Err(e) => {
                    prop_assert!(full);
                    prop_assert!(matches!(e, Error::PoolExhausted));
                }
            },
            Op::Pin(i) => {
                let Some(pid) = model.pick(i) else { continue };
                let resident = bpm.is_resident(pid);
                match bpm.pin(pid, PinMode::ReadFromDisk) {
                    Ok(page) => {
                        prop_assert!(resident || !full);
                        prop_assert_eq!(page.as_slice()[0], model.contents[&pid]);
                        *model.pins.entry(pid).or_default() += 1;
                    }
                    Err(e) => {
                        prop_assert!(!resident && full);
                        prop_assert!(matches!(e, Error::PoolExhausted));
                    }
                }
            }
            Op::Unpin(i, dirty) => {
                let Some(pid) = model.pick(i) else { continue };
                let result = bpm.unpin(pid, dirty);
                if model.pins(pid) == 0 {
                    prop_assert!(matches!(
                        result,
                        Err(Error::NotPinned(_)) | Err(Error::NotResident(_))
                    ));
                } else {
                    prop_assert!(result.is_ok());
                    *model.pins.entry(pid).or_default() -= 1;
                }
            }
            Op::Write(i, byte) => {
                let Some(pid) = model.pick(i) else { continue };
                let resident = bpm.is_resident(pid);
                match bpm.pin(pid, PinMode::ReadFromDisk) {
                    Ok(page) => {
                        page.as_mut_slice()[0] = byte;
                        bpm.unpin(pid, true).unwrap();
                        model.contents.insert(pid, byte);
                    }
                    Err(_) => prop_assert!(!resident && full),
                }
            }
            Op::Flush(i) => {
                let Some(pid) = model.pick(i) else { continue };
                let resident = bpm.is_resident(pid);
                let result = bpm.flush(pid);
                prop_assert_eq!(result.is_ok(), resident);
                if resident {
                    prop_assert_eq!(bpm.is_dirty(pid), Some(false));
                }
            }
            Op::FlushAll => bpm.flush_all().unwrap(),
            Op::Deallocate(i) => {
                let Some(pid) = model.pick(i) else { continue };
                let result = bpm.deallocate(pid);
                if model.pins(pid) > 0 {
                    prop_assert!(matches!(result, Err(Error::StillPinned(_))));
                    prop_assert!(bpm.is_resident(pid));
                } else {
                    prop_assert!(result.is_ok());
                    prop_assert!(!bpm.is_resident(pid));
                    model.pages.retain(|&p| p != pid);
                    model.contents.remove(&pid);
                    model.pins.remove(&pid);
                }
            }
        }

        bpm.verify_invariants()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(bpm.unpinned_count(), pool_size - model.pinned_pages());
        for &pid in &model.pages {
            let pins = model.pins(pid);
            if pins > 0 {
                prop_assert_eq!(bpm.pin_count(pid), Some(pins));
            } else {
                prop_assert!(matches!(bpm.pin_count(pid), None | Some(0)));
            }
        }
    }

    // Everything the model knows about reaches disk
    bpm.flush_all().unwrap();
    for &pid in &model.pages {
        let stored = bpm.disk_manager().stored(pid).unwrap();
        prop_assert_eq!(stored.as_slice()[0], model.contents[&pid]);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_clock_pool_matches_model(
        pool_size in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        run_ops(ReplacementPolicy::Clock, pool_size, ops)?;
    }

    #[test]
    fn prop_fifo_pool_matches_model(
        pool_size in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        run_ops(ReplacementPolicy::Fifo, pool_size, ops)?;
    }
}

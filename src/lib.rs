//! clockpool - a buffer pool manager with a clock replacement policy.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │          Heap files / indexes / operators (callers)             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                Buffer Pool (buffer/)                    │    │
//! │  │  pin · unpin · allocate · deallocate · flush · flush_all│    │
//! │  │   ┌─────────────────────────────────────────────────┐   │    │
//! │  │   │    Replacement policy: CLOCK (default) | FIFO   │   │    │
//! │  │   └─────────────────────────────────────────────────┘   │    │
//! │  │   FrameDescriptor + PageTable + BufferPoolStats         │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                Storage (storage/)                       │    │
//! │  │   DiskManager trait: FileDiskManager | MemoryDiskManager│    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - Buffer pool management and eviction policies
//! - [`storage`] - The disk collaborator and the page buffer
//!
//! # Quick Start
//! ```no_run
//! use clockpool::storage::FileDiskManager;
//! use clockpool::{BufferPoolManager, Page, PinMode};
//!
//! let dm = FileDiskManager::create("my_database.db").unwrap();
//! let mut bpm = BufferPoolManager::new(64, dm);
//!
//! let pid = bpm.allocate(&Page::from_bytes(b"hello"), 1).unwrap();
//! bpm.unpin(pid, true).unwrap();
//!
//! let page = bpm.pin(pid, PinMode::ReadFromDisk).unwrap();
//! assert_eq!(&page.as_slice()[..5], b"hello");
//! bpm.unpin(pid, false).unwrap();
//! bpm.flush_all().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BufferPoolConfig, Error, FrameId, PageId, ReplacementPolicy, Result};

pub use buffer::{
    BufferPoolManager, BufferPoolStats, FrameDescriptor, PinMode, PinnedPage, ReplacementState,
    SharedBufferPool,
};
pub use storage::{DiskManager, Page};

//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between access methods
//! and disk. It manages a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferPoolManager`] - The main page cache
//! - [`FrameDescriptor`] - Pin count, dirty flag and replacement state of a frame
//! - [`PageTable`] - Which frame holds which resident page
//! - [`SharedBufferPool`] / [`PinnedPage`] - Mutex-guarded pool and RAII pins
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - Eviction policy implementations

mod buffer_pool_manager;
mod frame;
mod page_table;
pub mod replacer;
mod shared;
mod stats;

pub use buffer_pool_manager::{BufferPoolManager, PinMode};
pub use frame::{FrameDescriptor, ReplacementState};
pub use page_table::PageTable;
pub use shared::{PinnedPage, SharedBufferPool};
pub use stats::BufferPoolStats;

//! Storage layer - the disk collaborator and the page buffer.
//!
//! - [`DiskManager`] - The interface the buffer pool consumes
//! - [`FileDiskManager`] - Single-file implementation with a space map
//! - [`MemoryDiskManager`] - Volatile implementation with I/O counters
//! - [`Page`] - The raw 4KB data container

mod disk_manager;
mod file_disk_manager;
mod memory_disk_manager;
pub mod page;

pub use disk_manager::DiskManager;
pub use file_disk_manager::FileDiskManager;
pub use memory_disk_manager::{DiskStats, MemoryDiskManager};
pub use page::Page;

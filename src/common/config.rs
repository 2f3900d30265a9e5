//! Configuration for the buffer pool.

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, so a frame maps onto exactly
/// one aligned I/O unit.
pub const PAGE_SIZE: usize = 4096;

/// Number of frames used by [`BufferPoolConfig::default`].
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Bits available in the space-map page after its 8-byte header.
///
/// Bounds the number of page identifiers a `FileDiskManager` can track.
pub const MAX_PAGES: u32 = ((PAGE_SIZE - 8) * 8) as u32;

/// Which victim-selection policy a pool is built with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Clock / second-chance.
    #[default]
    Clock,
    /// Evict in load order.
    Fifo,
}

/// Construction-time settings for a `BufferPoolManager`.
///
/// # Example
/// ```
/// use clockpool::{BufferPoolConfig, ReplacementPolicy};
///
/// let config = BufferPoolConfig::default()
///     .with_pool_size(16)
///     .with_policy(ReplacementPolicy::Fifo);
/// assert_eq!(config.pool_size, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames. Fixed for the lifetime of the pool.
    pub pool_size: usize,
    /// Replacement policy.
    pub policy: ReplacementPolicy,
}

impl BufferPoolConfig {
    /// Config with `pool_size` frames and the default policy.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            policy: ReplacementPolicy::default(),
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

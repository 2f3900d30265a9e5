//! Buffer pool statistics tracking.

use std::fmt;

/// Counters maintained by the buffer pool.
///
/// Updated under `&mut self`; the struct is `Copy` and doubles as its own
/// snapshot.
///
/// # Example
/// ```
/// use clockpool::BufferPoolStats;
///
/// let stats = BufferPoolStats { cache_hits: 3, cache_misses: 1, ..Default::default() };
/// assert_eq!(stats.hit_rate(), 0.75);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolStats {
    /// Pins that found the page already resident.
    pub cache_hits: u64,

    /// Pins that had to bring the page into a frame.
    pub cache_misses: u64,

    /// Resident pages pushed out to make room for another.
    pub evictions: u64,

    /// Pages read from disk.
    pub pages_read: u64,

    /// Pages written back to disk (eviction or flush).
    pub pages_written: u64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for BufferPoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.pages_read,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = BufferPoolStats::new();
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_stats_hit_rate() {
        let stats = BufferPoolStats {
            cache_hits: 7,
            cache_misses: 3,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.7);
    }

    #[test]
    fn test_stats_reset() {
        let mut stats = BufferPoolStats {
            cache_hits: 100,
            evictions: 4,
            ..Default::default()
        };

        stats.reset();

        assert_eq!(stats, BufferPoolStats::default());
    }

    #[test]
    fn test_stats_display() {
        let stats = BufferPoolStats {
            cache_hits: 80,
            cache_misses: 20,
            evictions: 5,
            ..Default::default()
        };

        let display = format!("{}", stats);

        assert!(display.contains("hits: 80"));
        assert!(display.contains("misses: 20"));
        assert!(display.contains("80.00%"));
    }
}

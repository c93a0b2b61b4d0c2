//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for a single arena.
///
/// Controls segment sizing and the capacity limit. Validated when the arena
/// is created; all values are immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each arena segment in bytes.
    ///
    /// Default: 65_536. Must be a power of two and at least
    /// [`ArenaConfig::MIN_SEGMENT_SIZE`].
    pub segment_size: u32,

    /// Maximum number of segments the arena may grow to.
    ///
    /// Default: 256, i.e. 16MB per arena at the default segment size.
    /// Segments are created lazily, so an unused limit costs nothing.
    pub max_segments: u16,
}

impl ArenaConfig {
    /// Default segment size: 64KB.
    pub const DEFAULT_SEGMENT_SIZE: u32 = 64 * 1024;

    /// Default maximum segment count.
    pub const DEFAULT_MAX_SEGMENTS: u16 = 256;

    /// Smallest accepted segment size.
    pub const MIN_SEGMENT_SIZE: u32 = 64;

    /// Largest alignment an allocation may request.
    pub const MAX_ALIGN: u32 = 4096;

    /// Create a config with the given segment geometry.
    pub fn new(segment_size: u32, max_segments: u16) -> Self {
        Self {
            segment_size,
            max_segments,
        }
    }

    /// Check the config for values the allocator cannot honour.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !self.segment_size.is_power_of_two() {
            return Err(ArenaError::InvalidConfig {
                reason: "segment_size must be a power of two",
            });
        }
        if self.segment_size < Self::MIN_SEGMENT_SIZE {
            return Err(ArenaError::InvalidConfig {
                reason: "segment_size is below the minimum",
            });
        }
        if self.max_segments == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_segments must be at least 1",
            });
        }
        Ok(())
    }

    /// Total capacity of the arena in bytes once fully grown.
    pub fn capacity_bytes(&self) -> u64 {
        u64::from(self.segment_size) * u64::from(self.max_segments)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEGMENT_SIZE, Self::DEFAULT_MAX_SEGMENTS)
    }
}

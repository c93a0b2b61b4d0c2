//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use crate::handle::ArenaId;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena has no room left for the allocation.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Total capacity of the arena once fully grown.
        capacity: usize,
    },
    /// The arena was freed; every object it allocated is gone.
    StaleArena {
        /// The handle that no longer resolves.
        arena: ArenaId,
    },
    /// The handle or reference was issued by a different registry, or does
    /// not lie inside the arena it names.
    ForeignRegistry {
        /// The handle that does not belong here.
        arena: ArenaId,
    },
    /// Zero-byte allocations would alias the next object's address.
    ZeroSized,
    /// Alignment is not a power of two or exceeds the supported maximum.
    InvalidAlignment {
        /// The requested alignment.
        align: u32,
    },
    /// The arena configuration cannot be honoured.
    InvalidConfig {
        /// What is wrong with it.
        reason: &'static str,
    },
    /// No unused virtual address range is left for a new arena.
    AddressSpaceExhausted,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes, capacity {capacity} bytes"
                )
            }
            Self::StaleArena { arena } => write!(f, "{arena} has been freed"),
            Self::ForeignRegistry { arena } => {
                write!(f, "{arena} does not belong to this registry")
            }
            Self::ZeroSized => write!(f, "zero-sized arena allocation"),
            Self::InvalidAlignment { align } => write!(f, "invalid alignment {align}"),
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::AddressSpaceExhausted => write!(f, "native address space exhausted"),
        }
    }
}

impl Error for ArenaError {}

//! Recoverable runtime errors.
//!
//! Only conditions the caller can act on are values here. Broken cache
//! invariants (duplicate add, removing an absent key, use after teardown)
//! panic at the point of detection instead.

use std::error::Error;
use std::fmt;

use tether_arena::ArenaError;
use tether_core::WrapperKind;

/// Errors surfaced to the host while producing or using a wrapper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WrapError {
    /// The host tried to construct a factory-only type directly.
    Forbidden {
        /// Class name of the offending type.
        type_name: &'static str,
    },
    /// The wrapper kind was not registered when the runtime loaded.
    UnregisteredType {
        /// The missing kind.
        kind: WrapperKind,
    },
    /// The parent wrapper does not keep the target's arena alive.
    ForeignArena {
        /// Kind of the wrapper being created.
        kind: WrapperKind,
    },
    /// The wrapper has no native object to access.
    NoTarget {
        /// Kind of the wrapper.
        kind: WrapperKind,
    },
    /// The wrapper owns no arena to allocate from.
    NoArena {
        /// Kind of the wrapper.
        kind: WrapperKind,
    },
    /// The native allocator refused the request.
    Arena(ArenaError),
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forbidden { type_name } => {
                write!(f, "Objects of type {type_name} may not be created directly.")
            }
            Self::UnregisteredType { kind } => {
                write!(f, "type {kind} is not registered with this runtime")
            }
            Self::ForeignArena { kind } => {
                write!(f, "parent of {kind} does not own the target's arena")
            }
            Self::NoTarget { kind } => write!(f, "{kind} wrapper has no native object"),
            Self::NoArena { kind } => write!(f, "{kind} wrapper owns no arena"),
            Self::Arena(e) => write!(f, "native allocation failed: {e}"),
        }
    }
}

impl Error for WrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for WrapError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

/// Errors that abort the load transition. No runtime is produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The module path is empty or has an empty segment.
    InvalidModuleName {
        /// The rejected name.
        name: String,
    },
    /// A type with the same class name is already registered.
    DuplicateType {
        /// The clashing class name.
        name: String,
    },
    /// A qualified type name has no class segment.
    MalformedName {
        /// The rejected qualified name.
        name: String,
    },
    /// The storage or object arena configuration was rejected.
    Storage(ArenaError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidModuleName { name } => write!(f, "invalid module name {name:?}"),
            Self::DuplicateType { name } => write!(f, "type {name} registered twice"),
            Self::MalformedName { name } => write!(f, "malformed qualified type name {name:?}"),
            Self::Storage(e) => write!(f, "cache storage unavailable: {e}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

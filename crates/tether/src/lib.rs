//! Tether: identity-preserving wrapper handles over arena-allocated native
//! objects.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! tether sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use tether::prelude::*;
//!
//! let rt = Runtime::on_load(RuntimeConfig::default()).unwrap();
//!
//! // A pool owns its arena; descriptors point into it and keep it alive.
//! let pool = rt.construct(WrapperKind::DescriptorPool).unwrap();
//! let obj = pool.alloc(32, 8).unwrap();
//! let desc = rt.wrap(obj, WrapperKind::Descriptor, Some(&pool)).unwrap();
//! drop(pool);
//! assert_eq!(desc.read(|bytes| bytes.len()).unwrap(), 32);
//!
//! // One native object, one wrapper.
//! let again = rt.wrap(obj, WrapperKind::Descriptor, None).unwrap();
//! assert!(Wrapper::ptr_eq(&desc, &again));
//!
//! drop((desc, again));
//! rt.on_unload();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tether-core` | Native addresses, wrapper kinds, type naming |
//! | [`arena`] | `tether-arena` | Generational arenas and checked native references |
//! | [`runtime`] | `tether-runtime` | Object cache, wrappers, runtime lifecycle |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Native addresses, wrapper kinds, and type naming (`tether-core`).
pub use tether_core as types;

/// Arena allocation (`tether-arena`).
///
/// [`arena::OwnedArena`] is the exclusive owner a wrapper holds;
/// [`arena::NativeRef`] is the checked reference to an object inside one.
pub use tether_arena as arena;

/// Object cache and runtime lifecycle (`tether-runtime`).
pub use tether_runtime as runtime;

/// Common imports for typical tether usage.
///
/// ```rust
/// use tether::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tether_core::{KindGroup, NativeAddr, WrapperKind};

    // Arenas
    pub use tether_arena::{ArenaConfig, ArenaError, ArenaId, Arenas, NativeRef, OwnedArena};

    // Runtime
    pub use tether_runtime::{Binding, Phase, Runtime, RuntimeConfig, Wrapper};

    // Errors
    pub use tether_runtime::{LoadError, WrapError};
}

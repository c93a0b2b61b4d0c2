//! Generational region allocation for tether native objects.
//!
//! Every native object a wrapper can point at lives in an arena. Freeing an
//! arena invalidates all of its objects at once; no per-object destructor
//! runs. Instead of handing out raw pointers, the allocator hands out
//! [`NativeRef`]s that carry the arena's registry, slot and generation, so
//! every access is a checked lookup. A freed arena yields
//! [`ArenaError::StaleArena`] and another registry's arena yields
//! [`ArenaError::ForeignRegistry`], never a dangling read.
//!
//! # Architecture
//!
//! ```text
//! Arenas (shared Rc<RefCell<..>> handle)
//! └── ArenaRegistry
//!     └── SlotTable<Arena> (slot + generation, free list)
//!         └── Arena
//!             └── SegmentList → Segment[] (bump-allocated Vec<u8>)
//! ```
//!
//! Each arena reserves a disjoint, never-reused range of the virtual address
//! space, which is where [`NativeRef::addr`] comes from.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handle;
pub mod registry;
pub mod segment;
pub mod shared;
mod slot;

// Public re-exports for the primary API surface.
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use handle::{ArenaId, NativeRef};
pub use registry::{ArenaRegistry, ArenaUsage, RegistryStats};
pub use shared::{Arenas, OwnedArena};
